use std::{
    env,
    net::{Ipv6Addr, SocketAddr},
};

use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

mod blog;
mod context;
mod errors;
mod events;
mod gallery;
mod library;
mod membership;
mod newsletter;
mod pages;
mod readings;
mod schemas;
mod serialized;
mod templates;

pub mod logging;

pub use context::ServerContext;
pub use templates::{DevTemplateEngine, TemplateEngine, TemplateError};

/// The default port the server will listen on.
pub const DEFAULT_PORT: u16 = 8000;

pub type Router = axum::Router<ServerContext>;

/// Builds the full route table of the site
pub fn create_router(context: ServerContext) -> axum::Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(pages::router())
        .nest("/lecturas", readings::router())
        .nest("/encuentros", events::router())
        .nest("/biblioteca", library::router())
        .nest("/reflexiones", blog::router())
        .nest("/unete", membership::router())
        .nest("/galeria", gallery::router())
        .nest("/newsletter", newsletter::router())
        .layer(cors)
        .with_state(context)
}

/// Starts the club server
pub async fn run_server(context: ServerContext) {
    let port = env::var("CIRCULO_SERVER_PORT")
        .map(|x| x.parse::<u16>().expect("Port must be a number"))
        .unwrap_or(DEFAULT_PORT);

    let addr: SocketAddr = (Ipv6Addr::UNSPECIFIED, port).into();
    let listener = TcpListener::bind(&addr).await.expect("listens on address");

    log::info!("Escuchando en el puerto {port}");

    axum::serve(listener, create_router(context).into_make_service())
        .await
        .expect("server runs");
}
