use std::{env, sync::Arc};

use circulo_club::{Club, SqliteDatabase};
use circulo_server::{logging, DevTemplateEngine, ServerContext};
use log::info;

const DEFAULT_DATABASE_URL: &str = "sqlite://circulo.db";

#[tokio::main]
async fn main() {
    logging::init_logger();

    let database_url =
        env::var("CIRCULO_DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

    info!("Conectando a la base de datos...");

    let database = SqliteDatabase::new(&database_url)
        .await
        .expect("database connects");

    database.migrate().await.expect("migrations apply");

    let club = Club::new(database);
    let context = ServerContext::new(club, Arc::new(DevTemplateEngine));

    circulo_server::run_server(context).await
}
