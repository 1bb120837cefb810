use axum::{
    extract::{Query, State},
    response::Html,
    routing::get,
};
use serde_json::json;

use crate::{
    context::ServerContext, errors::ServerResult, schemas::PageQuery, serialized::ToSerialized,
    Router,
};

async fn gallery(
    State(context): State<ServerContext>,
    Query(query): Query<PageQuery>,
) -> ServerResult<Html<String>> {
    let page = context.club.pages.gallery(query.page.unwrap_or(1)).await?;

    context.render(
        "main/gallery",
        json!({
            "images": page.images.items.to_serialized(),
            "pagination": page.images.to_serialized(),
            "featured_images": page.featured.to_serialized(),
        }),
    )
}

pub fn router() -> Router {
    Router::new().route("/", get(gallery))
}
