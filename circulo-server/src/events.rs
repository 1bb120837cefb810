use axum::{
    extract::{Path, State},
    response::Html,
    routing::get,
};
use serde_json::json;

use crate::{context::ServerContext, errors::ServerResult, serialized::ToSerialized, Router};

async fn events(State(context): State<ServerContext>) -> ServerResult<Html<String>> {
    let page = context.club.pages.events().await?;

    context.render(
        "main/events",
        json!({
            "upcoming_events": page.upcoming.to_serialized(),
            "past_events": page.past.to_serialized(),
        }),
    )
}

async fn event_detail(
    State(context): State<ServerContext>,
    Path(event_id): Path<i64>,
) -> ServerResult<Html<String>> {
    let page = context.club.pages.event_detail(event_id).await?;

    context.render(
        "main/event_detail",
        json!({
            "event": page.event.to_serialized(),
            "book": page.book.to_serialized(),
            "photos": page.photos.to_serialized(),
        }),
    )
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(events))
        .route("/:id", get(event_detail))
}
