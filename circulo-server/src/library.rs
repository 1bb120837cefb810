use axum::{
    extract::{Query, State},
    response::Html,
    routing::get,
};
use circulo_club::LibraryFilter;
use serde_json::json;

use crate::{
    context::ServerContext, errors::ServerResult, schemas::LibraryQuery,
    serialized::ToSerialized, Router,
};

/// Blank filter inputs mean no filter at all
fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

async fn library(
    State(context): State<ServerContext>,
    Query(query): Query<LibraryQuery>,
) -> ServerResult<Html<String>> {
    let filter = LibraryFilter {
        genre: non_empty(query.genre),
        search: non_empty(query.search),
    };

    let page = context
        .club
        .pages
        .library(filter, query.page.unwrap_or(1))
        .await?;

    context.render(
        "main/library",
        json!({
            "books": page.books.items.to_serialized(),
            "pagination": page.books.to_serialized(),
            "genres": page.genres.to_serialized(),
            "selected_genre": page.filter.genre,
            "search": page.filter.search,
        }),
    )
}

pub fn router() -> Router {
    Router::new().route("/", get(library))
}
