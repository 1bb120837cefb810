use axum::{
    extract::{Path, Query, State},
    response::Html,
    routing::get,
};
use serde_json::json;

use crate::{
    context::ServerContext, errors::ServerResult, schemas::PageQuery, serialized::ToSerialized,
    Router,
};

async fn blog(
    State(context): State<ServerContext>,
    Query(query): Query<PageQuery>,
) -> ServerResult<Html<String>> {
    let posts = context.club.pages.blog(query.page.unwrap_or(1)).await?;

    context.render(
        "main/blog",
        json!({
            "posts": posts.items.to_serialized(),
            "pagination": posts.to_serialized(),
        }),
    )
}

async fn blog_detail(
    State(context): State<ServerContext>,
    Path(post_id): Path<i64>,
) -> ServerResult<Html<String>> {
    let page = context.club.pages.blog_post(post_id).await?;

    context.render(
        "main/blog_detail",
        json!({
            "post": page.post.to_serialized(),
            "related_posts": page.related_posts.to_serialized(),
        }),
    )
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(blog))
        .route("/:id", get(blog_detail))
}
