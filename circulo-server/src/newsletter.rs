use axum::{extract::State, routing::post, Form, Json};
use circulo_club::{SubmissionError, SubscribeOutcome};
use serde::Serialize;

use crate::{context::ServerContext, errors::ServerResult, schemas::NewsletterSchema, Router};

/// Structured outcome of a subscription attempt. Failures that the reader
/// can act on are reported here, never as an error status.
#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub success: bool,
    pub message: String,
}

async fn subscribe(
    State(context): State<ServerContext>,
    Form(schema): Form<NewsletterSchema>,
) -> ServerResult<Json<SubscribeResponse>> {
    let result = context
        .club
        .submissions
        .subscribe(&schema.email, schema.name.as_deref())
        .await;

    let response = match result {
        Ok(SubscribeOutcome::Subscribed(_)) => SubscribeResponse {
            success: true,
            message: "¡Gracias por suscribirte al boletín!".to_string(),
        },
        Ok(SubscribeOutcome::AlreadySubscribed) => SubscribeResponse {
            success: false,
            message: "Este email ya está suscrito al boletín".to_string(),
        },
        Err(SubmissionError::Invalid(errors)) => SubscribeResponse {
            success: false,
            message: errors
                .first()
                .map(|e| e.message.to_string())
                .unwrap_or_else(|| "Email inválido".to_string()),
        },
        Err(SubmissionError::Db(e)) => return Err(e.into()),
    };

    Ok(Json(response))
}

pub fn router() -> Router {
    Router::new().route("/suscribir", post(subscribe))
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use circulo_club::{Club, SqliteDatabase};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::{create_router, DevTemplateEngine, ServerContext};

    async fn setup() -> axum::Router {
        let db = SqliteDatabase::in_memory().await.expect("database opens");
        let context = ServerContext::new(Club::new(db), Arc::new(DevTemplateEngine));

        create_router(context)
    }

    async fn subscribe(router: &axum::Router, body: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .clone()
            .oneshot(
                Request::post("/newsletter/suscribir")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_subscribe_reports_structured_outcomes() {
        let router = setup().await;

        let (status, body) = subscribe(&router, "email=ana%40example.com&name=Ana").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        // Same email again is a no-op with a structured failure
        let (status, body) = subscribe(&router, "email=ana%40example.com").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);

        // Missing email is reported, not silently dropped
        let (status, body) = subscribe(&router, "name=Ana").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
    }
}
