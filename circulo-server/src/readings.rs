use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form,
};
use circulo_club::{SubmissionError, SuggestionForm};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::{
    context::ServerContext,
    errors::ServerResult,
    schemas::{schema_errors, SuggestionSchema},
    serialized::{FormError, ToSerialized},
    Router,
};

#[derive(Debug, Default, Deserialize)]
struct SentQuery {
    enviada: Option<u8>,
}

async fn current_reading(State(context): State<ServerContext>) -> ServerResult<Html<String>> {
    let page = context.club.pages.current_reading().await?;

    context.render(
        "main/current_reading",
        json!({
            "book": page.book.to_serialized(),
            "recent_reviews": page.recent_reviews.to_serialized(),
        }),
    )
}

async fn upcoming_readings(State(context): State<ServerContext>) -> ServerResult<Html<String>> {
    let books = context.club.pages.upcoming_readings().await?;

    context.render(
        "main/upcoming_readings",
        json!({ "books": books.to_serialized() }),
    )
}

fn suggestion_form(
    context: &ServerContext,
    schema: &SuggestionSchema,
    errors: Vec<FormError>,
    sent: bool,
) -> ServerResult<Html<String>> {
    context.render(
        "main/suggest_book",
        json!({
            "form": {
                "values": {
                    "title": &schema.title,
                    "author": &schema.author,
                    "suggested_by_name": &schema.suggested_by_name,
                    "suggested_by_email": &schema.suggested_by_email,
                    "reason": &schema.reason,
                },
                "errors": errors,
            },
            "sent": sent,
        }),
    )
}

async fn suggest_book(
    State(context): State<ServerContext>,
    Query(query): Query<SentQuery>,
) -> ServerResult<Html<String>> {
    suggestion_form(
        &context,
        &SuggestionSchema::default(),
        vec![],
        query.enviada.is_some(),
    )
}

async fn send_suggestion(
    State(context): State<ServerContext>,
    Form(schema): Form<SuggestionSchema>,
) -> ServerResult<Response> {
    if let Err(errors) = schema.validate() {
        return Ok(
            suggestion_form(&context, &schema, schema_errors(&errors), false)?.into_response(),
        );
    }

    let result = context
        .club
        .submissions
        .suggest_book(SuggestionForm {
            title: schema.title.clone(),
            author: schema.author.clone(),
            suggested_by_name: schema.suggested_by_name.clone(),
            suggested_by_email: schema.suggested_by_email.clone(),
            reason: schema.reason.clone(),
        })
        .await;

    match result {
        // A fresh empty form with a success notice
        Ok(_) => Ok(Redirect::to("/lecturas/sugerir?enviada=1").into_response()),
        Err(SubmissionError::Invalid(errors)) => {
            Ok(suggestion_form(&context, &schema, errors.to_serialized(), false)?.into_response())
        }
        Err(SubmissionError::Db(e)) => Err(e.into()),
    }
}

pub fn router() -> Router {
    Router::new()
        .route("/actual", get(current_reading))
        .route("/proximas", get(upcoming_readings))
        .route("/sugerir", get(suggest_book).post(send_suggestion))
}
