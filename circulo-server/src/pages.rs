use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form,
};
use circulo_club::{ContactForm, SubmissionError};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::{
    context::ServerContext,
    errors::ServerResult,
    schemas::{schema_errors, ContactSchema},
    serialized::{FormError, ToSerialized},
    Router,
};

#[derive(Debug, Default, Deserialize)]
struct SentQuery {
    enviado: Option<u8>,
}

async fn home(State(context): State<ServerContext>) -> ServerResult<Html<String>> {
    let page = context.club.pages.home().await?;

    context.render(
        "main/home",
        json!({
            "current_book": page.current_book.to_serialized(),
            "upcoming_events": page.upcoming_events.to_serialized(),
            "featured_posts": page.featured_posts.to_serialized(),
            "quote_post": page.quote_post.to_serialized(),
        }),
    )
}

async fn about(State(context): State<ServerContext>) -> ServerResult<Html<String>> {
    context.render("main/about", json!({}))
}

fn contact_form(
    context: &ServerContext,
    schema: &ContactSchema,
    errors: Vec<FormError>,
    sent: bool,
) -> ServerResult<Html<String>> {
    context.render(
        "main/contact",
        json!({
            "form": {
                "values": {
                    "name": &schema.name,
                    "email": &schema.email,
                    "subject": &schema.subject,
                    "message": &schema.message,
                },
                "errors": errors,
            },
            "sent": sent,
        }),
    )
}

async fn contact(
    State(context): State<ServerContext>,
    Query(query): Query<SentQuery>,
) -> ServerResult<Html<String>> {
    contact_form(
        &context,
        &ContactSchema::default(),
        vec![],
        query.enviado.is_some(),
    )
}

async fn send_contact(
    State(context): State<ServerContext>,
    Form(schema): Form<ContactSchema>,
) -> ServerResult<Response> {
    if let Err(errors) = schema.validate() {
        return Ok(contact_form(&context, &schema, schema_errors(&errors), false)?.into_response());
    }

    let result = context
        .club
        .submissions
        .contact(ContactForm {
            name: schema.name.clone(),
            email: schema.email.clone(),
            subject: schema.subject.clone(),
            message: schema.message.clone(),
        })
        .await;

    match result {
        Ok(()) => Ok(Redirect::to("/contact?enviado=1").into_response()),
        Err(SubmissionError::Invalid(errors)) => {
            Ok(contact_form(&context, &schema, errors.to_serialized(), false)?.into_response())
        }
        Err(SubmissionError::Db(e)) => Err(e.into()),
    }
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(home))
        .route("/about", get(about))
        .route("/contact", get(contact).post(send_contact))
}
