use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form,
};
use circulo_club::{Database, MembershipForm, SubmissionError};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::{
    context::ServerContext,
    errors::ServerResult,
    schemas::{schema_errors, JoinSchema},
    serialized::{FormError, ToSerialized},
    Router,
};

#[derive(Debug, Default, Deserialize)]
struct SentQuery {
    enviado: Option<u8>,
}

async fn join_form(
    context: &ServerContext,
    schema: &JoinSchema,
    errors: Vec<FormError>,
    sent: bool,
) -> ServerResult<Html<String>> {
    // The multi-select needs every genre on offer
    let genres = context.club.database().list_genres().await?;

    context.render(
        "main/join",
        json!({
            "form": {
                "values": {
                    "name": &schema.name,
                    "email": &schema.email,
                    "phone": &schema.phone,
                    "bio": &schema.bio,
                    "favorite_genres": &schema.favorite_genres,
                },
                "errors": errors,
            },
            "genres": genres.to_serialized(),
            "sent": sent,
        }),
    )
}

async fn join(
    State(context): State<ServerContext>,
    Query(query): Query<SentQuery>,
) -> ServerResult<Html<String>> {
    join_form(
        &context,
        &JoinSchema::default(),
        vec![],
        query.enviado.is_some(),
    )
    .await
}

async fn send_join(
    State(context): State<ServerContext>,
    Form(schema): Form<JoinSchema>,
) -> ServerResult<Response> {
    if let Err(errors) = schema.validate() {
        return Ok(join_form(&context, &schema, schema_errors(&errors), false)
            .await?
            .into_response());
    }

    let result = context
        .club
        .submissions
        .join(MembershipForm {
            name: schema.name.clone(),
            email: schema.email.clone(),
            phone: schema.phone.clone(),
            bio: schema.bio.clone(),
            favorite_genre_ids: schema.favorite_genre_ids(),
        })
        .await;

    match result {
        Ok(_) => Ok(Redirect::to("/unete?enviado=1").into_response()),
        Err(SubmissionError::Invalid(errors)) => Ok(join_form(
            &context,
            &schema,
            errors.to_serialized(),
            false,
        )
        .await?
        .into_response()),
        Err(SubmissionError::Db(e)) => Err(e.into()),
    }
}

pub fn router() -> Router {
    Router::new().route("/", get(join).post(send_join))
}
