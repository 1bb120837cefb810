use std::sync::Arc;

use lazy_static::lazy_static;
use log::info;
use regex::Regex;
use thiserror::Error;

use crate::{
    BookSuggestionData, Database, DatabaseError, MemberData, NewMember, NewSubscriber,
    NewSuggestion, PrimaryKey, SubscriberData,
};

lazy_static! {
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex compiles");
}

/// Handles the public submission forms. Every handler either persists in a
/// single atomic operation or reports field errors without touching storage.
pub struct Submissions<Db> {
    db: Arc<Db>,
}

/// A single field that failed validation, with a reader-facing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Error)]
pub enum SubmissionError {
    /// One or more fields failed validation, nothing was persisted
    #[error("submission has invalid fields")]
    Invalid(Vec<FieldError>),
    /// Something else went wrong with the database
    #[error(transparent)]
    Db(#[from] DatabaseError),
}

/// What a newsletter sign-up attempt amounted to
#[derive(Debug)]
pub enum SubscribeOutcome {
    Subscribed(SubscriberData),
    /// The email was already on the list, nothing was changed
    AlreadySubscribed,
}

/// Raw field values of the book suggestion form
#[derive(Debug, Default)]
pub struct SuggestionForm {
    pub title: String,
    pub author: String,
    pub suggested_by_name: String,
    pub suggested_by_email: String,
    pub reason: String,
}

/// Raw field values of the membership form
#[derive(Debug, Default)]
pub struct MembershipForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub bio: String,
    pub favorite_genre_ids: Vec<PrimaryKey>,
}

/// Raw field values of the contact form
#[derive(Debug, Default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

const REQUIRED: &str = "Este campo es obligatorio";
const INVALID_EMAIL: &str = "Introduce un email válido";

/// Collects every failing field before reporting
struct FieldCheck {
    errors: Vec<FieldError>,
}

impl FieldCheck {
    fn new() -> Self {
        Self { errors: vec![] }
    }

    fn required(&mut self, field: &'static str, value: &str) {
        if value.trim().is_empty() {
            self.errors.push(FieldError {
                field,
                message: REQUIRED,
            });
        }
    }

    fn email(&mut self, field: &'static str, value: &str) {
        let value = value.trim();

        if value.is_empty() {
            self.errors.push(FieldError {
                field,
                message: REQUIRED,
            });
        } else if !EMAIL_REGEX.is_match(value) {
            self.errors.push(FieldError {
                field,
                message: INVALID_EMAIL,
            });
        }
    }

    fn finish(self) -> Result<(), SubmissionError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(SubmissionError::Invalid(self.errors))
        }
    }
}

impl<Db> Submissions<Db>
where
    Db: Database,
{
    pub fn new(db: &Arc<Db>) -> Self {
        Self { db: db.clone() }
    }

    /// Persists a reader's book suggestion with pending status
    pub async fn suggest_book(
        &self,
        form: SuggestionForm,
    ) -> Result<BookSuggestionData, SubmissionError> {
        let mut check = FieldCheck::new();
        check.required("title", &form.title);
        check.required("author", &form.author);
        check.required("suggested_by_name", &form.suggested_by_name);
        check.email("suggested_by_email", &form.suggested_by_email);
        check.required("reason", &form.reason);
        check.finish()?;

        let suggestion = self
            .db
            .create_suggestion(NewSuggestion {
                title: form.title.trim().to_string(),
                author: form.author.trim().to_string(),
                suggested_by_name: form.suggested_by_name.trim().to_string(),
                suggested_by_email: form.suggested_by_email.trim().to_string(),
                reason: form.reason.trim().to_string(),
            })
            .await?;

        info!(
            "{} sugirió \"{}\" de {}",
            suggestion.suggested_by_name, suggestion.title, suggestion.author
        );

        Ok(suggestion)
    }

    /// Registers a new active member
    pub async fn join(&self, form: MembershipForm) -> Result<MemberData, SubmissionError> {
        let mut check = FieldCheck::new();
        check.required("name", &form.name);
        check.email("email", &form.email);
        check.finish()?;

        let member = self
            .db
            .create_member(NewMember {
                name: form.name.trim().to_string(),
                email: form.email.trim().to_string(),
                phone: form.phone.trim().to_string(),
                bio: form.bio.trim().to_string(),
                profile_image: String::new(),
                favorite_genre_ids: form.favorite_genre_ids,
            })
            .await?;

        info!("{} se unió al club", member.name);

        Ok(member)
    }

    /// Validates and accepts a contact message. Delivery belongs to an
    /// external collaborator, so nothing is persisted.
    pub async fn contact(&self, form: ContactForm) -> Result<(), SubmissionError> {
        let mut check = FieldCheck::new();
        check.required("name", &form.name);
        check.email("email", &form.email);
        check.required("subject", &form.subject);
        check.required("message", &form.message);
        check.finish()?;

        info!(
            "Mensaje de contacto de {} <{}>: {}",
            form.name.trim(),
            form.email.trim(),
            form.subject.trim()
        );

        Ok(())
    }

    /// Subscribes an email to the newsletter. Idempotent: an email that is
    /// already on the list reports [SubscribeOutcome::AlreadySubscribed]
    /// without mutating anything.
    pub async fn subscribe(
        &self,
        email: &str,
        name: Option<&str>,
    ) -> Result<SubscribeOutcome, SubmissionError> {
        let mut check = FieldCheck::new();
        check.email("email", email);
        check.finish()?;

        let result = self
            .db
            .create_subscriber(NewSubscriber {
                email: email.trim().to_string(),
                name: name.unwrap_or_default().trim().to_string(),
            })
            .await;

        match result {
            Ok(subscriber) => {
                info!("{} se suscribió al boletín", subscriber.email);
                Ok(SubscribeOutcome::Subscribed(subscriber))
            }
            Err(DatabaseError::Conflict { .. }) => Ok(SubscribeOutcome::AlreadySubscribed),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{SqliteDatabase, SuggestionStatus};

    async fn setup() -> (Arc<SqliteDatabase>, Submissions<SqliteDatabase>) {
        let db = Arc::new(SqliteDatabase::in_memory().await.expect("database opens"));
        let submissions = Submissions::new(&db);

        (db, submissions)
    }

    fn suggestion() -> SuggestionForm {
        SuggestionForm {
            title: "El túnel".to_string(),
            author: "Ernesto Sabato".to_string(),
            suggested_by_name: "Marta".to_string(),
            suggested_by_email: "marta@example.com".to_string(),
            reason: "Corto e intenso".to_string(),
        }
    }

    #[tokio::test]
    async fn test_suggestion_starts_pending() {
        let (db, submissions) = setup().await;

        let created = submissions.suggest_book(suggestion()).await.unwrap();
        assert_eq!(created.status, SuggestionStatus::Pending);

        let pending = db
            .list_suggestions(Some(SuggestionStatus::Pending))
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_email_persists_nothing() {
        let (db, submissions) = setup().await;

        let mut form = suggestion();
        form.suggested_by_email = "no soy un email".to_string();

        let result = submissions.suggest_book(form).await;

        match result {
            Err(SubmissionError::Invalid(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "suggested_by_email");
            }
            other => panic!("expected validation failure, got {other:?}"),
        }

        assert!(db.list_suggestions(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_all_failing_fields_are_reported() {
        let (_, submissions) = setup().await;

        let result = submissions.suggest_book(SuggestionForm::default()).await;

        match result {
            Err(SubmissionError::Invalid(errors)) => assert_eq!(errors.len(), 5),
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_join_persists_genre_links() {
        let (db, submissions) = setup().await;

        let genre = db
            .create_genre(crate::NewGenre {
                name: "Poesía".to_string(),
                description: "".to_string(),
            })
            .await
            .unwrap();

        let member = submissions
            .join(MembershipForm {
                name: "Violeta".to_string(),
                email: "violeta@example.com".to_string(),
                favorite_genre_ids: vec![genre.id],
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(member.is_active);
        assert_eq!(member.favorite_genres.len(), 1);
        assert_eq!(member.favorite_genres[0].name, "Poesía");
    }

    #[tokio::test]
    async fn test_contact_is_never_persisted() {
        let (db, submissions) = setup().await;

        submissions
            .contact(ContactForm {
                name: "Raúl".to_string(),
                email: "raul@example.com".to_string(),
                subject: "Horarios".to_string(),
                message: "¿A qué hora se reúnen?".to_string(),
            })
            .await
            .unwrap();

        // Contact leaves no trace in any entity
        assert!(db.list_members().await.unwrap().is_empty());
        assert!(db.list_suggestions(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_subscribe_is_idempotent() {
        let (db, submissions) = setup().await;

        let first = submissions
            .subscribe("ines@example.com", Some("Inés"))
            .await
            .unwrap();
        assert!(matches!(first, SubscribeOutcome::Subscribed(_)));

        let second = submissions
            .subscribe("ines@example.com", None)
            .await
            .unwrap();
        assert!(matches!(second, SubscribeOutcome::AlreadySubscribed));

        // The second attempt did not clear the stored name
        let stored = db.subscriber_by_email("ines@example.com").await.unwrap();
        assert_eq!(stored.name, "Inés");
    }

    #[tokio::test]
    async fn test_subscribe_requires_email() {
        let (_, submissions) = setup().await;

        let result = submissions.subscribe("", None).await;

        match result {
            Err(SubmissionError::Invalid(errors)) => {
                assert_eq!(errors[0].field, "email");
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }
}
