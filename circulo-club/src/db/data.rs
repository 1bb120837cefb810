use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// The type used for primary keys in the database.
pub type PrimaryKey = i64;

/// Where a book sits in the club's reading cycle.
///
/// By convention a single book holds `Current` at a time. The schema does not
/// enforce this; readers of the current book always pick the lowest id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReadingStatus {
    Current,
    Upcoming,
    Completed,
}

impl Default for ReadingStatus {
    fn default() -> Self {
        Self::Upcoming
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Meeting,
    Discussion,
    AuthorTalk,
    Workshop,
    Other,
}

/// Moderation state of a reader-submitted book suggestion.
/// Only `Pending` suggestions can transition, and only in bulk via moderation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SuggestionStatus {
    Pending,
    Approved,
    Rejected,
}

/// A literary genre, shared by books and member preferences
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GenreData {
    pub id: PrimaryKey,
    pub name: String,
    pub description: String,
}

/// A book the club reads, has read, or plans to read
#[derive(Debug, Clone)]
pub struct BookData {
    pub id: PrimaryKey,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publication_year: Option<i64>,
    pub synopsis: String,
    /// External URL of the cover, never an uploaded file
    pub cover_image: String,
    pub reading_status: ReadingStatus,
    pub reading_start_date: Option<NaiveDate>,
    pub reading_end_date: Option<NaiveDate>,
    /// Kept to two decimals, set by the administrators
    pub average_rating: f64,
    pub created_at: DateTime<Utc>,
    pub genres: Vec<GenreData>,
}

/// A reader's review of a book. Owned by the book: deleted with it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BookReviewData {
    pub id: PrimaryKey,
    pub book_id: PrimaryKey,
    pub author_name: String,
    /// 1 through 5, enforced by the schema
    pub rating: i64,
    pub review_text: String,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

/// A club gathering, online or in person
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventData {
    pub id: PrimaryKey,
    pub title: String,
    pub description: String,
    pub event_type: EventType,
    pub date: DateTime<Utc>,
    pub location: String,
    pub online_link: String,
    /// Informative reference, cleared when the book is deleted
    pub book_id: Option<PrimaryKey>,
    pub max_participants: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl EventData {
    pub fn is_past(&self) -> bool {
        self.date < Utc::now()
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BlogPostData {
    pub id: PrimaryKey,
    pub title: String,
    pub author_name: String,
    pub content: String,
    /// Informative reference, cleared when the book is deleted
    pub book_id: Option<PrimaryKey>,
    pub featured_quote: String,
    pub is_published: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A registered member of the club
#[derive(Debug, Clone)]
pub struct MemberData {
    pub id: PrimaryKey,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub bio: String,
    pub join_date: DateTime<Utc>,
    pub is_active: bool,
    pub profile_image: String,
    pub favorite_genres: Vec<GenreData>,
}

/// A book suggested by a reader, waiting for moderation
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BookSuggestionData {
    pub id: PrimaryKey,
    pub title: String,
    pub author: String,
    pub suggested_by_name: String,
    pub suggested_by_email: String,
    pub reason: String,
    pub status: SuggestionStatus,
    pub created_at: DateTime<Utc>,
}

/// A newsletter subscription, unique per email
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SubscriberData {
    pub id: PrimaryKey,
    pub email: String,
    pub name: String,
    pub subscribed_at: DateTime<Utc>,
    pub is_active: bool,
}

/// A photo in the club gallery, optionally tied to an event
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GalleryImageData {
    pub id: PrimaryKey,
    pub title: String,
    pub description: String,
    pub image_url: String,
    /// Informative reference, cleared when the event is deleted
    pub event_id: Option<PrimaryKey>,
    pub upload_date: DateTime<Utc>,
    pub is_featured: bool,
}
