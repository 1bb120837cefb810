use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

mod data;
pub use data::*;

mod sqlite;
pub use sqlite::*;

pub type Result<T> = std::result::Result<T, DatabaseError>;
pub type BoxedDatabase = Box<dyn Database>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    /// An unknown or internal error happened with the database
    #[error(transparent)]
    Internal(Box<dyn std::error::Error + Send + Sync>),
    /// A resource already exists
    #[error("{resource} with {field} of value {value} already exists")]
    Conflict {
        /// The resource in question
        resource: &'static str,
        /// The field that is conflicting
        field: &'static str,
        /// The conflicting value
        value: String,
    },
    /// A resource in the database doesn't exist
    #[error("{resource}:{identifier} doesn't exist")]
    NotFound {
        resource: &'static str,
        identifier: &'static str,
    },
}

/// Helper trait to reduce boilerplate
pub trait IntoDatabaseError {
    fn not_found_or(self, resource: &'static str, identifier: &'static str) -> DatabaseError;
    fn any(self) -> DatabaseError;
}

/// Optional predicates applied to the completed-books shelf.
/// Both present means both must hold.
#[derive(Debug, Clone, Default)]
pub struct LibraryFilter {
    /// Exact genre name
    pub genre: Option<String>,
    /// Case-insensitive substring matched against title or author
    pub search: Option<String>,
}

/// Represents a type that can store and query the club's content
#[async_trait]
pub trait Database: Send + Sync {
    async fn list_genres(&self) -> Result<Vec<GenreData>>;
    async fn genre_by_id(&self, genre_id: PrimaryKey) -> Result<GenreData>;
    async fn genre_by_name(&self, name: &str) -> Result<GenreData>;
    async fn create_genre(&self, new_genre: NewGenre) -> Result<GenreData>;
    async fn delete_genre(&self, genre_id: PrimaryKey) -> Result<()>;

    async fn book_by_id(&self, book_id: PrimaryKey) -> Result<BookData>;
    /// The book currently being read. Lowest id wins if the convention of a
    /// single current book is broken.
    async fn current_book(&self) -> Result<Option<BookData>>;
    /// Upcoming books by start date ascending, undated ones last
    async fn upcoming_books(&self) -> Result<Vec<BookData>>;
    /// Completed books by end date descending, filtered per [LibraryFilter]
    async fn completed_books(
        &self,
        filter: &LibraryFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BookData>>;
    async fn count_completed_books(&self, filter: &LibraryFilter) -> Result<i64>;
    async fn create_book(&self, new_book: NewBook) -> Result<BookData>;
    async fn update_book(&self, updated_book: UpdatedBook) -> Result<BookData>;
    /// Deletes a book, its reviews and genre links; events and blog posts
    /// referring to it survive with the reference cleared
    async fn delete_book(&self, book_id: PrimaryKey) -> Result<()>;

    async fn reviews_for_book(
        &self,
        book_id: PrimaryKey,
        limit: Option<i64>,
    ) -> Result<Vec<BookReviewData>>;
    async fn create_review(&self, new_review: NewBookReview) -> Result<BookReviewData>;
    async fn delete_review(&self, review_id: PrimaryKey) -> Result<()>;

    async fn event_by_id(&self, event_id: PrimaryKey) -> Result<EventData>;
    /// Active events at or after `now`, soonest first
    async fn upcoming_events(&self, now: DateTime<Utc>, limit: Option<i64>)
        -> Result<Vec<EventData>>;
    /// Events strictly before `now`, most recent first
    async fn past_events(&self, now: DateTime<Utc>, limit: Option<i64>) -> Result<Vec<EventData>>;
    async fn create_event(&self, new_event: NewEvent) -> Result<EventData>;
    async fn update_event(&self, updated_event: UpdatedEvent) -> Result<EventData>;
    /// Deletes an event; gallery images referring to it survive with the
    /// reference cleared
    async fn delete_event(&self, event_id: PrimaryKey) -> Result<()>;

    async fn published_post_by_id(&self, post_id: PrimaryKey) -> Result<BlogPostData>;
    async fn published_posts(&self, limit: i64, offset: i64) -> Result<Vec<BlogPostData>>;
    async fn count_published_posts(&self) -> Result<i64>;
    /// Published posts flagged featured, newest first
    async fn featured_posts(&self, limit: i64) -> Result<Vec<BlogPostData>>;
    /// The most recent published post carrying a featured quote
    async fn quote_post(&self) -> Result<Option<BlogPostData>>;
    /// Published posts about the same book, excluding the post itself
    async fn related_posts(
        &self,
        book_id: PrimaryKey,
        exclude_id: PrimaryKey,
        limit: i64,
    ) -> Result<Vec<BlogPostData>>;
    async fn create_post(&self, new_post: NewBlogPost) -> Result<BlogPostData>;
    async fn update_post(&self, updated_post: UpdatedBlogPost) -> Result<BlogPostData>;
    async fn delete_post(&self, post_id: PrimaryKey) -> Result<()>;

    async fn member_by_id(&self, member_id: PrimaryKey) -> Result<MemberData>;
    async fn list_members(&self) -> Result<Vec<MemberData>>;
    async fn create_member(&self, new_member: NewMember) -> Result<MemberData>;
    async fn delete_member(&self, member_id: PrimaryKey) -> Result<()>;

    async fn suggestion_by_id(&self, suggestion_id: PrimaryKey) -> Result<BookSuggestionData>;
    async fn list_suggestions(
        &self,
        status: Option<SuggestionStatus>,
    ) -> Result<Vec<BookSuggestionData>>;
    async fn create_suggestion(&self, new_suggestion: NewSuggestion)
        -> Result<BookSuggestionData>;
    /// Moves the pending suggestions among `ids` to `status`, returning how
    /// many rows actually changed
    async fn resolve_suggestions(
        &self,
        ids: &[PrimaryKey],
        status: SuggestionStatus,
    ) -> Result<u64>;
    async fn delete_suggestion(&self, suggestion_id: PrimaryKey) -> Result<()>;

    async fn subscriber_by_email(&self, email: &str) -> Result<SubscriberData>;
    /// Inserts a subscriber, failing with [DatabaseError::Conflict] when the
    /// email is already subscribed. The unique index on email is the guard,
    /// so two concurrent identical submissions cannot both insert.
    async fn create_subscriber(&self, new_subscriber: NewSubscriber) -> Result<SubscriberData>;
    async fn delete_subscriber(&self, subscriber_id: PrimaryKey) -> Result<()>;

    async fn gallery_images(&self, limit: i64, offset: i64) -> Result<Vec<GalleryImageData>>;
    async fn count_gallery_images(&self) -> Result<i64>;
    async fn featured_images(&self, limit: i64) -> Result<Vec<GalleryImageData>>;
    async fn images_for_event(&self, event_id: PrimaryKey) -> Result<Vec<GalleryImageData>>;
    async fn create_image(&self, new_image: NewGalleryImage) -> Result<GalleryImageData>;
    async fn delete_image(&self, image_id: PrimaryKey) -> Result<()>;
}

#[derive(Debug)]
pub struct NewGenre {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Default)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publication_year: Option<i64>,
    pub synopsis: String,
    pub cover_image: String,
    pub reading_status: ReadingStatus,
    pub reading_start_date: Option<NaiveDate>,
    pub reading_end_date: Option<NaiveDate>,
    pub average_rating: f64,
    pub genre_ids: Vec<PrimaryKey>,
}

#[derive(Debug)]
pub struct UpdatedBook {
    pub id: PrimaryKey,
    pub reading_status: Option<ReadingStatus>,
    pub reading_start_date: Option<NaiveDate>,
    pub reading_end_date: Option<NaiveDate>,
    pub average_rating: Option<f64>,
}

#[derive(Debug)]
pub struct NewBookReview {
    pub book_id: PrimaryKey,
    pub author_name: String,
    pub rating: i64,
    pub review_text: String,
    pub is_featured: bool,
}

#[derive(Debug)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub event_type: EventType,
    pub date: DateTime<Utc>,
    pub location: String,
    pub online_link: String,
    pub book_id: Option<PrimaryKey>,
    pub max_participants: Option<i64>,
    pub is_active: bool,
}

#[derive(Debug)]
pub struct UpdatedEvent {
    pub id: PrimaryKey,
    pub date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub online_link: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug)]
pub struct NewBlogPost {
    pub title: String,
    pub author_name: String,
    pub content: String,
    pub book_id: Option<PrimaryKey>,
    pub featured_quote: String,
    pub is_published: bool,
    pub is_featured: bool,
}

#[derive(Debug)]
pub struct UpdatedBlogPost {
    pub id: PrimaryKey,
    pub title: Option<String>,
    pub content: Option<String>,
    pub featured_quote: Option<String>,
    pub is_published: Option<bool>,
    pub is_featured: Option<bool>,
}

#[derive(Debug)]
pub struct NewMember {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub bio: String,
    pub profile_image: String,
    pub favorite_genre_ids: Vec<PrimaryKey>,
}

#[derive(Debug)]
pub struct NewSuggestion {
    pub title: String,
    pub author: String,
    pub suggested_by_name: String,
    pub suggested_by_email: String,
    pub reason: String,
}

#[derive(Debug)]
pub struct NewSubscriber {
    pub email: String,
    pub name: String,
}

#[derive(Debug)]
pub struct NewGalleryImage {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub event_id: Option<PrimaryKey>,
    pub is_featured: bool,
}
