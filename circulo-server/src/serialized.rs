//! All view models handed to the template engine are defined here along with
//! the conversions from the club data types

use chrono::{DateTime, NaiveDate, Utc};
use circulo_club::{
    BlogPostData, BookData, BookReviewData, EventData, EventType, FieldError, GalleryImageData,
    GenreData, Paginated, ReadingStatus,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct Book {
    pub id: i64,
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
    pub genres: Vec<Genre>,
}

#[derive(Debug, Serialize)]
pub struct Review {
    pub id: i64,
    pub author_name: String,
    pub rating: i64,
    pub review_text: String,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub event_type: EventType,
    pub date: DateTime<Utc>,
    pub location: String,
    pub online_link: String,
    pub book_id: Option<i64>,
    pub max_participants: Option<i64>,
    pub is_past: bool,
}

#[derive(Debug, Serialize)]
pub struct BlogPost {
    pub id: i64,
    pub title: String,
    pub author_name: String,
    pub content: String,
    pub book_id: Option<i64>,
    pub featured_quote: String,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct GalleryImage {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub event_id: Option<i64>,
    pub upload_date: DateTime<Utc>,
    pub is_featured: bool,
}

/// Stateless page cursor handed to templates next to the page items
#[derive(Debug, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub total_pages: i64,
    pub total_items: i64,
    pub has_previous: bool,
    pub has_next: bool,
}

/// A field-level validation message shown next to its form field
#[derive(Debug, Serialize)]
pub struct FormError {
    pub field: String,
    pub message: String,
}

/// Helper trait to convert any type into a serialized version
pub trait ToSerialized<T>
where
    T: Serialize,
{
    fn to_serialized(&self) -> T;
}

impl<I, O> ToSerialized<Vec<O>> for Vec<I>
where
    I: ToSerialized<O>,
    O: Serialize,
{
    fn to_serialized(&self) -> Vec<O> {
        self.iter().map(|x| x.to_serialized()).collect()
    }
}

impl<I, O> ToSerialized<Option<O>> for Option<I>
where
    I: ToSerialized<O>,
    O: Serialize,
{
    fn to_serialized(&self) -> Option<O> {
        self.as_ref().map(|x| x.to_serialized())
    }
}

impl<T> ToSerialized<Pagination> for Paginated<T> {
    fn to_serialized(&self) -> Pagination {
        Pagination {
            page: self.page,
            total_pages: self.total_pages,
            total_items: self.total_items,
            has_previous: self.has_previous(),
            has_next: self.has_next(),
        }
    }
}

impl ToSerialized<Genre> for GenreData {
    fn to_serialized(&self) -> Genre {
        Genre {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

impl ToSerialized<Book> for BookData {
    fn to_serialized(&self) -> Book {
        Book {
            id: self.id,
            title: self.title.clone(),
            author: self.author.clone(),
            isbn: self.isbn.clone(),
            publication_year: self.publication_year,
            synopsis: self.synopsis.clone(),
            cover_image: self.cover_image.clone(),
            reading_status: self.reading_status,
            reading_start_date: self.reading_start_date,
            reading_end_date: self.reading_end_date,
            average_rating: self.average_rating,
            genres: self.genres.to_serialized(),
        }
    }
}

impl ToSerialized<Review> for BookReviewData {
    fn to_serialized(&self) -> Review {
        Review {
            id: self.id,
            author_name: self.author_name.clone(),
            rating: self.rating,
            review_text: self.review_text.clone(),
            is_featured: self.is_featured,
            created_at: self.created_at,
        }
    }
}

impl ToSerialized<Event> for EventData {
    fn to_serialized(&self) -> Event {
        Event {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            event_type: self.event_type,
            date: self.date,
            location: self.location.clone(),
            online_link: self.online_link.clone(),
            book_id: self.book_id,
            max_participants: self.max_participants,
            is_past: self.is_past(),
        }
    }
}

impl ToSerialized<BlogPost> for BlogPostData {
    fn to_serialized(&self) -> BlogPost {
        BlogPost {
            id: self.id,
            title: self.title.clone(),
            author_name: self.author_name.clone(),
            content: self.content.clone(),
            book_id: self.book_id,
            featured_quote: self.featured_quote.clone(),
            is_featured: self.is_featured,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl ToSerialized<GalleryImage> for GalleryImageData {
    fn to_serialized(&self) -> GalleryImage {
        GalleryImage {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            image_url: self.image_url.clone(),
            event_id: self.event_id,
            upload_date: self.upload_date,
            is_featured: self.is_featured,
        }
    }
}

impl ToSerialized<FormError> for FieldError {
    fn to_serialized(&self) -> FormError {
        FormError {
            field: self.field.to_string(),
            message: self.message.to_string(),
        }
    }
}
