use std::sync::Arc;

use chrono::Utc;

use crate::{
    util::{clamp_page, page_count},
    BlogPostData, BookData, BookReviewData, Database, DatabaseError, EventData, GalleryImageData,
    GenreData, LibraryFilter, Paginated, PrimaryKey,
};

/// Computes the result set for every public page of the site
pub struct Pages<Db> {
    db: Arc<Db>,
}

/// Content of the landing page
#[derive(Debug)]
pub struct HomePage {
    pub current_book: Option<BookData>,
    pub upcoming_events: Vec<EventData>,
    pub featured_posts: Vec<BlogPostData>,
    /// The most recent published post carrying a featured quote
    pub quote_post: Option<BlogPostData>,
}

#[derive(Debug)]
pub struct CurrentReadingPage {
    pub book: Option<BookData>,
    pub recent_reviews: Vec<BookReviewData>,
}

/// Upcoming and recent past events, split at a single `now` instant so the
/// two lists are disjoint
#[derive(Debug)]
pub struct EventsPage {
    pub upcoming: Vec<EventData>,
    pub past: Vec<EventData>,
}

#[derive(Debug)]
pub struct EventDetailPage {
    pub event: EventData,
    pub book: Option<BookData>,
    pub photos: Vec<GalleryImageData>,
}

#[derive(Debug)]
pub struct LibraryPage {
    pub books: Paginated<BookData>,
    pub genres: Vec<GenreData>,
    pub filter: LibraryFilter,
}

#[derive(Debug)]
pub struct BlogPostPage {
    pub post: BlogPostData,
    pub related_posts: Vec<BlogPostData>,
}

#[derive(Debug)]
pub struct GalleryPage {
    pub images: Paginated<GalleryImageData>,
    pub featured: Vec<GalleryImageData>,
}

impl<Db> Pages<Db>
where
    Db: Database,
{
    const HOME_EVENT_COUNT: i64 = 3;
    const HOME_FEATURED_POST_COUNT: i64 = 2;
    const RECENT_REVIEW_COUNT: i64 = 5;
    const PAST_EVENT_COUNT: i64 = 6;
    const RELATED_POST_COUNT: i64 = 3;
    const FEATURED_IMAGE_COUNT: i64 = 6;

    const LIBRARY_PAGE_SIZE: i64 = 12;
    const BLOG_PAGE_SIZE: i64 = 6;
    const GALLERY_PAGE_SIZE: i64 = 12;

    pub fn new(db: &Arc<Db>) -> Self {
        Self { db: db.clone() }
    }

    pub async fn home(&self) -> Result<HomePage, DatabaseError> {
        let now = Utc::now();

        Ok(HomePage {
            current_book: self.db.current_book().await?,
            upcoming_events: self
                .db
                .upcoming_events(now, Some(Self::HOME_EVENT_COUNT))
                .await?,
            featured_posts: self.db.featured_posts(Self::HOME_FEATURED_POST_COUNT).await?,
            quote_post: self.db.quote_post().await?,
        })
    }

    pub async fn current_reading(&self) -> Result<CurrentReadingPage, DatabaseError> {
        let book = self.db.current_book().await?;

        let recent_reviews = match &book {
            Some(book) => {
                self.db
                    .reviews_for_book(book.id, Some(Self::RECENT_REVIEW_COUNT))
                    .await?
            }
            None => vec![],
        };

        Ok(CurrentReadingPage {
            book,
            recent_reviews,
        })
    }

    pub async fn upcoming_readings(&self) -> Result<Vec<BookData>, DatabaseError> {
        self.db.upcoming_books().await
    }

    pub async fn events(&self) -> Result<EventsPage, DatabaseError> {
        let now = Utc::now();

        Ok(EventsPage {
            upcoming: self.db.upcoming_events(now, None).await?,
            past: self.db.past_events(now, Some(Self::PAST_EVENT_COUNT)).await?,
        })
    }

    pub async fn event_detail(&self, event_id: PrimaryKey) -> Result<EventDetailPage, DatabaseError> {
        let event = self.db.event_by_id(event_id).await?;

        let book = match event.book_id {
            Some(book_id) => Some(self.db.book_by_id(book_id).await?),
            None => None,
        };

        let photos = self.db.images_for_event(event_id).await?;

        Ok(EventDetailPage {
            event,
            book,
            photos,
        })
    }

    pub async fn library(
        &self,
        filter: LibraryFilter,
        page: i64,
    ) -> Result<LibraryPage, DatabaseError> {
        let total_items = self.db.count_completed_books(&filter).await?;
        let total_pages = page_count(total_items, Self::LIBRARY_PAGE_SIZE);
        let page = clamp_page(page, total_pages);

        let items = self
            .db
            .completed_books(
                &filter,
                Self::LIBRARY_PAGE_SIZE,
                (page - 1) * Self::LIBRARY_PAGE_SIZE,
            )
            .await?;

        Ok(LibraryPage {
            books: Paginated {
                items,
                page,
                per_page: Self::LIBRARY_PAGE_SIZE,
                total_items,
                total_pages,
            },
            genres: self.db.list_genres().await?,
            filter,
        })
    }

    pub async fn blog(&self, page: i64) -> Result<Paginated<BlogPostData>, DatabaseError> {
        let total_items = self.db.count_published_posts().await?;
        let total_pages = page_count(total_items, Self::BLOG_PAGE_SIZE);
        let page = clamp_page(page, total_pages);

        let items = self
            .db
            .published_posts(Self::BLOG_PAGE_SIZE, (page - 1) * Self::BLOG_PAGE_SIZE)
            .await?;

        Ok(Paginated {
            items,
            page,
            per_page: Self::BLOG_PAGE_SIZE,
            total_items,
            total_pages,
        })
    }

    /// Fails with NotFound for missing and unpublished posts alike
    pub async fn blog_post(&self, post_id: PrimaryKey) -> Result<BlogPostPage, DatabaseError> {
        let post = self.db.published_post_by_id(post_id).await?;

        let related_posts = match post.book_id {
            Some(book_id) => {
                self.db
                    .related_posts(book_id, post.id, Self::RELATED_POST_COUNT)
                    .await?
            }
            None => vec![],
        };

        Ok(BlogPostPage {
            post,
            related_posts,
        })
    }

    pub async fn gallery(&self, page: i64) -> Result<GalleryPage, DatabaseError> {
        let total_items = self.db.count_gallery_images().await?;
        let total_pages = page_count(total_items, Self::GALLERY_PAGE_SIZE);
        let page = clamp_page(page, total_pages);

        let items = self
            .db
            .gallery_images(
                Self::GALLERY_PAGE_SIZE,
                (page - 1) * Self::GALLERY_PAGE_SIZE,
            )
            .await?;

        Ok(GalleryPage {
            images: Paginated {
                items,
                page,
                per_page: Self::GALLERY_PAGE_SIZE,
                total_items,
                total_pages,
            },
            featured: self.db.featured_images(Self::FEATURED_IMAGE_COUNT).await?,
        })
    }
}

#[cfg(test)]
mod test {
    use chrono::{Duration, NaiveDate, Utc};

    use super::*;
    use crate::{
        NewBlogPost, NewBook, NewBookReview, NewEvent, NewGenre, EventType, ReadingStatus,
        SqliteDatabase,
    };

    async fn setup() -> (Arc<SqliteDatabase>, Pages<SqliteDatabase>) {
        let db = Arc::new(SqliteDatabase::in_memory().await.expect("database opens"));
        let pages = Pages::new(&db);

        (db, pages)
    }

    fn book(title: &str, author: &str, status: ReadingStatus) -> NewBook {
        NewBook {
            title: title.to_string(),
            author: author.to_string(),
            reading_status: status,
            ..Default::default()
        }
    }

    fn event(title: &str, offset_hours: i64, is_active: bool) -> NewEvent {
        NewEvent {
            title: title.to_string(),
            description: "".to_string(),
            event_type: EventType::Meeting,
            date: Utc::now() + Duration::hours(offset_hours),
            location: "".to_string(),
            online_link: "".to_string(),
            book_id: None,
            max_participants: None,
            is_active,
        }
    }

    fn post(title: &str, book_id: Option<i64>, published: bool) -> NewBlogPost {
        NewBlogPost {
            title: title.to_string(),
            author_name: "Ana".to_string(),
            content: "...".to_string(),
            book_id,
            featured_quote: "".to_string(),
            is_published: published,
            is_featured: false,
        }
    }

    #[tokio::test]
    async fn test_current_book_picks_lowest_id() {
        let (db, pages) = setup().await;

        let first = db
            .create_book(book("1984", "George Orwell", ReadingStatus::Current))
            .await
            .unwrap();
        db.create_book(book("Rayuela", "Julio Cortázar", ReadingStatus::Current))
            .await
            .unwrap();

        // The convention of a single current book is broken, the pick must
        // still be deterministic
        for _ in 0..3 {
            let page = pages.home().await.unwrap();
            assert_eq!(page.current_book.as_ref().unwrap().id, first.id);
        }
    }

    #[tokio::test]
    async fn test_current_reading_limits_reviews() {
        let (db, pages) = setup().await;

        let current = db
            .create_book(book("Pedro Páramo", "Juan Rulfo", ReadingStatus::Current))
            .await
            .unwrap();

        for i in 0..7 {
            db.create_review(NewBookReview {
                book_id: current.id,
                author_name: format!("Lector {i}"),
                rating: 4,
                review_text: "".to_string(),
                is_featured: false,
            })
            .await
            .unwrap();
        }

        let page = pages.current_reading().await.unwrap();
        assert_eq!(page.book.unwrap().id, current.id);
        assert_eq!(page.recent_reviews.len(), 5);
    }

    #[tokio::test]
    async fn test_upcoming_readings_sort_undated_last() {
        let (db, pages) = setup().await;

        let mut undated = book("Ficciones", "Jorge Luis Borges", ReadingStatus::Upcoming);
        undated.reading_start_date = None;

        let mut dated = book("El Aleph", "Jorge Luis Borges", ReadingStatus::Upcoming);
        dated.reading_start_date = NaiveDate::from_ymd_opt(2026, 10, 1);

        db.create_book(undated).await.unwrap();
        db.create_book(dated).await.unwrap();

        let books = pages.upcoming_readings().await.unwrap();
        assert_eq!(books.len(), 2);
        assert_eq!(books[0].title, "El Aleph");
        assert_eq!(books[1].title, "Ficciones");
    }

    #[tokio::test]
    async fn test_events_split_is_disjoint() {
        let (db, pages) = setup().await;

        db.create_event(event("Tertulia pasada", -48, true)).await.unwrap();
        db.create_event(event("Tertulia próxima", 48, true)).await.unwrap();
        db.create_event(event("Cancelada", 24, false)).await.unwrap();

        let page = pages.events().await.unwrap();

        assert_eq!(page.upcoming.len(), 1);
        assert_eq!(page.upcoming[0].title, "Tertulia próxima");
        assert_eq!(page.past.len(), 1);
        assert_eq!(page.past[0].title, "Tertulia pasada");
        assert!(page.past[0].is_past());
    }

    #[tokio::test]
    async fn test_library_search_and_genre_filter_combine() {
        let (db, pages) = setup().await;

        let dystopia = db
            .create_genre(NewGenre {
                name: "Distopía".to_string(),
                description: "".to_string(),
            })
            .await
            .unwrap();

        let mut orwell = book("Rebelión en la granja", "George Orwell", ReadingStatus::Completed);
        orwell.genre_ids = vec![dystopia.id];
        db.create_book(orwell).await.unwrap();

        db.create_book(book("1984", "George Orwell", ReadingStatus::Completed))
            .await
            .unwrap();
        db.create_book(book("La casa de los espíritus", "Isabel Allende", ReadingStatus::Completed))
            .await
            .unwrap();

        // Search alone, case-insensitive, matches title or author
        let page = pages
            .library(
                LibraryFilter {
                    genre: None,
                    search: Some("orwell".to_string()),
                },
                1,
            )
            .await
            .unwrap();
        assert_eq!(page.books.items.len(), 2);

        // Search and genre filter must both hold
        let page = pages
            .library(
                LibraryFilter {
                    genre: Some("Distopía".to_string()),
                    search: Some("orwell".to_string()),
                },
                1,
            )
            .await
            .unwrap();
        assert_eq!(page.books.items.len(), 1);
        assert_eq!(page.books.items[0].title, "Rebelión en la granja");
    }

    #[tokio::test]
    async fn test_library_pagination() {
        let (db, pages) = setup().await;

        for i in 0..13 {
            db.create_book(book(&format!("Libro {i}"), "Autora", ReadingStatus::Completed))
                .await
                .unwrap();
        }

        let page = pages.library(LibraryFilter::default(), 2).await.unwrap();

        assert_eq!(page.books.total_items, 13);
        assert_eq!(page.books.total_pages, 2);
        assert_eq!(page.books.items.len(), 1);
        assert!(page.books.has_previous());
        assert!(!page.books.has_next());
    }

    #[tokio::test]
    async fn test_blog_detail_hides_unpublished() {
        let (db, pages) = setup().await;

        let draft = db.create_post(post("Borrador", None, false)).await.unwrap();

        let result = pages.blog_post(draft.id).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_related_posts_share_the_book() {
        let (db, pages) = setup().await;

        let read = db
            .create_book(book("Cien años de soledad", "Gabriel García Márquez", ReadingStatus::Completed))
            .await
            .unwrap();

        let main = db.create_post(post("Macondo", Some(read.id), true)).await.unwrap();
        db.create_post(post("Sobre la estirpe", Some(read.id), true))
            .await
            .unwrap();
        db.create_post(post("Borrador relacionado", Some(read.id), false))
            .await
            .unwrap();
        db.create_post(post("Sin libro", None, true)).await.unwrap();

        let page = pages.blog_post(main.id).await.unwrap();

        assert_eq!(page.related_posts.len(), 1);
        assert_eq!(page.related_posts[0].title, "Sobre la estirpe");

        // A post without a related book relates to nothing
        let orphan = pages
            .blog_post(
                db.create_post(post("Suelto", None, true)).await.unwrap().id,
            )
            .await
            .unwrap();
        assert!(orphan.related_posts.is_empty());
    }

    #[tokio::test]
    async fn test_home_quote_post_requires_quote() {
        let (db, pages) = setup().await;

        db.create_post(post("Sin cita", None, true)).await.unwrap();

        let mut quoted = post("Con cita", None, true);
        quoted.featured_quote = "Muchos años después...".to_string();
        let quoted = db.create_post(quoted).await.unwrap();

        let page = pages.home().await.unwrap();
        assert_eq!(page.quote_post.unwrap().id, quoted.id);
    }
}
