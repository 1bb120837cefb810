use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{
    query, query_as, query_scalar,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Error as SqlxError, QueryBuilder, Sqlite, SqlitePool,
};

use crate::{
    BlogPostData, BookData, BookReviewData, BookSuggestionData, Database, DatabaseError, EventData,
    GalleryImageData, GenreData, IntoDatabaseError, LibraryFilter, MemberData,
    NewBlogPost, NewBook, NewBookReview, NewEvent, NewGalleryImage, NewGenre, NewMember,
    NewSubscriber, NewSuggestion, PrimaryKey, ReadingStatus, Result, SubscriberData,
    SuggestionStatus, UpdatedBlogPost, UpdatedBook, UpdatedEvent,
};

/// A SQLite database implementation for the club
pub struct SqliteDatabase {
    pool: SqlitePool,
}

/// Book row without its genres, which are attached by a second query
#[derive(sqlx::FromRow)]
struct BookRow {
    id: PrimaryKey,
    title: String,
    author: String,
    isbn: String,
    publication_year: Option<i64>,
    synopsis: String,
    cover_image: String,
    reading_status: ReadingStatus,
    reading_start_date: Option<NaiveDate>,
    reading_end_date: Option<NaiveDate>,
    average_rating: f64,
    created_at: DateTime<Utc>,
}

impl BookRow {
    fn into_data(self, genres: Vec<GenreData>) -> BookData {
        BookData {
            id: self.id,
            title: self.title,
            author: self.author,
            isbn: self.isbn,
            publication_year: self.publication_year,
            synopsis: self.synopsis,
            cover_image: self.cover_image,
            reading_status: self.reading_status,
            reading_start_date: self.reading_start_date,
            reading_end_date: self.reading_end_date,
            average_rating: self.average_rating,
            created_at: self.created_at,
            genres,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MemberRow {
    id: PrimaryKey,
    name: String,
    email: String,
    phone: String,
    bio: String,
    join_date: DateTime<Utc>,
    is_active: bool,
    profile_image: String,
}

impl MemberRow {
    fn into_data(self, favorite_genres: Vec<GenreData>) -> MemberData {
        MemberData {
            id: self.id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            bio: self.bio,
            join_date: self.join_date,
            is_active: self.is_active,
            profile_image: self.profile_image,
            favorite_genres,
        }
    }
}

impl SqliteDatabase {
    pub async fn new(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| e.any())?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| e.any())?;

        Ok(Self { pool })
    }

    /// An in-memory database, used by tests. Capped to a single connection
    /// because every in-memory connection is its own database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| e.any())?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| e.any())?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Applies the embedded schema migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DatabaseError::Internal(Box::new(e)))
    }

    async fn book_genres(&self, book_id: PrimaryKey) -> Result<Vec<GenreData>> {
        query_as::<_, GenreData>(
            "SELECT genres.* FROM genres
                INNER JOIN book_genres ON book_genres.genre_id = genres.id
            WHERE book_genres.book_id = ?
            ORDER BY genres.name",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn member_genres(&self, member_id: PrimaryKey) -> Result<Vec<GenreData>> {
        query_as::<_, GenreData>(
            "SELECT genres.* FROM genres
                INNER JOIN member_genres ON member_genres.genre_id = genres.id
            WHERE member_genres.member_id = ?
            ORDER BY genres.name",
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn attach_genres(&self, rows: Vec<BookRow>) -> Result<Vec<BookData>> {
        let mut books = Vec::with_capacity(rows.len());

        for row in rows {
            let genres = self.book_genres(row.id).await?;
            books.push(row.into_data(genres));
        }

        Ok(books)
    }
}

/// Appends the library predicates to a completed-books query
fn push_library_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &LibraryFilter) {
    if let Some(genre) = filter.genre.as_deref() {
        builder.push(
            " AND EXISTS (
                SELECT 1 FROM book_genres
                    INNER JOIN genres ON genres.id = book_genres.genre_id
                WHERE book_genres.book_id = books.id AND genres.name = ",
        );
        builder.push_bind(genre.to_string());
        builder.push(")");
    }

    if let Some(search) = filter.search.as_deref() {
        let pattern = format!("%{}%", search.to_lowercase());

        builder.push(" AND (LOWER(books.title) LIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR LOWER(books.author) LIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn list_genres(&self) -> Result<Vec<GenreData>> {
        query_as::<_, GenreData>("SELECT * FROM genres ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.any())
    }

    async fn genre_by_id(&self, genre_id: PrimaryKey) -> Result<GenreData> {
        query_as::<_, GenreData>("SELECT * FROM genres WHERE id = ?")
            .bind(genre_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("genre", "id"))
    }

    async fn genre_by_name(&self, name: &str) -> Result<GenreData> {
        query_as::<_, GenreData>("SELECT * FROM genres WHERE name = ?")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("genre", "name"))
    }

    async fn create_genre(&self, new_genre: NewGenre) -> Result<GenreData> {
        query_as::<_, GenreData>(
            "INSERT INTO genres (name, description) VALUES (?, ?) RETURNING *",
        )
        .bind(&new_genre.name)
        .bind(&new_genre.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.conflict_or_any("genre", "name", &new_genre.name))
    }

    async fn delete_genre(&self, genre_id: PrimaryKey) -> Result<()> {
        // Ensure genre exists
        let _ = self.genre_by_id(genre_id).await?;

        query("DELETE FROM genres WHERE id = ?")
            .bind(genre_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn book_by_id(&self, book_id: PrimaryKey) -> Result<BookData> {
        let row = query_as::<_, BookRow>("SELECT * FROM books WHERE id = ?")
            .bind(book_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("book", "id"))?;

        let genres = self.book_genres(book_id).await?;

        Ok(row.into_data(genres))
    }

    async fn current_book(&self) -> Result<Option<BookData>> {
        let row = query_as::<_, BookRow>(
            "SELECT * FROM books WHERE reading_status = 'current' ORDER BY id LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| e.any())?;

        match row {
            Some(row) => {
                let genres = self.book_genres(row.id).await?;
                Ok(Some(row.into_data(genres)))
            }
            None => Ok(None),
        }
    }

    async fn upcoming_books(&self) -> Result<Vec<BookData>> {
        let rows = query_as::<_, BookRow>(
            "SELECT * FROM books WHERE reading_status = 'upcoming'
            ORDER BY reading_start_date IS NULL, reading_start_date, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())?;

        self.attach_genres(rows).await
    }

    async fn completed_books(
        &self,
        filter: &LibraryFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BookData>> {
        let mut builder = QueryBuilder::new(
            "SELECT books.* FROM books WHERE books.reading_status = 'completed'",
        );

        push_library_filter(&mut builder, filter);

        builder.push(" ORDER BY books.reading_end_date IS NULL, books.reading_end_date DESC, books.id DESC LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let rows = builder
            .build_query_as::<BookRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.any())?;

        self.attach_genres(rows).await
    }

    async fn count_completed_books(&self, filter: &LibraryFilter) -> Result<i64> {
        let mut builder = QueryBuilder::new(
            "SELECT COUNT(*) FROM books WHERE books.reading_status = 'completed'",
        );

        push_library_filter(&mut builder, filter);

        builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.any())
    }

    async fn create_book(&self, new_book: NewBook) -> Result<BookData> {
        let mut tx = self.pool.begin().await.map_err(|e| e.any())?;

        let book_id: PrimaryKey = query_scalar(
            "INSERT INTO books (
                title, author, isbn, publication_year, synopsis, cover_image,
                reading_status, reading_start_date, reading_end_date,
                average_rating, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(&new_book.title)
        .bind(&new_book.author)
        .bind(&new_book.isbn)
        .bind(new_book.publication_year)
        .bind(&new_book.synopsis)
        .bind(&new_book.cover_image)
        .bind(new_book.reading_status)
        .bind(new_book.reading_start_date)
        .bind(new_book.reading_end_date)
        .bind((new_book.average_rating * 100.0).round() / 100.0)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| e.any())?;

        for genre_id in &new_book.genre_ids {
            query("INSERT INTO book_genres (book_id, genre_id) VALUES (?, ?)")
                .bind(book_id)
                .bind(genre_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| e.any())?;
        }

        tx.commit().await.map_err(|e| e.any())?;

        self.book_by_id(book_id).await
    }

    async fn update_book(&self, updated_book: UpdatedBook) -> Result<BookData> {
        let book = self.book_by_id(updated_book.id).await?;

        query(
            "UPDATE books SET
                reading_status = ?,
                reading_start_date = ?,
                reading_end_date = ?,
                average_rating = ?
            WHERE id = ?",
        )
        .bind(updated_book.reading_status.unwrap_or(book.reading_status))
        .bind(updated_book.reading_start_date.or(book.reading_start_date))
        .bind(updated_book.reading_end_date.or(book.reading_end_date))
        .bind(
            updated_book
                .average_rating
                .map(|r| (r * 100.0).round() / 100.0)
                .unwrap_or(book.average_rating),
        )
        .bind(updated_book.id)
        .execute(&self.pool)
        .await
        .map_err(|e| e.any())?;

        self.book_by_id(updated_book.id).await
    }

    async fn delete_book(&self, book_id: PrimaryKey) -> Result<()> {
        // Ensure book exists
        let _ = self.book_by_id(book_id).await?;

        // Reviews and genre links cascade, events and posts keep a nulled
        // reference, all enforced by the schema
        query("DELETE FROM books WHERE id = ?")
            .bind(book_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn reviews_for_book(
        &self,
        book_id: PrimaryKey,
        limit: Option<i64>,
    ) -> Result<Vec<BookReviewData>> {
        // LIMIT -1 means no limit in SQLite
        query_as::<_, BookReviewData>(
            "SELECT * FROM book_reviews WHERE book_id = ?
            ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(book_id)
        .bind(limit.unwrap_or(-1))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn create_review(&self, new_review: NewBookReview) -> Result<BookReviewData> {
        // Ensure book exists
        let _ = self.book_by_id(new_review.book_id).await?;

        query_as::<_, BookReviewData>(
            "INSERT INTO book_reviews (book_id, author_name, rating, review_text, is_featured, created_at)
            VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(new_review.book_id)
        .bind(&new_review.author_name)
        .bind(new_review.rating)
        .bind(&new_review.review_text)
        .bind(new_review.is_featured)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn delete_review(&self, review_id: PrimaryKey) -> Result<()> {
        query_as::<_, BookReviewData>("SELECT * FROM book_reviews WHERE id = ?")
            .bind(review_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("review", "id"))?;

        query("DELETE FROM book_reviews WHERE id = ?")
            .bind(review_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn event_by_id(&self, event_id: PrimaryKey) -> Result<EventData> {
        query_as::<_, EventData>("SELECT * FROM events WHERE id = ?")
            .bind(event_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("event", "id"))
    }

    async fn upcoming_events(
        &self,
        now: DateTime<Utc>,
        limit: Option<i64>,
    ) -> Result<Vec<EventData>> {
        query_as::<_, EventData>(
            "SELECT * FROM events WHERE is_active = TRUE AND date >= ?
            ORDER BY date, id LIMIT ?",
        )
        .bind(now)
        .bind(limit.unwrap_or(-1))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn past_events(&self, now: DateTime<Utc>, limit: Option<i64>) -> Result<Vec<EventData>> {
        query_as::<_, EventData>(
            "SELECT * FROM events WHERE date < ?
            ORDER BY date DESC, id DESC LIMIT ?",
        )
        .bind(now)
        .bind(limit.unwrap_or(-1))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn create_event(&self, new_event: NewEvent) -> Result<EventData> {
        query_as::<_, EventData>(
            "INSERT INTO events (
                title, description, event_type, date, location, online_link,
                book_id, max_participants, is_active, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(&new_event.title)
        .bind(&new_event.description)
        .bind(new_event.event_type)
        .bind(new_event.date)
        .bind(&new_event.location)
        .bind(&new_event.online_link)
        .bind(new_event.book_id)
        .bind(new_event.max_participants)
        .bind(new_event.is_active)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn update_event(&self, updated_event: UpdatedEvent) -> Result<EventData> {
        let event = self.event_by_id(updated_event.id).await?;

        query(
            "UPDATE events SET
                date = ?,
                location = ?,
                online_link = ?,
                is_active = ?
            WHERE id = ?",
        )
        .bind(updated_event.date.unwrap_or(event.date))
        .bind(updated_event.location.unwrap_or(event.location))
        .bind(updated_event.online_link.unwrap_or(event.online_link))
        .bind(updated_event.is_active.unwrap_or(event.is_active))
        .bind(updated_event.id)
        .execute(&self.pool)
        .await
        .map_err(|e| e.any())?;

        self.event_by_id(updated_event.id).await
    }

    async fn delete_event(&self, event_id: PrimaryKey) -> Result<()> {
        // Ensure event exists
        let _ = self.event_by_id(event_id).await?;

        // Gallery images keep a nulled reference, enforced by the schema
        query("DELETE FROM events WHERE id = ?")
            .bind(event_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn published_post_by_id(&self, post_id: PrimaryKey) -> Result<BlogPostData> {
        query_as::<_, BlogPostData>(
            "SELECT * FROM blog_posts WHERE id = ? AND is_published = TRUE",
        )
        .bind(post_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.not_found_or("blog post", "id"))
    }

    async fn published_posts(&self, limit: i64, offset: i64) -> Result<Vec<BlogPostData>> {
        query_as::<_, BlogPostData>(
            "SELECT * FROM blog_posts WHERE is_published = TRUE
            ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn count_published_posts(&self) -> Result<i64> {
        query_scalar("SELECT COUNT(*) FROM blog_posts WHERE is_published = TRUE")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.any())
    }

    async fn featured_posts(&self, limit: i64) -> Result<Vec<BlogPostData>> {
        query_as::<_, BlogPostData>(
            "SELECT * FROM blog_posts WHERE is_published = TRUE AND is_featured = TRUE
            ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn quote_post(&self) -> Result<Option<BlogPostData>> {
        query_as::<_, BlogPostData>(
            "SELECT * FROM blog_posts WHERE is_published = TRUE AND featured_quote <> ''
            ORDER BY created_at DESC, id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn related_posts(
        &self,
        book_id: PrimaryKey,
        exclude_id: PrimaryKey,
        limit: i64,
    ) -> Result<Vec<BlogPostData>> {
        query_as::<_, BlogPostData>(
            "SELECT * FROM blog_posts
            WHERE is_published = TRUE AND book_id = ? AND id <> ?
            ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(book_id)
        .bind(exclude_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn create_post(&self, new_post: NewBlogPost) -> Result<BlogPostData> {
        let now = Utc::now();

        query_as::<_, BlogPostData>(
            "INSERT INTO blog_posts (
                title, author_name, content, book_id, featured_quote,
                is_published, is_featured, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(&new_post.title)
        .bind(&new_post.author_name)
        .bind(&new_post.content)
        .bind(new_post.book_id)
        .bind(&new_post.featured_quote)
        .bind(new_post.is_published)
        .bind(new_post.is_featured)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn update_post(&self, updated_post: UpdatedBlogPost) -> Result<BlogPostData> {
        let post = query_as::<_, BlogPostData>("SELECT * FROM blog_posts WHERE id = ?")
            .bind(updated_post.id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("blog post", "id"))?;

        query(
            "UPDATE blog_posts SET
                title = ?,
                content = ?,
                featured_quote = ?,
                is_published = ?,
                is_featured = ?,
                updated_at = ?
            WHERE id = ?",
        )
        .bind(updated_post.title.unwrap_or(post.title))
        .bind(updated_post.content.unwrap_or(post.content))
        .bind(updated_post.featured_quote.unwrap_or(post.featured_quote))
        .bind(updated_post.is_published.unwrap_or(post.is_published))
        .bind(updated_post.is_featured.unwrap_or(post.is_featured))
        .bind(Utc::now())
        .bind(updated_post.id)
        .execute(&self.pool)
        .await
        .map_err(|e| e.any())?;

        query_as::<_, BlogPostData>("SELECT * FROM blog_posts WHERE id = ?")
            .bind(updated_post.id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.any())
    }

    async fn delete_post(&self, post_id: PrimaryKey) -> Result<()> {
        query_as::<_, BlogPostData>("SELECT * FROM blog_posts WHERE id = ?")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("blog post", "id"))?;

        query("DELETE FROM blog_posts WHERE id = ?")
            .bind(post_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn member_by_id(&self, member_id: PrimaryKey) -> Result<MemberData> {
        let row = query_as::<_, MemberRow>("SELECT * FROM members WHERE id = ?")
            .bind(member_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("member", "id"))?;

        let genres = self.member_genres(member_id).await?;

        Ok(row.into_data(genres))
    }

    async fn list_members(&self) -> Result<Vec<MemberData>> {
        let rows = query_as::<_, MemberRow>("SELECT * FROM members ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.any())?;

        let mut members = Vec::with_capacity(rows.len());

        for row in rows {
            let genres = self.member_genres(row.id).await?;
            members.push(row.into_data(genres));
        }

        Ok(members)
    }

    async fn create_member(&self, new_member: NewMember) -> Result<MemberData> {
        let mut tx = self.pool.begin().await.map_err(|e| e.any())?;

        let member_id: PrimaryKey = query_scalar(
            "INSERT INTO members (name, email, phone, bio, join_date, is_active, profile_image)
            VALUES (?, ?, ?, ?, ?, TRUE, ?) RETURNING id",
        )
        .bind(&new_member.name)
        .bind(&new_member.email)
        .bind(&new_member.phone)
        .bind(&new_member.bio)
        .bind(Utc::now())
        .bind(&new_member.profile_image)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| e.any())?;

        for genre_id in &new_member.favorite_genre_ids {
            query("INSERT INTO member_genres (member_id, genre_id) VALUES (?, ?)")
                .bind(member_id)
                .bind(genre_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| e.any())?;
        }

        tx.commit().await.map_err(|e| e.any())?;

        self.member_by_id(member_id).await
    }

    async fn delete_member(&self, member_id: PrimaryKey) -> Result<()> {
        // Ensure member exists
        let _ = self.member_by_id(member_id).await?;

        query("DELETE FROM members WHERE id = ?")
            .bind(member_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn suggestion_by_id(&self, suggestion_id: PrimaryKey) -> Result<BookSuggestionData> {
        query_as::<_, BookSuggestionData>("SELECT * FROM book_suggestions WHERE id = ?")
            .bind(suggestion_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("suggestion", "id"))
    }

    async fn list_suggestions(
        &self,
        status: Option<SuggestionStatus>,
    ) -> Result<Vec<BookSuggestionData>> {
        match status {
            Some(status) => query_as::<_, BookSuggestionData>(
                "SELECT * FROM book_suggestions WHERE status = ?
                ORDER BY created_at DESC, id DESC",
            )
            .bind(status)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.any()),
            None => query_as::<_, BookSuggestionData>(
                "SELECT * FROM book_suggestions ORDER BY created_at DESC, id DESC",
            )
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.any()),
        }
    }

    async fn create_suggestion(
        &self,
        new_suggestion: NewSuggestion,
    ) -> Result<BookSuggestionData> {
        query_as::<_, BookSuggestionData>(
            "INSERT INTO book_suggestions (
                title, author, suggested_by_name, suggested_by_email, reason,
                status, created_at
            ) VALUES (?, ?, ?, ?, ?, 'pending', ?) RETURNING *",
        )
        .bind(&new_suggestion.title)
        .bind(&new_suggestion.author)
        .bind(&new_suggestion.suggested_by_name)
        .bind(&new_suggestion.suggested_by_email)
        .bind(&new_suggestion.reason)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn resolve_suggestions(
        &self,
        ids: &[PrimaryKey],
        status: SuggestionStatus,
    ) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut builder =
            QueryBuilder::new("UPDATE book_suggestions SET status = ");

        builder.push_bind(status);
        builder.push(" WHERE status = 'pending' AND id IN (");

        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        builder.push(")");

        builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|r| r.rows_affected())
    }

    async fn delete_suggestion(&self, suggestion_id: PrimaryKey) -> Result<()> {
        // Ensure suggestion exists
        let _ = self.suggestion_by_id(suggestion_id).await?;

        query("DELETE FROM book_suggestions WHERE id = ?")
            .bind(suggestion_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn subscriber_by_email(&self, email: &str) -> Result<SubscriberData> {
        query_as::<_, SubscriberData>("SELECT * FROM newsletter_subscribers WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("subscriber", "email"))
    }

    async fn create_subscriber(&self, new_subscriber: NewSubscriber) -> Result<SubscriberData> {
        // The unique index arbitrates concurrent identical submissions, so
        // a lost race surfaces here as zero affected rows
        let result = query(
            "INSERT INTO newsletter_subscribers (email, name, subscribed_at, is_active)
            VALUES (?, ?, ?, TRUE) ON CONFLICT (email) DO NOTHING",
        )
        .bind(&new_subscriber.email)
        .bind(&new_subscriber.name)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| e.any())?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::Conflict {
                resource: "subscriber",
                field: "email",
                value: new_subscriber.email,
            });
        }

        self.subscriber_by_email(&new_subscriber.email).await
    }

    async fn delete_subscriber(&self, subscriber_id: PrimaryKey) -> Result<()> {
        query_as::<_, SubscriberData>("SELECT * FROM newsletter_subscribers WHERE id = ?")
            .bind(subscriber_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("subscriber", "id"))?;

        query("DELETE FROM newsletter_subscribers WHERE id = ?")
            .bind(subscriber_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn gallery_images(&self, limit: i64, offset: i64) -> Result<Vec<GalleryImageData>> {
        query_as::<_, GalleryImageData>(
            "SELECT * FROM gallery_images
            ORDER BY upload_date DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn count_gallery_images(&self) -> Result<i64> {
        query_scalar("SELECT COUNT(*) FROM gallery_images")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.any())
    }

    async fn featured_images(&self, limit: i64) -> Result<Vec<GalleryImageData>> {
        query_as::<_, GalleryImageData>(
            "SELECT * FROM gallery_images WHERE is_featured = TRUE
            ORDER BY upload_date DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn images_for_event(&self, event_id: PrimaryKey) -> Result<Vec<GalleryImageData>> {
        query_as::<_, GalleryImageData>(
            "SELECT * FROM gallery_images WHERE event_id = ?
            ORDER BY upload_date DESC, id DESC",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn create_image(&self, new_image: NewGalleryImage) -> Result<GalleryImageData> {
        query_as::<_, GalleryImageData>(
            "INSERT INTO gallery_images (
                title, description, image_url, event_id, upload_date, is_featured
            ) VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(&new_image.title)
        .bind(&new_image.description)
        .bind(&new_image.image_url)
        .bind(new_image.event_id)
        .bind(Utc::now())
        .bind(new_image.is_featured)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn delete_image(&self, image_id: PrimaryKey) -> Result<()> {
        query_as::<_, GalleryImageData>("SELECT * FROM gallery_images WHERE id = ?")
            .bind(image_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("gallery image", "id"))?;

        query("DELETE FROM gallery_images WHERE id = ?")
            .bind(image_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }
}

impl IntoDatabaseError for SqlxError {
    fn any(self) -> DatabaseError {
        DatabaseError::Internal(Box::new(self))
    }

    fn not_found_or(self, resource: &'static str, identifier: &'static str) -> DatabaseError {
        match self {
            SqlxError::RowNotFound => DatabaseError::NotFound {
                resource,
                identifier,
            },
            e => Self::any(e),
        }
    }
}

/// Maps unique constraint violations to [DatabaseError::Conflict]
trait ConflictExt {
    fn conflict_or_any(
        self,
        resource: &'static str,
        field: &'static str,
        value: &str,
    ) -> DatabaseError;
}

impl ConflictExt for SqlxError {
    fn conflict_or_any(
        self,
        resource: &'static str,
        field: &'static str,
        value: &str,
    ) -> DatabaseError {
        match self.as_database_error() {
            Some(e) if e.is_unique_violation() => DatabaseError::Conflict {
                resource,
                field,
                value: value.to_string(),
            },
            _ => self.any(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::EventType;

    async fn setup() -> SqliteDatabase {
        SqliteDatabase::in_memory().await.expect("database opens")
    }

    async fn seed_book(db: &SqliteDatabase, status: ReadingStatus) -> BookData {
        db.create_book(NewBook {
            title: "Sobre héroes y tumbas".to_string(),
            author: "Ernesto Sabato".to_string(),
            reading_status: status,
            ..Default::default()
        })
        .await
        .unwrap()
    }

    async fn seed_event(db: &SqliteDatabase, book_id: Option<PrimaryKey>) -> EventData {
        db.create_event(NewEvent {
            title: "Tertulia".to_string(),
            description: "".to_string(),
            event_type: EventType::Discussion,
            date: Utc::now(),
            location: "Biblioteca municipal".to_string(),
            online_link: "".to_string(),
            book_id,
            max_participants: Some(20),
            is_active: true,
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_deleting_a_book_cascades_reviews() {
        let db = setup().await;
        let book = seed_book(&db, ReadingStatus::Completed).await;

        for i in 0..3 {
            db.create_review(NewBookReview {
                book_id: book.id,
                author_name: format!("Lector {i}"),
                rating: 5,
                review_text: "".to_string(),
                is_featured: false,
            })
            .await
            .unwrap();
        }

        db.delete_book(book.id).await.unwrap();

        let reviews = db.reviews_for_book(book.id, None).await.unwrap();
        assert!(reviews.is_empty());
    }

    #[tokio::test]
    async fn test_deleting_a_book_nullifies_weak_references() {
        let db = setup().await;
        let book = seed_book(&db, ReadingStatus::Current).await;

        let event = seed_event(&db, Some(book.id)).await;
        let post = db
            .create_post(NewBlogPost {
                title: "Primeras impresiones".to_string(),
                author_name: "Ana".to_string(),
                content: "...".to_string(),
                book_id: Some(book.id),
                featured_quote: "".to_string(),
                is_published: true,
                is_featured: false,
            })
            .await
            .unwrap();

        db.delete_book(book.id).await.unwrap();

        // Both survive with the reference cleared
        assert_eq!(db.event_by_id(event.id).await.unwrap().book_id, None);
        assert_eq!(db.published_post_by_id(post.id).await.unwrap().book_id, None);
    }

    #[tokio::test]
    async fn test_deleting_an_event_nullifies_gallery_references() {
        let db = setup().await;
        let event = seed_event(&db, None).await;

        let image = db
            .create_image(NewGalleryImage {
                title: "Foto del encuentro".to_string(),
                description: "".to_string(),
                image_url: "https://example.com/foto.jpg".to_string(),
                event_id: Some(event.id),
                is_featured: false,
            })
            .await
            .unwrap();

        db.delete_event(event.id).await.unwrap();

        let images = db.gallery_images(-1, 0).await.unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].id, image.id);
        assert_eq!(images[0].event_id, None);
    }

    #[tokio::test]
    async fn test_duplicate_subscriber_conflicts() {
        let db = setup().await;

        db.create_subscriber(NewSubscriber {
            email: "ana@example.com".to_string(),
            name: "Ana".to_string(),
        })
        .await
        .unwrap();

        let result = db
            .create_subscriber(NewSubscriber {
                email: "ana@example.com".to_string(),
                name: "Otra Ana".to_string(),
            })
            .await;

        assert!(matches!(result, Err(DatabaseError::Conflict { .. })));

        let stored = db.subscriber_by_email("ana@example.com").await.unwrap();
        assert_eq!(stored.name, "Ana");
    }

    #[tokio::test]
    async fn test_duplicate_genre_name_conflicts() {
        let db = setup().await;

        db.create_genre(NewGenre {
            name: "Novela".to_string(),
            description: "".to_string(),
        })
        .await
        .unwrap();

        let result = db
            .create_genre(NewGenre {
                name: "Novela".to_string(),
                description: "otra descripción".to_string(),
            })
            .await;

        assert!(matches!(result, Err(DatabaseError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_missing_rows_report_not_found() {
        let db = setup().await;

        assert!(matches!(
            db.book_by_id(99).await,
            Err(DatabaseError::NotFound { .. })
        ));
        assert!(matches!(
            db.event_by_id(99).await,
            Err(DatabaseError::NotFound { .. })
        ));
        assert!(matches!(
            db.delete_book(99).await,
            Err(DatabaseError::NotFound { .. })
        ));
    }
}
