use async_trait::async_trait;
use sqlx::PgPool;

use super::{BookStore, StoreError};
use crate::modules::books::models::{Book, BookId, NewBook};

/// Name of the unique constraint created by the `001_init` books migration.
pub(crate) const ISBN_CONSTRAINT: &str = "books_isbn_unique";

pub struct PostgresBookStore {
    pool: PgPool,
}

impl PostgresBookStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookRow {
    id: i64,
    title: String,
    author: String,
    isbn: Option<String>,
    year_published: Option<i32>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Book {
            id: BookId::new(row.id),
            title: row.title,
            author: row.author,
            isbn: row.isbn,
            year_published: row.year_published,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        StoreError::Backend(Box::new(error))
    }
}

/// Map a unique-index violation on ISBN to `DuplicateIsbn`.
fn classify(error: sqlx::Error, isbn: Option<&str>) -> StoreError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.is_unique_violation() && db_error.constraint() == Some(ISBN_CONSTRAINT) {
            return StoreError::DuplicateIsbn(isbn.unwrap_or_default().to_string());
        }
    }
    StoreError::from(error)
}

#[async_trait]
impl BookStore for PostgresBookStore {
    async fn insert(&self, book: NewBook) -> Result<Book, StoreError> {
        sqlx::query_as::<_, BookRow>(
            // language=postgresql
            r#"
            INSERT INTO books (title, author, isbn, year_published)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, author, isbn, year_published
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.year_published)
        .fetch_one(&self.pool)
        .await
        .map(Book::from)
        .map_err(|e| classify(e, book.isbn.as_deref()))
    }

    async fn find_all(&self) -> Result<Vec<Book>, StoreError> {
        let rows = sqlx::query_as::<_, BookRow>(
            // language=postgresql
            r#"
            SELECT id, title, author, isbn, year_published
            FROM books
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>, StoreError> {
        let row = sqlx::query_as::<_, BookRow>(
            // language=postgresql
            r#"
            SELECT id, title, author, isbn, year_published
            FROM books
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Book::from))
    }

    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>, StoreError> {
        let row = sqlx::query_as::<_, BookRow>(
            // language=postgresql
            r#"
            SELECT id, title, author, isbn, year_published
            FROM books
            WHERE isbn = $1
            "#,
        )
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Book::from))
    }

    async fn update(&self, book: &Book) -> Result<bool, StoreError> {
        let result = sqlx::query(
            // language=postgresql
            r#"
            UPDATE books
            SET title = $2, author = $3, isbn = $4, year_published = $5
            WHERE id = $1
            "#,
        )
        .bind(book.id.get())
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.year_published)
        .execute(&self.pool)
        .await
        .map_err(|e| classify(e, book.isbn.as_deref()))?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, id: BookId) -> Result<bool, StoreError> {
        let result = sqlx::query(
            // language=postgresql
            r#"
            DELETE FROM books
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
