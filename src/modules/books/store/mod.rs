//! Persistence port for book records.
//!
//! Implementations must enforce ISBN uniqueness themselves, atomically with
//! the write. Callers may look an ISBN up first, but only the store's answer
//! on `insert`/`update` is authoritative.

mod memory;
mod postgres;

pub use memory::InMemoryBookStore;
pub use postgres::PostgresBookStore;
pub(crate) use postgres::ISBN_CONSTRAINT;

use async_trait::async_trait;

use super::models::{Book, BookId, NewBook};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("ISBN {0} is already taken")]
    DuplicateIsbn(String),

    #[error("storage backend failure: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

#[async_trait]
pub trait BookStore: Send + Sync {
    /// Persist a new book and return it with its assigned id.
    async fn insert(&self, book: NewBook) -> Result<Book, StoreError>;

    /// Every stored book, ascending by id.
    async fn find_all(&self) -> Result<Vec<Book>, StoreError>;

    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>, StoreError>;

    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>, StoreError>;

    /// Overwrite the stored row with `book`. Returns `false` if the row is gone.
    async fn update(&self, book: &Book) -> Result<bool, StoreError>;

    /// Returns `false` if no row had that id.
    async fn delete(&self, id: BookId) -> Result<bool, StoreError>;
}
