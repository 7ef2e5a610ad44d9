//! Catalog service: the only component allowed to touch the book store.
//!
//! ISBN lookups before a write are a fast path for a friendly error. The
//! store's own uniqueness check on the write decides, and a `DuplicateIsbn`
//! from it surfaces as the same `Conflict`.

use std::sync::Arc;

use thiserror::Error;

use super::models::{Book, BookId, BookPatch, NewBook};
use super::store::{BookStore, StoreError};

pub const ISBN_CONFLICT: &str = "ISBN already exists";

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Book not found")]
    NotFound(BookId),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Store(StoreError),
}

impl CatalogError {
    fn isbn_conflict() -> Self {
        Self::Conflict(ISBN_CONFLICT.to_string())
    }
}

impl From<StoreError> for CatalogError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::DuplicateIsbn(isbn) => {
                tracing::debug!(%isbn, "store rejected duplicate ISBN");
                Self::isbn_conflict()
            }
            other => Self::Store(other),
        }
    }
}

pub struct CatalogService {
    store: Arc<dyn BookStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, book: NewBook) -> Result<Book, CatalogError> {
        if let Some(isbn) = book.isbn.as_deref() {
            if self.store.find_by_isbn(isbn).await?.is_some() {
                return Err(CatalogError::isbn_conflict());
            }
        }

        let book = self.store.insert(book).await?;
        tracing::info!(book_id = %book.id, "book created");
        Ok(book)
    }

    pub async fn list(&self) -> Result<Vec<Book>, CatalogError> {
        Ok(self.store.find_all().await?)
    }

    pub async fn get(&self, id: BookId) -> Result<Book, CatalogError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(CatalogError::NotFound(id))
    }

    pub async fn update(&self, id: BookId, patch: BookPatch) -> Result<Book, CatalogError> {
        let mut book = self.get(id).await?;

        if let Some(isbn) = patch.isbn.as_deref() {
            if book.isbn.as_deref() != Some(isbn) {
                if let Some(holder) = self.store.find_by_isbn(isbn).await? {
                    if holder.id != id {
                        return Err(CatalogError::isbn_conflict());
                    }
                }
            }
        }

        book.apply(patch);

        // The row can vanish between the read above and this write.
        if !self.store.update(&book).await? {
            return Err(CatalogError::NotFound(id));
        }

        tracing::info!(book_id = %id, "book updated");
        Ok(book)
    }

    pub async fn delete(&self, id: BookId) -> Result<(), CatalogError> {
        if !self.store.delete(id).await? {
            return Err(CatalogError::NotFound(id));
        }

        tracing::info!(book_id = %id, "book deleted");
        Ok(())
    }
}
