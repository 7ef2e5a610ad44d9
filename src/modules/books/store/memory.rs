use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{BookStore, StoreError};
use crate::modules::books::models::{Book, BookId, NewBook};

/// Process-local store. Ids start at 1 and are never reused.
#[derive(Default)]
pub struct InMemoryBookStore {
    inner: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    last_id: i64,
    rows: BTreeMap<BookId, Book>,
    isbn_index: HashMap<String, BookId>,
}

impl InMemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookStore for InMemoryBookStore {
    async fn insert(&self, book: NewBook) -> Result<Book, StoreError> {
        let mut tables = self.inner.write().await;

        if let Some(isbn) = book.isbn.as_deref() {
            if tables.isbn_index.contains_key(isbn) {
                return Err(StoreError::DuplicateIsbn(isbn.to_string()));
            }
        }

        tables.last_id += 1;
        let book = book.into_book(BookId::new(tables.last_id));
        if let Some(isbn) = &book.isbn {
            tables.isbn_index.insert(isbn.clone(), book.id);
        }
        tables.rows.insert(book.id, book.clone());

        Ok(book)
    }

    async fn find_all(&self) -> Result<Vec<Book>, StoreError> {
        Ok(self.inner.read().await.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>, StoreError> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>, StoreError> {
        let tables = self.inner.read().await;
        Ok(tables
            .isbn_index
            .get(isbn)
            .and_then(|id| tables.rows.get(id))
            .cloned())
    }

    async fn update(&self, book: &Book) -> Result<bool, StoreError> {
        let mut tables = self.inner.write().await;

        let Some(previous_isbn) = tables.rows.get(&book.id).map(|row| row.isbn.clone()) else {
            return Ok(false);
        };

        if let Some(isbn) = book.isbn.as_deref() {
            match tables.isbn_index.get(isbn) {
                Some(holder) if *holder != book.id => {
                    return Err(StoreError::DuplicateIsbn(isbn.to_string()));
                }
                _ => {}
            }
        }

        if previous_isbn != book.isbn {
            if let Some(old) = previous_isbn {
                tables.isbn_index.remove(&old);
            }
            if let Some(new) = &book.isbn {
                tables.isbn_index.insert(new.clone(), book.id);
            }
        }
        tables.rows.insert(book.id, book.clone());

        Ok(true)
    }

    async fn delete(&self, id: BookId) -> Result<bool, StoreError> {
        let mut tables = self.inner.write().await;

        match tables.rows.remove(&id) {
            Some(removed) => {
                if let Some(isbn) = removed.isbn {
                    tables.isbn_index.remove(&isbn);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_book(title: &str, isbn: Option<&str>) -> NewBook {
        NewBook {
            title: title.to_string(),
            author: "Author".to_string(),
            isbn: isbn.map(str::to_string),
            year_published: None,
        }
    }

    #[tokio::test]
    async fn ids_are_sequential_and_not_reused() {
        let store = InMemoryBookStore::new();
        let first = store.insert(new_book("a", None)).await.unwrap();
        let second = store.insert(new_book("b", None)).await.unwrap();
        assert_eq!(first.id, BookId::new(1));
        assert_eq!(second.id, BookId::new(2));

        assert!(store.delete(second.id).await.unwrap());
        let third = store.insert(new_book("c", None)).await.unwrap();
        assert_eq!(third.id, BookId::new(3));
    }

    #[tokio::test]
    async fn missing_isbns_do_not_collide() {
        let store = InMemoryBookStore::new();
        store.insert(new_book("a", None)).await.unwrap();
        store.insert(new_book("b", None)).await.unwrap();
        assert_eq!(store.find_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn insert_rejects_taken_isbn() {
        let store = InMemoryBookStore::new();
        store
            .insert(new_book("a", Some("1234567890")))
            .await
            .unwrap();

        let err = store
            .insert(new_book("b", Some("1234567890")))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateIsbn(isbn) if isbn == "1234567890"));
        assert_eq!(store.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_moves_isbn_index() {
        let store = InMemoryBookStore::new();
        let mut book = store
            .insert(new_book("a", Some("1111111111")))
            .await
            .unwrap();

        book.isbn = Some("2222222222".to_string());
        assert!(store.update(&book).await.unwrap());

        assert!(store.find_by_isbn("1111111111").await.unwrap().is_none());
        assert_eq!(
            store.find_by_isbn("2222222222").await.unwrap().map(|b| b.id),
            Some(book.id)
        );

        // The released ISBN is free for another record.
        store
            .insert(new_book("b", Some("1111111111")))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn update_rejects_isbn_held_by_another_row() {
        let store = InMemoryBookStore::new();
        store
            .insert(new_book("a", Some("1111111111")))
            .await
            .unwrap();
        let mut second = store
            .insert(new_book("b", Some("2222222222")))
            .await
            .unwrap();

        second.isbn = Some("1111111111".to_string());
        let err = store.update(&second).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateIsbn(_)));

        let stored = store.find_by_id(second.id).await.unwrap().unwrap();
        assert_eq!(stored.isbn.as_deref(), Some("2222222222"));
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_rows() {
        let store = InMemoryBookStore::new();
        let ghost = new_book("ghost", None).into_book(BookId::new(42));
        assert!(!store.update(&ghost).await.unwrap());
        assert!(!store.delete(ghost.id).await.unwrap());
    }
}
