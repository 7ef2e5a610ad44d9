use std::fmt;

use serde::{Deserialize, Serialize};

/// Store-assigned surrogate key of a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(i64);

impl BookId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A persisted catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub year_published: Option<i32>,
}

impl Book {
    /// Overwrite every field present in `patch`, leaving the rest untouched.
    pub fn apply(&mut self, patch: BookPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(author) = patch.author {
            self.author = author;
        }
        if let Some(isbn) = patch.isbn {
            self.isbn = Some(isbn);
        }
        if let Some(year) = patch.year_published {
            self.year_published = Some(year);
        }
    }
}

/// Validated input for creating a book; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub year_published: Option<i32>,
}

impl NewBook {
    pub fn into_book(self, id: BookId) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            isbn: self.isbn,
            year_published: self.year_published,
        }
    }
}

/// Validated partial update. `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub year_published: Option<i32>,
}

/// Inbound JSON payload for both create and update.
///
/// Every field is optional here so validation can report each missing
/// required field by name instead of failing deserialization as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub year_published: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dune() -> Book {
        Book {
            id: BookId::new(1),
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            isbn: Some("0-441-17271-7".to_string()),
            year_published: Some(1965),
        }
    }

    #[test]
    fn book_serializes_with_camel_case_and_nulls() {
        let mut book = dune();
        book.isbn = None;
        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 1,
                "title": "Dune",
                "author": "Herbert",
                "isbn": null,
                "yearPublished": 1965
            })
        );
    }

    #[test]
    fn apply_overwrites_only_present_fields() {
        let mut book = dune();
        book.apply(BookPatch {
            year_published: Some(1990),
            ..BookPatch::default()
        });

        assert_eq!(book.title, "Dune");
        assert_eq!(book.author, "Herbert");
        assert_eq!(book.isbn.as_deref(), Some("0-441-17271-7"));
        assert_eq!(book.year_published, Some(1990));
    }

    #[test]
    fn request_accepts_partial_payloads() {
        let request: BookRequest = serde_json::from_str(r#"{"yearPublished": 1990}"#).unwrap();
        assert_eq!(
            request,
            BookRequest {
                year_published: Some(1990),
                ..BookRequest::default()
            }
        );
    }
}
