//! Payload validation run at the request boundary, before the catalog
//! service sees a request.

use once_cell::sync::Lazy;
use regex::Regex;

use super::models::{BookPatch, BookRequest, NewBook};

pub const TITLE_MAX_CHARS: usize = 200;
pub const AUTHOR_MAX_CHARS: usize = 120;
pub const YEAR_MIN: i32 = 1400;
pub const YEAR_MAX: i32 = 2100;

static ISBN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9-]{10,17}$").expect("valid ISBN regex"));

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every field that failed validation, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl IntoIterator for ValidationErrors {
    type Item = (&'static str, String);
    type IntoIter =
        std::iter::Map<std::vec::IntoIter<FieldError>, fn(FieldError) -> (&'static str, String)>;

    fn into_iter(self) -> Self::IntoIter {
        let pair: fn(FieldError) -> (&'static str, String) = |e| (e.field, e.message);
        self.0.into_iter().map(pair)
    }
}

/// Validate a create payload; `title` and `author` are required.
pub fn validate_create(request: &BookRequest) -> Result<NewBook, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    check_required_text(&mut errors, "title", request.title.as_deref(), TITLE_MAX_CHARS);
    check_required_text(&mut errors, "author", request.author.as_deref(), AUTHOR_MAX_CHARS);
    check_optional(&mut errors, request);

    errors.into_result(NewBook {
        title: request.title.clone().unwrap_or_default(),
        author: request.author.clone().unwrap_or_default(),
        isbn: request.isbn.clone(),
        year_published: request.year_published,
    })
}

/// Validate an update payload; only the fields present are checked.
pub fn validate_update(request: &BookRequest) -> Result<BookPatch, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if let Some(title) = request.title.as_deref() {
        check_required_text(&mut errors, "title", Some(title), TITLE_MAX_CHARS);
    }
    if let Some(author) = request.author.as_deref() {
        check_required_text(&mut errors, "author", Some(author), AUTHOR_MAX_CHARS);
    }
    check_optional(&mut errors, request);

    errors.into_result(BookPatch {
        title: request.title.clone(),
        author: request.author.clone(),
        isbn: request.isbn.clone(),
        year_published: request.year_published,
    })
}

fn check_required_text(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<&str>,
    max_chars: usize,
) {
    match value {
        None => errors.push(field, "must not be blank"),
        Some(v) if v.trim().is_empty() => errors.push(field, "must not be blank"),
        Some(v) if v.contains('\0') => errors.push(field, "must not contain NUL characters"),
        Some(v) if v.chars().count() > max_chars => {
            errors.push(field, format!("size must be between 0 and {}", max_chars))
        }
        Some(_) => {}
    }
}

fn check_optional(errors: &mut ValidationErrors, request: &BookRequest) {
    if let Some(isbn) = request.isbn.as_deref() {
        if !ISBN_PATTERN.is_match(isbn) {
            errors.push("isbn", "Invalid ISBN");
        }
    }

    match request.year_published {
        Some(year) if year < YEAR_MIN => errors.push(
            "yearPublished",
            format!("must be greater than or equal to {}", YEAR_MIN),
        ),
        Some(year) if year > YEAR_MAX => errors.push(
            "yearPublished",
            format!("must be less than or equal to {}", YEAR_MAX),
        ),
        _ => {}
    }
}
