//! HTTP boundary of the books module, mounted under `/api/books`.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use shelf_http::AppError;

use super::models::{Book, BookId, BookRequest};
use super::service::{CatalogError, CatalogService};
use super::validation::{validate_create, validate_update, ValidationErrors};

impl From<CatalogError> for AppError {
    fn from(error: CatalogError) -> Self {
        match error {
            error @ CatalogError::NotFound(_) => AppError::not_found(error.to_string()),
            CatalogError::Conflict(message) => AppError::conflict(message),
            CatalogError::Store(e) => AppError::Internal(anyhow::Error::new(e)),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::validation(errors)
    }
}

pub fn router(service: Arc<CatalogService>) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/health", get(health_check))
        .route("/{id}", get(get_book).put(update_book).delete(delete_book))
        .with_state(service)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "books module is healthy"
}

async fn create_book(
    State(service): State<Arc<CatalogService>>,
    payload: Result<Json<BookRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let Json(request) = payload?;
    let book = validate_create(&request)?;
    let created = service.create(book).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_books(
    State(service): State<Arc<CatalogService>>,
) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(service.list().await?))
}

async fn get_book(
    State(service): State<Arc<CatalogService>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Book>, AppError> {
    let Path(id) = id?;
    Ok(Json(service.get(BookId::new(id)).await?))
}

async fn update_book(
    State(service): State<Arc<CatalogService>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<BookRequest>, JsonRejection>,
) -> Result<Json<Book>, AppError> {
    let Path(id) = id?;
    let Json(request) = payload?;
    let patch = validate_update(&request)?;
    Ok(Json(service.update(BookId::new(id), patch).await?))
}

async fn delete_book(
    State(service): State<Arc<CatalogService>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    service.delete(BookId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
