//! Error handling for the shelf HTTP layer

use std::collections::BTreeMap;

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const CONFLICT: &str = "CONFLICT";
pub const NOT_FOUND: &str = "NOT_FOUND";
pub const BAD_REQUEST: &str = "BAD_REQUEST";
pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";

/// Error response body.
///
/// Validation failures carry `fields`; every other error carries `message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,
}

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation error: {} field(s) rejected", .fields.len())]
    Validation { fields: BTreeMap<String, String> },

    #[error("conflict: {message}")]
    Conflict { message: String },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("bad request: {message}")]
    BadRequest { message: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a validation error from field/message pairs
    ///
    /// When a field is reported more than once the first message is kept.
    pub fn validation<I, F, M>(fields: I) -> Self
    where
        I: IntoIterator<Item = (F, M)>,
        F: Into<String>,
        M: Into<String>,
    {
        let mut map = BTreeMap::new();
        for (field, message) in fields {
            map.entry(field.into()).or_insert_with(|| message.into());
        }
        Self::Validation { fields: map }
    }

    /// Create a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// HTTP status this error is rendered with
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::Conflict { .. } | AppError::BadRequest { .. } => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::now_v7();
        let status = self.status();

        let body = match self {
            AppError::Validation { fields } => ErrorBody {
                error: VALIDATION_ERROR.to_string(),
                message: None,
                fields: Some(fields),
            },
            AppError::Conflict { message } => message_body(CONFLICT, message),
            AppError::NotFound { message } => message_body(NOT_FOUND, message),
            AppError::BadRequest { message } => message_body(BAD_REQUEST, message),
            AppError::Internal(e) => {
                tracing::error!(
                    error_id = %error_id,
                    error_code = INTERNAL_ERROR,
                    status_code = %status.as_u16(),
                    error = ?e,
                    "request error"
                );
                message_body(INTERNAL_ERROR, internal_message(&e))
            }
        };

        if !status.is_server_error() {
            tracing::info!(
                error_id = %error_id,
                error_code = %body.error,
                status_code = %status.as_u16(),
                "request rejected"
            );
        }

        (status, Json(body)).into_response()
    }
}

/// Release builds keep internal details in the logs only.
fn internal_message(error: &anyhow::Error) -> String {
    if cfg!(debug_assertions) {
        error.to_string()
    } else {
        "An internal server error occurred".to_string()
    }
}

fn message_body(code: &str, message: String) -> ErrorBody {
    ErrorBody {
        error: code.to_string(),
        message: Some(message),
        fields: None,
    }
}
