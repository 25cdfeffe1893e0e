//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service.
//!
//! Every failure is converted at the request boundary into a JSON body of the
//! shape `{"error": <message>}` with a matching status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use crate::config::ConfigError;
use crate::extract::ExtractError;
use wikiquiz_core::ports::PortError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Missing or malformed request input.
    #[error("{0}")]
    Validation(String),

    /// The request has no valid session, or presented bad credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// The requested resource does not exist (or is not owned by the caller).
    #[error("{0}")]
    NotFound(String),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents a failure while extracting the page digest from HTML.
    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// A convenience type alias for handler return values.
pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),

            ApiError::Port(port) => match port {
                PortError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
                PortError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
                PortError::Unauthorized => {
                    (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
                }
                PortError::InvalidModelReply(detail) => {
                    // The raw reply never reaches the client.
                    error!("Enrichment model returned unparseable output: {detail}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Invalid JSON from AI".to_string(),
                    )
                }
                PortError::Unexpected(msg) => {
                    error!("Port operation failed: {msg}");
                    (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
                }
            },

            ApiError::Extract(e) => {
                error!("Page extraction failed: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }

            ApiError::Database(err) => classify_sqlx_error(err),

            ApiError::Config(e) => {
                error!("Configuration error surfaced in a request: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An Internal Error Occurred".to_string(),
                )
            }
            ApiError::Io(e) => {
                error!("IO error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An Internal Error Occurred".to_string(),
                )
            }
            ApiError::Internal(msg) => {
                error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An Internal Error Occurred".to_string(),
                )
            }
        };

        let body = json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into an HTTP status and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (PostgreSQL code 23505) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, String) {
    match err {
        sqlx::Error::RowNotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            (StatusCode::CONFLICT, "User already exists".to_string())
        }
        other => {
            error!("Database error: {other}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An Internal Error Occurred".to_string(),
            )
        }
    }
}
