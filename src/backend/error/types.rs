/**
 * Backend Error Types
 *
 * This module defines the error type returned by HTTP handlers. Every
 * variant knows its HTTP status code, so handlers can propagate lower-level
 * failures with `?` and let `IntoResponse` do the rest.
 *
 * # Status Code Mapping
 *
 * - `HandlerError` - whatever status it was built with
 * - `NotFound` - 404
 * - `Conflict` - 409 (concurrent edits kept winning, or a duplicate key)
 * - `SharedError` - 400
 * - `StoreError` - 503 when the database is unreachable, 400 for
 *   constraint violations, 500 otherwise
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::optimistic::UpdateError;
use crate::backend::store::{ConstraintKind, StoreError};
use crate::shared::SharedError;

/// Backend-specific error types
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error (e.g., malformed request body)
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// The addressed resource does not exist
    #[error("{message}")]
    NotFound { message: String },

    /// The request lost to concurrent writers
    #[error("{message}")]
    Conflict { message: String },

    /// Validation failure from the shared module
    #[error(transparent)]
    SharedError(#[from] SharedError),

    /// Storage failure
    #[error(transparent)]
    StoreError(StoreError),
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a new conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::SharedError(_) => StatusCode::BAD_REQUEST,
            Self::StoreError(err) => match err {
                StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                StoreError::Constraint { .. } => StatusCode::BAD_REQUEST,
                StoreError::Conflict(_) | StoreError::Migration(_) | StoreError::Database(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    /// Get the error message shown to clients.
    ///
    /// Database internals are not echoed back.
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::NotFound { message } | Self::Conflict { message } => message.clone(),
            Self::SharedError(err) => err.message().to_string(),
            Self::StoreError(StoreError::Unavailable(_)) => "Database connection failed".to_string(),
            Self::StoreError(StoreError::Constraint { .. }) => "Invalid input data".to_string(),
            Self::StoreError(_) => "Database error occurred".to_string(),
        }
    }
}

impl From<StoreError> for BackendError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Constraint {
                kind: ConstraintKind::Unique,
                message,
            } => {
                tracing::warn!("Duplicate key: {}", message);
                Self::conflict("Record already exists")
            }
            other => Self::StoreError(other),
        }
    }
}

impl From<UpdateError> for BackendError {
    fn from(err: UpdateError) -> Self {
        match err {
            UpdateError::NotFound => Self::not_found("Conversation not found"),
            UpdateError::ConflictExhausted { .. } => {
                Self::conflict("Failed to update due to concurrent modifications")
            }
            UpdateError::Storage(err) => err.into(),
        }
    }
}
