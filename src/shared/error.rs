//! Shared Error Types
//!
//! This module defines error types raised while checking the request
//! payloads in `shared`. They carry no HTTP knowledge; the backend maps them
//! onto status codes.
//!
//! # Usage
//!
//! ```rust
//! use convodesk::shared::error::SharedError;
//!
//! let error = SharedError::validation("duration", "Duration must be a positive number");
//! assert!(error.to_string().contains("duration"));
//! ```
use thiserror::Error;

/// Errors produced by shared types
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Name of the offending field
    pub fn field(&self) -> &str {
        match self {
            Self::ValidationError { field, .. } => field,
        }
    }

    /// Message shown to clients
    pub fn message(&self) -> &str {
        match self {
            Self::ValidationError { message, .. } => message,
        }
    }
}
