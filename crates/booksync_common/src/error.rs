// --- File: crates/booksync_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type for all booksync errors.
///
/// Each crate keeps its own error enum and implements `From<SpecificError> for BooksyncError`
/// so the HTTP surface and the binary can report failures uniformly.
#[derive(Error, Debug)]
pub enum BooksyncError {
    /// Error occurred during an HTTP request
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error occurred during authentication or authorization
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Error occurred during validation of a request
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The token store could not be reached
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Error occurred during external service call
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// The request conflicts with the current state
    #[error("Conflict: {0}")]
    ConflictError(String),

    /// A required provider or dependency is not available
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Error occurred due to a timeout
    #[error("Timeout: {0}")]
    TimeoutError(String),

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for BooksyncError {
    fn status_code(&self) -> u16 {
        match self {
            BooksyncError::HttpError(_) => 500,
            BooksyncError::ParseError(_) => 400,
            BooksyncError::ConfigError(_) => 500,
            BooksyncError::AuthError(_) => 401,
            BooksyncError::ValidationError(_) => 400,
            BooksyncError::DatabaseError(_) => 503,
            BooksyncError::ExternalServiceError { .. } => 502,
            BooksyncError::ConflictError(_) => 409,
            BooksyncError::ServiceUnavailable(_) => 503,
            BooksyncError::TimeoutError(_) => 504,
            BooksyncError::InternalError(_) => 500,
        }
    }
}

impl From<serde_json::Error> for BooksyncError {
    fn from(err: serde_json::Error) -> Self {
        BooksyncError::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for BooksyncError {
    fn from(err: std::io::Error) -> Self {
        BooksyncError::InternalError(err.to_string())
    }
}

// Utility functions for error handling
pub fn config_error<T: fmt::Display>(message: T) -> BooksyncError {
    BooksyncError::ConfigError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> BooksyncError {
    BooksyncError::ValidationError(message.to_string())
}

pub fn conflict<T: fmt::Display>(message: T) -> BooksyncError {
    BooksyncError::ConflictError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> BooksyncError {
    BooksyncError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}
