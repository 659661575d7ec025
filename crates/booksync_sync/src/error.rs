// --- File: crates/booksync_sync/src/error.rs ---
use booksync_auth::AuthError;
use booksync_common::{BooksyncError, BoxedError};
use thiserror::Error;

/// Failures that abort a whole cycle. Per-item failures end up in the report instead.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Authorization failed: {0}")]
    Auth(AuthError),
    #[error("Token store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Calendar authentication failed: {0}")]
    SourceAuth(BoxedError),
    #[error("Booking system authentication failed: {0}")]
    DestinationAuth(BoxedError),
    #[error("Failed to fetch calendar events: {0}")]
    SourceFetch(BoxedError),
    #[error("Failed to fetch reservations: {0}")]
    DestinationFetch(BoxedError),
    #[error("No {0} provider is configured")]
    ProviderUnavailable(&'static str),
    #[error("Invalid sync configuration: {0}")]
    Config(String),
    #[error("A sync cycle is already running")]
    CycleInProgress,
}

impl SyncError {
    /// The refresh token was revoked and a person has to authorize again.
    pub fn needs_reauthorization(&self) -> bool {
        matches!(self, SyncError::Auth(AuthError::InvalidGrant { .. }))
    }
}

impl From<AuthError> for SyncError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Store(db) => SyncError::StoreUnavailable(db.to_string()),
            other => SyncError::Auth(other),
        }
    }
}

impl From<SyncError> for BooksyncError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Auth(auth) => auth.into(),
            SyncError::StoreUnavailable(msg) => BooksyncError::DatabaseError(msg),
            SyncError::Config(msg) => BooksyncError::ConfigError(msg),
            SyncError::CycleInProgress => BooksyncError::ConflictError(err.to_string()),
            SyncError::ProviderUnavailable(kind) => {
                BooksyncError::ServiceUnavailable(format!("No {} provider is configured", kind))
            }
            other => BooksyncError::ExternalServiceError {
                service_name: "provider".to_string(),
                message: other.to_string(),
            },
        }
    }
}
