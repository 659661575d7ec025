// --- File: crates/booksync_auth/src/error.rs ---
use booksync_common::BooksyncError;
use booksync_db::DbError;
use oauth2::basic::BasicErrorResponseType;
use oauth2::RequestTokenError;
use std::time::Duration;
use thiserror::Error;

use crate::oauth::TokenRequestError;

#[derive(Error, Debug)]
pub enum AuthError {
    /// The provider no longer accepts the refresh token. The stored record is gone.
    #[error("Refresh token for account '{account_id}' was rejected, authorize again")]
    InvalidGrant { account_id: String },
    #[error("OAuth callback returned error: {0}")]
    Denied(String),
    #[error("Timed out after {0:?} waiting for OAuth callback on /auth_callback")]
    Timeout(Duration),
    #[error("OAuth callback is already waiting for a code")]
    AlreadyPending,
    #[error("OAuth callback wait was cancelled: {0}")]
    Cancelled(String),
    #[error("Token store error: {0}")]
    Store(#[from] DbError),
    #[error("Token endpoint request failed: {0}")]
    TokenEndpoint(Box<TokenRequestError>),
    #[error("OAuth configuration error: {0}")]
    Config(String),
}

impl AuthError {
    /// Whether the token endpoint rejected the grant itself.
    pub fn is_invalid_grant(&self) -> bool {
        match self {
            AuthError::InvalidGrant { .. } => true,
            AuthError::TokenEndpoint(err) => matches!(
                err.as_ref(),
                RequestTokenError::ServerResponse(response)
                    if *response.error() == BasicErrorResponseType::InvalidGrant
            ),
            _ => false,
        }
    }
}

impl From<TokenRequestError> for AuthError {
    fn from(err: TokenRequestError) -> Self {
        AuthError::TokenEndpoint(Box::new(err))
    }
}

impl From<AuthError> for BooksyncError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Store(db) => db.into(),
            AuthError::Timeout(_) => BooksyncError::TimeoutError(err.to_string()),
            AuthError::AlreadyPending => BooksyncError::ConflictError(err.to_string()),
            AuthError::Config(msg) => BooksyncError::ConfigError(msg),
            AuthError::TokenEndpoint(_) => BooksyncError::ExternalServiceError {
                service_name: "oauth".to_string(),
                message: err.to_string(),
            },
            other => BooksyncError::AuthError(other.to_string()),
        }
    }
}
