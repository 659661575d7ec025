//! Repository for refresh tokens
//!
//! One live refresh token per account. It is the only state that outlives a
//! process restart.

use crate::error::DbError;

/// Persistence contract for refresh tokens
///
/// Every operation reports [`DbError::Unavailable`] (or another error) when the
/// backing medium cannot be reached; none of them silently does nothing.
pub trait TokenStore: Send + Sync {
    /// Initialize the storage, e.g. create the table if it doesn't exist
    fn init_schema(&self) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    /// The stored refresh token for `account_id`, if any
    fn get(
        &self,
        account_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, DbError>> + Send;

    /// Store `refresh_token` for `account_id`, replacing any previous one
    fn set(
        &self,
        account_id: &str,
        refresh_token: &str,
    ) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    /// Remove the token for `account_id`. Deleting a missing record is not an error.
    fn delete(
        &self,
        account_id: &str,
    ) -> impl std::future::Future<Output = Result<(), DbError>> + Send;
}
