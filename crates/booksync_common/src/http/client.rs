// --- File: crates/booksync_common/src/http/client.rs ---
use reqwest::{Client, Error as ReqwestError};
use std::time::Duration;

/// Default timeout for outbound HTTP requests in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Creates an HTTP client with a request timeout.
///
/// Provider calls are never retried here; a timed-out request surfaces as an error
/// and is handled per item by the caller.
pub fn create_client(timeout_secs: u64) -> Result<Client, ReqwestError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("booksync/", env!("CARGO_PKG_VERSION")))
        .build()
}

