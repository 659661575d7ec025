//! Factory for creating database clients
//!
//! Startup must never hang on an unreachable store, so everything here is
//! bounded by the configured initialization timeout.

use crate::client::DbClient;
use crate::error::DbError;
use booksync_config::DatabaseConfig;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error};

/// Factory for creating database clients
#[derive(Debug, Clone)]
pub struct DbClientFactory {
    init_timeout: Duration,
}

impl DbClientFactory {
    /// Create a factory whose connections must be ready within `init_timeout`.
    pub fn new(init_timeout: Duration) -> Self {
        Self { init_timeout }
    }

    pub fn from_db_config(db_config: &DatabaseConfig) -> Self {
        Self::new(db_config.init_timeout())
    }

    pub fn init_timeout(&self) -> Duration {
        self.init_timeout
    }

    /// Connect using the URL from the database configuration.
    ///
    /// # Errors
    ///
    /// [`DbError::InitTimeout`] when the connection is not ready in time, or the
    /// connection error itself.
    pub async fn connect(&self, db_config: &DatabaseConfig) -> Result<DbClient, DbError> {
        debug!("Creating database client from database configuration");
        self.bounded(DbClient::from_config(db_config)).await
    }

    pub async fn connect_url(&self, db_url: &str) -> Result<DbClient, DbError> {
        debug!("Creating database client from URL");
        self.bounded(DbClient::from_url(db_url)).await
    }

    /// Runs any initialization step under the factory's timeout.
    pub async fn bounded<F, T>(&self, init: F) -> Result<T, DbError>
    where
        F: Future<Output = Result<T, DbError>>,
    {
        with_init_timeout(self.init_timeout, init).await
    }
}

/// Runs `init`, failing with [`DbError::InitTimeout`] once `timeout` has elapsed.
pub async fn with_init_timeout<F, T>(timeout: Duration, init: F) -> Result<T, DbError>
where
    F: Future<Output = Result<T, DbError>>,
{
    match tokio::time::timeout(timeout, init).await {
        Ok(result) => result,
        Err(_) => {
            error!("Database initialization did not finish within {:?}", timeout);
            Err(DbError::InitTimeout(timeout))
        }
    }
}
