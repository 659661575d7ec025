//! Token store for booksync
//!
//! Persists one refresh token per account. The SQL implementation uses SQLx's
//! `Any` driver, so SQLite and PostgreSQL work through the same code; an
//! in-memory implementation covers runs without a database.
//!
//! # Features
//!
//! - `sqlite` (default) and `postgres` select the compiled-in drivers
//! - Connection and schema setup bounded by a timeout
//! - Fail-closed operations: an unreachable store is an error, never a no-op
//!
//! # Example
//!
//! ```rust,no_run
//! use booksync_config::DatabaseConfig;
//! use booksync_db::{DbClientFactory, RepositoryFactory, TokenStore, TokenStoreFactory};
//!
//! async fn setup_store() -> Result<(), Box<dyn std::error::Error>> {
//!     let db_config = DatabaseConfig::default();
//!     let factory = DbClientFactory::from_db_config(&db_config);
//!     let client = factory.connect(&db_config).await?;
//!     let store = TokenStoreFactory::new().create_repository(client);
//!     factory.bounded(store.init_schema()).await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod factory;
pub mod repositories;
pub mod repository;

pub use client::DbClient;
pub use error::DbError;
pub use factory::{with_init_timeout, DbClientFactory};
pub use repository::RepositoryFactory;

pub use repositories::{
    InMemoryTokenStore, SqlTokenStore, TokenStore, TokenStoreFactory,
};
