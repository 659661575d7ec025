//! Factory for creating token stores

use crate::repositories::refresh_token_sql::SqlTokenStore;
use crate::{DbClient, RepositoryFactory};

/// Builds SQL token stores on top of a database client
#[derive(Debug, Clone, Default)]
pub struct TokenStoreFactory;

impl TokenStoreFactory {
    pub fn new() -> Self {
        Self
    }
}

impl RepositoryFactory<SqlTokenStore, DbClient> for TokenStoreFactory {
    fn create_repository(&self, db_client: DbClient) -> SqlTokenStore {
        SqlTokenStore::new(db_client)
    }
}
