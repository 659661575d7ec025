//! SQL implementation of the token store

use crate::client::map_query_error;
use crate::error::DbError;
use crate::repositories::refresh_token::TokenStore;
use crate::DbClient;
use sqlx::Row;
use tracing::{debug, error, info};

/// SQL implementation of the token store
#[derive(Debug, Clone)]
pub struct SqlTokenStore {
    db_client: DbClient,
}

impl SqlTokenStore {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    pub fn client(&self) -> &DbClient {
        &self.db_client
    }
}

impl TokenStore for SqlTokenStore {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing refresh token schema");

        let query = r#"
            CREATE TABLE IF NOT EXISTS refresh_tokens (
                account_id TEXT PRIMARY KEY NOT NULL,
                refresh_token TEXT NOT NULL,
                updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
        "#;

        self.db_client.execute(query).await?;

        info!("Refresh token schema initialized successfully");
        Ok(())
    }

    async fn get(&self, account_id: &str) -> Result<Option<String>, DbError> {
        debug!("Loading refresh token for account: {}", account_id);

        let query = r#"
            SELECT refresh_token
            FROM refresh_tokens
            WHERE account_id = $1
        "#;

        let row = sqlx::query(query)
            .bind(account_id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to load refresh token: {}", e);
                map_query_error(self.db_client.pool(), e)
            })?;

        match row {
            Some(row) => {
                let token: String = row
                    .try_get("refresh_token")
                    .map_err(|e| DbError::QueryError(e.to_string()))?;
                Ok(Some(token))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, account_id: &str, refresh_token: &str) -> Result<(), DbError> {
        debug!("Storing refresh token for account: {}", account_id);

        let query = r#"
            INSERT INTO refresh_tokens (account_id, refresh_token)
            VALUES ($1, $2)
            ON CONFLICT (account_id)
            DO UPDATE SET refresh_token = excluded.refresh_token, updated_at = CURRENT_TIMESTAMP
        "#;

        sqlx::query(query)
            .bind(account_id)
            .bind(refresh_token)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to store refresh token: {}", e);
                map_query_error(self.db_client.pool(), e)
            })?;

        Ok(())
    }

    async fn delete(&self, account_id: &str) -> Result<(), DbError> {
        debug!("Deleting refresh token for account: {}", account_id);

        let query = r#"
            DELETE FROM refresh_tokens
            WHERE account_id = $1
        "#;

        let result = sqlx::query(query)
            .bind(account_id)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to delete refresh token: {}", e);
                map_query_error(self.db_client.pool(), e)
            })?;

        if result.rows_affected() == 0 {
            debug!("No refresh token stored for account: {}", account_id);
        }
        Ok(())
    }
}
