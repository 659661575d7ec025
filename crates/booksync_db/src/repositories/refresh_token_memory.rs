//! In-memory token store
//!
//! Used when no database is configured and in tests. Can be switched to
//! unreachable to exercise the fail-closed paths of its callers.

use crate::error::DbError;
use crate::repositories::refresh_token::TokenStore;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
pub struct InMemoryTokenStore {
    tokens: Arc<Mutex<HashMap<String, String>>>,
    unreachable: Arc<AtomicBool>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `refresh_token` for `account_id`.
    pub fn with_token(account_id: &str, refresh_token: &str) -> Self {
        let store = Self::new();
        store
            .tokens
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(account_id.to_string(), refresh_token.to_string());
        store
    }

    /// Makes every later operation fail until switched back.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Current token without going through the fail-closed check.
    pub fn peek(&self, account_id: &str) -> Option<String> {
        self.tokens
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(account_id)
            .cloned()
    }

    fn check_reachable(&self) -> Result<(), DbError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(DbError::Unavailable("in-memory store marked unreachable".to_string()));
        }
        Ok(())
    }
}

impl TokenStore for InMemoryTokenStore {
    async fn init_schema(&self) -> Result<(), DbError> {
        self.check_reachable()
    }

    async fn get(&self, account_id: &str) -> Result<Option<String>, DbError> {
        self.check_reachable()?;
        Ok(self.peek(account_id))
    }

    async fn set(&self, account_id: &str, refresh_token: &str) -> Result<(), DbError> {
        self.check_reachable()?;
        self.tokens
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(account_id.to_string(), refresh_token.to_string());
        Ok(())
    }

    async fn delete(&self, account_id: &str) -> Result<(), DbError> {
        self.check_reachable()?;
        self.tokens
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(account_id);
        Ok(())
    }
}
