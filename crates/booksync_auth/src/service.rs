// --- File: crates/booksync_auth/src/service.rs ---
//! Produces calendar credentials at the start of every sync cycle.
//!
//! Sources are tried in order: the stored refresh token, the refresh token from
//! the environment, and finally the interactive browser flow.

use booksync_common::BoxFuture;
use booksync_config::AuthConfig;
use booksync_db::TokenStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::AuthError;
use crate::oauth::{OAuthClient, TokenResponse};
use crate::session::AuthSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Stored,
    Override,
    Interactive,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_token: String,
    pub source: CredentialSource,
}

/// Source of access tokens for the sync cycle.
pub trait Authorizer: Send + Sync {
    fn credentials(&self) -> BoxFuture<'_, Credentials, AuthError>;
}

pub struct CredentialService<S, C> {
    store: S,
    oauth: C,
    session: AuthSession,
    account_id: String,
    refresh_token_override: Option<String>,
    /// Set once the provider rejected the override token; it is not offered again.
    override_rejected: AtomicBool,
    wait_timeout: Duration,
}

impl<S, C> CredentialService<S, C>
where
    S: TokenStore,
    C: OAuthClient,
{
    pub fn new(store: S, oauth: C, session: AuthSession, account_id: impl Into<String>) -> Self {
        Self {
            store,
            oauth,
            session,
            account_id: account_id.into(),
            refresh_token_override: None,
            override_rejected: AtomicBool::new(false),
            wait_timeout: Duration::from_secs(300),
        }
    }

    /// Takes the override token and the callback timeout from the auth config.
    pub fn with_auth_config(mut self, config: &AuthConfig) -> Self {
        self.refresh_token_override = config
            .refresh_token_override
            .clone()
            .filter(|t| !t.is_empty());
        self.wait_timeout = config.timeout();
        self
    }

    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    pub fn with_refresh_token_override(mut self, token: Option<String>) -> Self {
        self.refresh_token_override = token.filter(|t| !t.is_empty());
        self
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns a fresh access token.
    ///
    /// # Errors
    ///
    /// * [`AuthError::Store`] when the token store cannot be reached
    /// * [`AuthError::InvalidGrant`] when the refresh token was rejected; the stored
    ///   record has been deleted by then
    /// * any error of the interactive flow (`AlreadyPending`, `Denied`, `Timeout`)
    pub async fn authorize(&self) -> Result<Credentials, AuthError> {
        if let Some(stored) = self.store.get(&self.account_id).await? {
            info!("🔓 Refresh token found, authenticating...");
            return self.refresh(&stored, CredentialSource::Stored).await;
        }

        if let Some(token) = self.usable_override() {
            info!("🔓 Using refresh token from the environment, authenticating...");
            return self.refresh(token, CredentialSource::Override).await;
        }

        info!("🔒 No refresh token found, authenticating...");
        self.authorize_interactively().await
    }

    fn usable_override(&self) -> Option<&str> {
        let token = self.refresh_token_override.as_deref()?;
        if self.override_rejected.load(Ordering::SeqCst) {
            debug!("Refresh token from the environment was rejected before, skipping it");
            return None;
        }
        Some(token)
    }

    async fn refresh(
        &self,
        refresh_token: &str,
        source: CredentialSource,
    ) -> Result<Credentials, AuthError> {
        match self.oauth.refresh(refresh_token).await {
            Ok(tokens) => {
                self.persist_refresh_token(refresh_token, &tokens, source)
                    .await?;
                Ok(Credentials {
                    access_token: tokens.access_token,
                    source,
                })
            }
            Err(err) if err.is_invalid_grant() => {
                warn!(
                    "Refresh token for account '{}' was rejected ({}), deleting it",
                    self.account_id, err
                );
                if self.refresh_token_override.as_deref() == Some(refresh_token) {
                    self.override_rejected.store(true, Ordering::SeqCst);
                }
                self.store.delete(&self.account_id).await?;
                Err(AuthError::InvalidGrant {
                    account_id: self.account_id.clone(),
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Keeps the store pointing at the newest refresh token. A token supplied from
    /// the environment is stored once it has been proven to work.
    async fn persist_refresh_token(
        &self,
        used: &str,
        tokens: &TokenResponse,
        source: CredentialSource,
    ) -> Result<(), AuthError> {
        let newest = tokens.refresh_token.as_deref().unwrap_or(used);
        if newest != used || source == CredentialSource::Override {
            info!("Storing refresh token for account '{}'", self.account_id);
            self.store.set(&self.account_id, newest).await?;
        }
        Ok(())
    }

    async fn authorize_interactively(&self) -> Result<Credentials, AuthError> {
        let request = self.oauth.authorization_url()?;
        let pending = self
            .session
            .begin_wait_for_state(self.wait_timeout, request.state)?;

        info!("Open this URL in a browser to authorize access:\n{}", request.url);
        let code = pending.await?;

        let tokens = self.oauth.exchange_code(&code).await?;
        match tokens.refresh_token.as_deref() {
            Some(refresh_token) => {
                self.store.set(&self.account_id, refresh_token).await?;
                info!("Authorization complete, refresh token stored");
            }
            None => warn!("Token response carried no refresh token; the next cycle will ask again"),
        }

        Ok(Credentials {
            access_token: tokens.access_token,
            source: CredentialSource::Interactive,
        })
    }
}

impl<S, C> Authorizer for CredentialService<S, C>
where
    S: TokenStore,
    C: OAuthClient,
{
    fn credentials(&self) -> BoxFuture<'_, Credentials, AuthError> {
        Box::pin(self.authorize())
    }
}
