// --- File: crates/booksync_auth/src/oauth.rs ---
//! OAuth 2.0 authorization-code and refresh-token grants against the calendar
//! provider's token endpoint.

use booksync_common::BoxFuture;
use booksync_config::AuthConfig;
use oauth2::{
    basic::{BasicClient, BasicErrorResponse, BasicTokenResponse},
    AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet,
    EndpointSet, HttpClientError, RedirectUrl, RefreshToken, RequestTokenError, Scope,
    TokenResponse as _, TokenUrl,
};
use reqwest::Client;
use tracing::{debug, error};

use crate::error::AuthError;

/// Error returned by the `oauth2` token requests.
pub type TokenRequestError = RequestTokenError<HttpClientError<reqwest::Error>, BasicErrorResponse>;

type ProviderClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Tokens returned by the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenResponse {
    pub access_token: String,
    /// Only present on the first exchange or when the provider rotates it.
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
}

impl From<BasicTokenResponse> for TokenResponse {
    fn from(response: BasicTokenResponse) -> Self {
        Self {
            access_token: response.access_token().secret().clone(),
            refresh_token: response.refresh_token().map(|t| t.secret().clone()),
            expires_in: response.expires_in().map(|d| d.as_secs()),
        }
    }
}

/// Consent URL together with the `state` the callback has to echo back.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub url: String,
    pub state: String,
}

/// The token endpoint of the calendar provider.
pub trait OAuthClient: Send + Sync {
    /// URL the user opens to grant offline access.
    fn authorization_url(&self) -> Result<AuthorizationRequest, AuthError>;

    fn exchange_code<'a>(&'a self, code: &'a str) -> BoxFuture<'a, TokenResponse, AuthError>;

    fn refresh<'a>(&'a self, refresh_token: &'a str) -> BoxFuture<'a, TokenResponse, AuthError>;
}

pub struct HttpOAuthClient {
    http: Client,
    client: ProviderClient,
    has_client_id: bool,
    scopes: Vec<String>,
}

impl HttpOAuthClient {
    /// Builds the client from the auth config.
    ///
    /// # Errors
    ///
    /// [`AuthError::Config`] when one of the configured URLs does not parse.
    pub fn new(http: Client, config: AuthConfig) -> Result<Self, AuthError> {
        let auth_url = AuthUrl::new(config.authorization_endpoint.clone())
            .map_err(|e| AuthError::Config(format!("invalid auth.authorization_endpoint: {e}")))?;
        let token_url = TokenUrl::new(config.token_endpoint.clone())
            .map_err(|e| AuthError::Config(format!("invalid auth.token_endpoint: {e}")))?;
        let redirect_url = RedirectUrl::new(config.redirect_url.clone())
            .map_err(|e| AuthError::Config(format!("invalid auth.redirect_url: {e}")))?;

        // Google expects the client credentials in the form body.
        let client = BasicClient::new(ClientId::new(config.client_id.clone()))
            .set_client_secret(ClientSecret::new(config.client_secret))
            .set_auth_uri(auth_url)
            .set_token_uri(token_url)
            .set_redirect_uri(redirect_url)
            .set_auth_type(AuthType::RequestBody);

        Ok(Self {
            http,
            client,
            has_client_id: !config.client_id.is_empty(),
            scopes: config.scopes,
        })
    }
}

fn token_error(err: TokenRequestError) -> AuthError {
    error!("Token request failed: {}", err);
    AuthError::from(err)
}

impl OAuthClient for HttpOAuthClient {
    fn authorization_url(&self) -> Result<AuthorizationRequest, AuthError> {
        if !self.has_client_id {
            return Err(AuthError::Config("auth.client_id is not set".to_string()));
        }

        let (url, state) = self
            .client
            .authorize_url(CsrfToken::new_random)
            .add_scopes(self.scopes.iter().cloned().map(Scope::new))
            .add_extra_param("access_type", "offline")
            .add_extra_param("prompt", "consent")
            .url();

        Ok(AuthorizationRequest {
            url: url.to_string(),
            state: state.secret().clone(),
        })
    }

    fn exchange_code<'a>(&'a self, code: &'a str) -> BoxFuture<'a, TokenResponse, AuthError> {
        Box::pin(async move {
            debug!("Exchanging authorization code for tokens");
            self.client
                .exchange_code(AuthorizationCode::new(code.to_string()))
                .request_async(&self.http)
                .await
                .map(TokenResponse::from)
                .map_err(token_error)
        })
    }

    fn refresh<'a>(&'a self, refresh_token: &'a str) -> BoxFuture<'a, TokenResponse, AuthError> {
        Box::pin(async move {
            debug!("Refreshing access token");
            let refresh_token = RefreshToken::new(refresh_token.to_string());
            self.client
                .exchange_refresh_token(&refresh_token)
                .request_async(&self.http)
                .await
                .map(TokenResponse::from)
                .map_err(token_error)
        })
    }
}
