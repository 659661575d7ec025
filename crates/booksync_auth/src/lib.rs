// --- File: crates/booksync_auth/src/lib.rs ---

pub mod error;
pub mod handlers;
pub mod oauth;
pub mod routes;
pub mod service;
pub mod session;

pub use error::AuthError;
pub use oauth::{AuthorizationRequest, HttpOAuthClient, OAuthClient, TokenRequestError, TokenResponse};
pub use routes::routes;
pub use service::{Authorizer, CredentialService, CredentialSource, Credentials};
pub use session::{AuthSession, DeliveryOutcome, PendingCode};
