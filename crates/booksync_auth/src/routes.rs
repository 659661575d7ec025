// --- File: crates/booksync_auth/src/routes.rs ---

use axum::{routing::get, Router};

use crate::handlers::auth_callback_handler;
use crate::session::AuthSession;

/// Router for the OAuth redirect target.
pub fn routes(session: AuthSession) -> Router {
    Router::new()
        .route("/auth_callback", get(auth_callback_handler))
        .with_state(session)
}
