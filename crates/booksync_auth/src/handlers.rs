// File: crates/booksync_auth/src/handlers.rs
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::session::{AuthSession, DeliveryOutcome};

/// Shown in the browser after a successful redirect; closes its own window.
pub const SUCCESS_PAGE: &str = r#"
<html lang="html">
<script>window.close()</script>
<body><h3>This window may be closed</h3></body>
</html>
"#;

pub const NO_PENDING_REQUEST: &str = "No OAuth request is currently pending.";
pub const STATE_MISMATCH: &str = "Invalid OAuth state.";

#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Receives the OAuth redirect and hands its result to the waiting session.
///
/// * 409 when no wait is pending
/// * 400 when the provider reports an error (the wait is rejected)
/// * 400 when the code is missing or `state` does not match (the wait keeps waiting)
/// * 200 with a page that closes itself when the code was delivered
pub async fn auth_callback_handler(
    State(session): State<AuthSession>,
    Query(params): Query<CallbackParams>,
) -> Response {
    if let Some(error) = params.error.as_deref().filter(|e| !e.is_empty()) {
        return match session.deliver_error(error) {
            DeliveryOutcome::Delivered => {
                warn!("OAuth callback returned error: {}", error);
                (StatusCode::BAD_REQUEST, "Authentication failed.").into_response()
            }
            DeliveryOutcome::NoPendingRequest | DeliveryOutcome::StateMismatch => {
                no_pending_request()
            }
        };
    }

    let Some(code) = params.code.as_deref().filter(|c| !c.is_empty()) else {
        if !session.is_pending() {
            return no_pending_request();
        }
        warn!("OAuth callback without code");
        return (StatusCode::BAD_REQUEST, "Missing OAuth code.").into_response();
    };

    match session.deliver_callback(code, params.state.as_deref()) {
        DeliveryOutcome::Delivered => {
            info!("OAuth code received");
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                SUCCESS_PAGE,
            )
                .into_response()
        }
        DeliveryOutcome::NoPendingRequest => no_pending_request(),
        DeliveryOutcome::StateMismatch => (StatusCode::BAD_REQUEST, STATE_MISMATCH).into_response(),
    }
}

fn no_pending_request() -> Response {
    (StatusCode::CONFLICT, NO_PENDING_REQUEST).into_response()
}
