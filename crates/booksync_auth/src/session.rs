// --- File: crates/booksync_auth/src/session.rs ---
//! Single-flight wait for the OAuth redirect.
//!
//! The sync job calls [`AuthSession::begin_wait`] and awaits the returned
//! [`PendingCode`]. The `/auth_callback` handler, driven by the browser, calls
//! [`AuthSession::deliver_callback`] or [`AuthSession::deliver_error`]. At most one
//! wait exists at a time, and exactly one of delivery, rejection, timeout or
//! cancellation settles it. Anything arriving afterwards is a no-op.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use crate::error::AuthError;

type CodeResult = Result<String, AuthError>;

/// What happened to a callback delivered to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The pending wait was settled by this delivery.
    Delivered,
    /// Nothing was waiting; the session is unchanged.
    NoPendingRequest,
    /// The `state` did not match the one the wait expects; it keeps waiting.
    StateMismatch,
}

struct PendingWait {
    id: u64,
    sender: oneshot::Sender<CodeResult>,
    timer: AbortHandle,
    expected_state: Option<String>,
}

#[derive(Default)]
struct SessionState {
    next_id: u64,
    pending: Option<PendingWait>,
}

/// Shared handle to the pending-wait slot. Clones refer to the same slot.
#[derive(Clone, Default)]
pub struct AuthSession {
    state: Arc<Mutex<SessionState>>,
}

impl AuthSession {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Starts waiting for a callback.
    ///
    /// Fails with [`AuthError::AlreadyPending`] while another wait is open; that
    /// wait is left untouched. Must be called from within a Tokio runtime.
    pub fn begin_wait(&self, timeout: Duration) -> Result<PendingCode, AuthError> {
        self.open_wait(timeout, None)
    }

    /// Like [`AuthSession::begin_wait`], but only a callback carrying `state`
    /// can resolve the wait.
    pub fn begin_wait_for_state(
        &self,
        timeout: Duration,
        state: impl Into<String>,
    ) -> Result<PendingCode, AuthError> {
        self.open_wait(timeout, Some(state.into()))
    }

    fn open_wait(
        &self,
        timeout: Duration,
        expected_state: Option<String>,
    ) -> Result<PendingCode, AuthError> {
        let mut state = self.lock();
        if state.pending.is_some() {
            warn!("Rejected OAuth wait: another one is already pending");
            return Err(AuthError::AlreadyPending);
        }

        state.next_id += 1;
        let id = state.next_id;
        let (sender, receiver) = oneshot::channel();

        let expiry = self.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            expiry.expire(id, timeout);
        })
        .abort_handle();

        state.pending = Some(PendingWait {
            id,
            sender,
            timer,
            expected_state,
        });
        debug!("OAuth wait {} pending for up to {:?}", id, timeout);

        Ok(PendingCode {
            id,
            receiver,
            session: self.clone(),
        })
    }

    /// Resolves the pending wait with `code`.
    pub fn deliver_code(&self, code: &str) -> DeliveryOutcome {
        self.deliver_callback(code, None)
    }

    /// Resolves the pending wait with `code` if `state` is the one it expects.
    pub fn deliver_callback(&self, code: &str, state: Option<&str>) -> DeliveryOutcome {
        let mut guard = self.lock();
        let Some(pending) = guard.pending.as_ref() else {
            debug!("OAuth callback ignored (code delivered): nothing pending");
            return DeliveryOutcome::NoPendingRequest;
        };
        if let Some(expected) = pending.expected_state.as_deref() {
            if state != Some(expected) {
                warn!("OAuth callback for wait {} carries an unexpected state", pending.id);
                return DeliveryOutcome::StateMismatch;
            }
        }
        let pending = guard.pending.take();
        drop(guard);

        match pending {
            Some(pending) => Self::complete(pending, Ok(code.to_string()), "code delivered"),
            None => DeliveryOutcome::NoPendingRequest,
        }
    }

    /// Rejects the pending wait with [`AuthError::Denied`].
    pub fn deliver_error(&self, reason: &str) -> DeliveryOutcome {
        self.settle(Err(AuthError::Denied(reason.to_string())), "authorization denied")
    }

    /// Rejects the pending wait with [`AuthError::Cancelled`], e.g. on shutdown.
    pub fn cancel(&self, reason: &str) -> DeliveryOutcome {
        self.settle(Err(AuthError::Cancelled(reason.to_string())), "wait cancelled")
    }

    pub fn is_pending(&self) -> bool {
        self.lock().pending.is_some()
    }

    fn settle(&self, result: CodeResult, what: &str) -> DeliveryOutcome {
        let Some(pending) = self.lock().pending.take() else {
            debug!("OAuth callback ignored ({}): nothing pending", what);
            return DeliveryOutcome::NoPendingRequest;
        };
        Self::complete(pending, result, what)
    }

    fn complete(pending: PendingWait, result: CodeResult, what: &str) -> DeliveryOutcome {
        pending.timer.abort();
        info!("OAuth wait {} settled: {}", pending.id, what);
        match pending.sender.send(result) {
            Ok(()) => DeliveryOutcome::Delivered,
            Err(_) => DeliveryOutcome::NoPendingRequest,
        }
    }

    fn expire(&self, id: u64, timeout: Duration) {
        let mut state = self.lock();
        if state.pending.as_ref().map(|p| p.id) != Some(id) {
            return;
        }
        if let Some(pending) = state.pending.take() {
            warn!("OAuth wait {} timed out after {:?}", id, timeout);
            let _ = pending.sender.send(Err(AuthError::Timeout(timeout)));
        }
    }

    fn release(&self, id: u64) {
        let mut state = self.lock();
        if state.pending.as_ref().map(|p| p.id) == Some(id) {
            if let Some(pending) = state.pending.take() {
                pending.timer.abort();
                debug!("OAuth wait {} dropped by its waiter", id);
            }
        }
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("pending", &self.is_pending())
            .finish()
    }
}

/// Completes with the authorization code, or the error that ended the wait.
///
/// Dropping it before completion frees the slot.
pub struct PendingCode {
    id: u64,
    receiver: oneshot::Receiver<CodeResult>,
    session: AuthSession,
}

impl Future for PendingCode {
    type Output = CodeResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver).poll(cx).map(|received| {
            received.unwrap_or_else(|_| Err(AuthError::Cancelled("session dropped".to_string())))
        })
    }
}

impl Drop for PendingCode {
    fn drop(&mut self) {
        self.session.release(self.id);
    }
}
