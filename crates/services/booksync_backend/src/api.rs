// --- File: crates/services/booksync_backend/src/api.rs ---
//! `/api` routes: health check and on-demand sync.
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use booksync_common::BooksyncError;
use booksync_db::DbClient;
use booksync_sync::{SyncError, SyncOrchestrator, SyncReport};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct ApiState {
    /// The orchestrator, or the kind of provider that is missing.
    pub orchestrator: Result<Arc<SyncOrchestrator>, &'static str>,
    /// `None` when refresh tokens are kept in memory.
    pub db: Option<DbClient>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub token_store: &'static str,
    pub sync: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SyncSummary {
    pub dry_run: bool,
    pub cancelled: usize,
    pub booked: usize,
    pub waitlisted: usize,
    pub nothing_to_book: usize,
    pub retitled: usize,
    pub ambiguous: usize,
    pub failures: usize,
    pub summary: String,
}

impl From<&SyncReport> for SyncSummary {
    fn from(report: &SyncReport) -> Self {
        Self {
            dry_run: report.dry_run,
            cancelled: report.cancelled.len(),
            booked: report.booked.len(),
            waitlisted: report.waitlisted.len(),
            nothing_to_book: report.nothing_to_book.len(),
            retitled: report.retitled.len(),
            ambiguous: report.ambiguous.len(),
            failures: report.failure_count(),
            summary: report.to_string(),
        }
    }
}

/// 200 while the token store answers, 503 when it does not.
pub async fn health_handler(State(state): State<ApiState>) -> (StatusCode, Json<HealthResponse>) {
    let token_store = match &state.db {
        None => "memory",
        Some(db) if db.is_healthy().await => "ok",
        Some(_) => "unreachable",
    };
    let sync = match &state.orchestrator {
        Err(_) => "unconfigured",
        Ok(orchestrator) if orchestrator.is_running() => "running",
        Ok(_) => "idle",
    };

    let (status_code, status) = if token_store == "unreachable" {
        warn!("Health check: token store unreachable");
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    } else {
        (StatusCode::OK, "ok")
    };

    (
        status_code,
        Json(HealthResponse {
            status,
            token_store,
            sync,
        }),
    )
}

/// Runs one cycle now. Refused with 409 while another cycle is running.
pub async fn sync_handler(
    State(state): State<ApiState>,
) -> Result<Json<SyncSummary>, BooksyncError> {
    let orchestrator = state
        .orchestrator
        .as_ref()
        .map_err(|&kind| SyncError::ProviderUnavailable(kind))?;

    info!("Sync requested over HTTP");
    let report = orchestrator.try_run_cycle().await?;
    Ok(Json(SyncSummary::from(&report)))
}

pub fn routes(state: ApiState) -> Router {
    Router::new()
        .route("/api", post(sync_handler))
        .route("/api/health", get(health_handler))
        .with_state(state)
}
