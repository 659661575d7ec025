// --- File: crates/booksync_sync/src/lib.rs ---

pub mod error;
pub mod orchestrator;
pub mod report;

pub use error::SyncError;
pub use orchestrator::{SyncOptions, SyncOrchestrator};
pub use report::{ItemFailure, SyncReport};
