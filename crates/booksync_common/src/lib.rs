// --- File: crates/booksync_common/src/lib.rs ---

// Declare modules within this crate
pub mod models;    // Events and booking status
pub mod cache;     // Per-cycle memoization
pub mod error;     // Error handling
pub mod http;      // HTTP utilities
pub mod services;  // Provider abstractions
pub mod logging;   // Logging utilities

// Re-export error types and utilities for easier access
pub use error::{
    BooksyncError,
    HttpStatusCode,
    config_error,
    validation_error,
    conflict,
    external_service_error,
};

// Re-export HTTP utilities for easier access
pub use http::{
    IntoHttpResponse,
    client::create_client,
};

// Re-export logging utilities for easier access
pub use logging::init;

pub use cache::CycleCache;
pub use models::{Event, EventStatus, ReservationOutcome};
pub use services::{
    BoxFuture,
    BoxedError,
    SourceEventProvider,
    DestinationBookingProvider,
    ServiceFactory,
};

// This crate provides the pieces every booksync crate shares: the event model,
// the provider traits, error handling, HTTP helpers and logging setup.
