// --- File: crates/booksync_common/src/services.rs ---
//! Service abstractions for the two external providers.
//!
//! The sync core never talks to a calendar or a booking website directly. It goes
//! through these traits, which keeps the orchestrator testable with in-memory fakes
//! and lets adapters for concrete providers live outside the core.

use chrono::{DateTime, Utc};
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::cache::CycleCache;
use crate::models::{Event, ReservationOutcome};

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// A wrapper error type that implements std::error::Error for Box<dyn std::error::Error + Send + Sync>
#[derive(Debug)]
pub struct BoxedError(pub Box<dyn StdError + Send + Sync>);

impl BoxedError {
    pub fn msg(message: impl Into<String>) -> Self {
        BoxedError(message.into().into())
    }
}

impl fmt::Display for BoxedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for BoxedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl From<Box<dyn StdError + Send + Sync>> for BoxedError {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        BoxedError(err)
    }
}

/// The calendar holding the desired state.
pub trait SourceEventProvider: Send + Sync {
    /// Hands the provider a fresh access token for this cycle.
    fn authenticate(&self, access_token: &str) -> BoxFuture<'_, (), BoxedError>;

    /// Upcoming events inside the window, already filtered to the sync tag,
    /// expanded to single occurrences, and without events the account declined.
    fn fetch_upcoming_events<'a>(
        &'a self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        cache: &'a CycleCache,
    ) -> BoxFuture<'a, Vec<Event>, BoxedError>;

    /// Rewrites the title of one calendar event.
    fn update_event_title<'a>(
        &'a self,
        event_id: &'a str,
        new_title: &'a str,
    ) -> BoxFuture<'a, (), BoxedError>;
}

/// The booking system holding the actual reservations.
pub trait DestinationBookingProvider: Send + Sync {
    /// Logs in with the provider's own credentials.
    fn authenticate(&self) -> BoxFuture<'_, (), BoxedError>;

    /// Reservations and waitlist entries of the account, status set structurally.
    fn list_upcoming_reservations<'a>(
        &'a self,
        cache: &'a CycleCache,
    ) -> BoxFuture<'a, Vec<Event>, BoxedError>;

    /// Looks up the bookable class for a title and start time.
    fn resolve_bookable_item_id<'a>(
        &'a self,
        title: &'a str,
        start: DateTime<Utc>,
        cache: &'a CycleCache,
    ) -> BoxFuture<'a, Option<String>, BoxedError>;

    /// Reserves a class; falls back to its waitlist when the class is full.
    fn create_reservation<'a>(&'a self, item_id: &'a str) -> BoxFuture<'a, ReservationOutcome, BoxedError>;

    fn cancel_reservation<'a>(&'a self, reservation_id: &'a str) -> BoxFuture<'a, (), BoxedError>;

    fn cancel_waitlist_entry<'a>(&'a self, reservation_id: &'a str) -> BoxFuture<'a, (), BoxedError>;
}

/// A factory for the provider adapters available to this process.
pub trait ServiceFactory: Send + Sync {
    fn source_provider(&self) -> Option<Arc<dyn SourceEventProvider>>;

    fn destination_provider(&self) -> Option<Arc<dyn DestinationBookingProvider>>;
}
