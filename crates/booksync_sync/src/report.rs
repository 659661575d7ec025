// --- File: crates/booksync_sync/src/report.rs ---

use booksync_common::Event;
use std::fmt;

/// An action on one event that failed without stopping the cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub event: Event,
    pub reason: String,
}

impl ItemFailure {
    pub fn new(event: &Event, reason: impl fmt::Display) -> Self {
        Self {
            event: event.clone(),
            reason: reason.to_string(),
        }
    }
}

/// What one sync cycle did, or would have done in dry-run mode.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub dry_run: bool,
    pub cancelled: Vec<Event>,
    pub booked: Vec<Event>,
    /// Classes that were full; the account is on their waitlist.
    pub waitlisted: Vec<Event>,
    /// Calendar events for which the booking system has no bookable class.
    pub nothing_to_book: Vec<Event>,
    pub retitled: Vec<Event>,
    /// Calendar events matching more than one reservation.
    pub ambiguous: Vec<Event>,
    pub failed_cancellations: Vec<ItemFailure>,
    pub failed_bookings: Vec<ItemFailure>,
    pub failed_updates: Vec<ItemFailure>,
    /// Set when the reservations could not be fetched again after booking.
    pub refetch_error: Option<String>,
}

impl SyncReport {
    pub fn has_failures(&self) -> bool {
        !self.failed_cancellations.is_empty()
            || !self.failed_bookings.is_empty()
            || !self.failed_updates.is_empty()
            || self.refetch_error.is_some()
    }

    pub fn failure_count(&self) -> usize {
        self.failed_cancellations.len()
            + self.failed_bookings.len()
            + self.failed_updates.len()
            + usize::from(self.refetch_error.is_some())
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{} cancelled, {} booked, {} waitlisted, {} without class, {} retitled, {} failed",
            if self.dry_run { "[dry run] " } else { "" },
            self.cancelled.len(),
            self.booked.len(),
            self.waitlisted.len(),
            self.nothing_to_book.len(),
            self.retitled.len(),
            self.failure_count(),
        )
    }
}
