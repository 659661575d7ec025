// --- File: crates/booksync_common/src/models.rs ---

// Data shared by the reconciliation engine, the orchestrator and provider adapters.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Booking status of an event.
///
/// On the destination side the status is structural. On the source side it is
/// carried as a marker at the end of the title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Reserved,
    Waitlist,
    #[default]
    Unreserved,
}

impl EventStatus {
    pub const ALL: [EventStatus; 3] = [
        EventStatus::Reserved,
        EventStatus::Waitlist,
        EventStatus::Unreserved,
    ];
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EventStatus::Reserved => "reserved",
            EventStatus::Waitlist => "waitlisted",
            EventStatus::Unreserved => "unreserved",
        };
        f.write_str(label)
    }
}

/// One occurrence of a class, either on the source calendar or the destination booking system.
///
/// Ids are provider-local and never compared across providers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: Option<String>,
    pub title: String,
    /// Start time, millisecond precision.
    pub start: DateTime<Utc>,
    #[serde(default)]
    pub status: EventStatus,
}

impl Event {
    /// Creates an unreserved event without id. Sub-millisecond precision is dropped.
    pub fn new(title: impl Into<String>, start: DateTime<Utc>) -> Self {
        Self {
            id: None,
            title: title.into(),
            start: start.trunc_subsecs(3),
            status: EventStatus::Unreserved,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_status(mut self, status: EventStatus) -> Self {
        self.status = status;
        self
    }

    /// Same event with another title.
    pub fn retitled(&self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..self.clone()
        }
    }
}

/// Result of asking the destination for a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationOutcome {
    Confirmed,
    /// The class was full and the account was put on its waitlist.
    Waitlisted,
}

impl ReservationOutcome {
    pub fn status(&self) -> EventStatus {
        match self {
            ReservationOutcome::Confirmed => EventStatus::Reserved,
            ReservationOutcome::Waitlisted => EventStatus::Waitlist,
        }
    }
}

impl fmt::Display for ReservationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReservationOutcome::Confirmed => f.write_str("confirmed"),
            ReservationOutcome::Waitlisted => f.write_str("waitlisted"),
        }
    }
}
