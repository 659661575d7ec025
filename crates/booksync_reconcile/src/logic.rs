// --- File: crates/booksync_reconcile/src/logic.rs ---
//! Reconciliation between the source calendar and the destination bookings.
//!
//! Events are matched across the two sides by title containment and exact start
//! time, never by id. Every function here is pure: the three action sets are
//! computed independently from the same pair of slices.

use booksync_common::{Event, EventStatus};

use crate::marker::{decode, encode, strip};

/// Book, update and delete actions for one source/destination pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Source events without a booking, earliest start first.
    pub to_book: Vec<Event>,
    /// Source events whose title must change, carrying the new title.
    pub to_update: Vec<Event>,
    /// Destination bookings without a calendar entry.
    pub to_delete: Vec<Event>,
}

impl Reconciliation {
    pub fn is_empty(&self) -> bool {
        self.to_book.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }
}

/// `true` when `source` is the calendar entry for the `destination` booking.
pub fn matches(source: &Event, destination: &Event) -> bool {
    source.start == destination.start && source.title.contains(destination.title.as_str())
}

/// First destination event, in slice order, matching `source`.
pub fn find_match<'a>(source: &Event, destination: &'a [Event]) -> Option<&'a Event> {
    destination.iter().find(|d| matches(source, d))
}

/// All destination events matching `source`. More than one means the first wins.
pub fn candidate_matches<'a>(source: &Event, destination: &'a [Event]) -> Vec<&'a Event> {
    destination.iter().filter(|d| matches(source, d)).collect()
}

/// Source events without a match, sorted by start. Ties keep their input order.
pub fn events_to_book(source: &[Event], destination: &[Event]) -> Vec<Event> {
    let mut to_book: Vec<Event> = source
        .iter()
        .filter(|s| find_match(s, destination).is_none())
        .cloned()
        .collect();
    to_book.sort_by_key(|e| e.start);
    to_book
}

/// Title changes that make each source marker reflect the destination status.
///
/// A matched event gets `prefix + destination title + marker` when its marker is
/// wrong. An unmatched event that still carries a marker gets it stripped.
pub fn events_to_update(source: &[Event], destination: &[Event], prefix: &str) -> Vec<Event> {
    source
        .iter()
        .filter_map(|s| {
            let current = decode(&s.title);
            match find_match(s, destination) {
                Some(d) if current != d.status => {
                    let title = encode(&format!("{}{}", prefix, d.title), d.status);
                    Some(s.retitled(title))
                }
                Some(_) => None,
                None if current != EventStatus::Unreserved => Some(s.retitled(strip(&s.title))),
                None => None,
            }
        })
        .collect()
}

/// Destination events that no source event matches.
pub fn events_to_delete(source: &[Event], destination: &[Event]) -> Vec<Event> {
    destination
        .iter()
        .filter(|d| !source.iter().any(|s| matches(s, d)))
        .cloned()
        .collect()
}

pub fn reconcile(source: &[Event], destination: &[Event], prefix: &str) -> Reconciliation {
    Reconciliation {
        to_book: events_to_book(source, destination),
        to_update: events_to_update(source, destination, prefix),
        to_delete: events_to_delete(source, destination),
    }
}

/// Title to look up on the destination for a source event: no markers, no prefix.
pub fn booking_title(title: &str, prefix: &str) -> String {
    let stripped = strip(title);
    let trimmed = stripped.trim();
    let without_prefix = trimmed
        .strip_prefix(prefix.trim())
        .unwrap_or(trimmed);
    without_prefix.trim().to_string()
}
