// --- File: crates/booksync_reconcile/src/lib.rs ---

pub mod logic;
#[cfg(test)]
mod logic_proptest;
pub mod marker;

pub use logic::{
    booking_title, candidate_matches, events_to_book, events_to_delete, events_to_update,
    find_match, matches, reconcile, Reconciliation,
};
pub use marker::{decode, encode, marker, strip};
