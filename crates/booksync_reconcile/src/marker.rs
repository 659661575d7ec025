// --- File: crates/booksync_reconcile/src/marker.rs ---
//! Status markers carried at the end of calendar titles.
//!
//! The calendar has no field for booking status, so it lives in the title as a
//! single trailing glyph. Business logic works on [`EventStatus`]; these functions
//! are only called where titles are read or written.

use booksync_common::EventStatus;

/// The glyph for a status.
pub fn marker(status: EventStatus) -> &'static str {
    match status {
        EventStatus::Reserved => "✅",
        EventStatus::Waitlist => "⏳",
        EventStatus::Unreserved => "❌",
    }
}

/// Appends the marker for `status`. Unreserved titles carry no marker.
pub fn encode(title: &str, status: EventStatus) -> String {
    match status {
        EventStatus::Unreserved => title.to_string(),
        status => format!("{} {}", title, marker(status)),
    }
}

/// Reads the status from the trailing marker, defaulting to unreserved.
pub fn decode(title: &str) -> EventStatus {
    let title = title.trim_end();
    EventStatus::ALL
        .into_iter()
        .find(|status| title.ends_with(marker(*status)))
        .unwrap_or(EventStatus::Unreserved)
}

/// Removes every `" " + marker` occurrence, repeating until nothing changes.
///
/// Titles that picked up stale or duplicate markers come out unmarked.
pub fn strip(title: &str) -> String {
    let mut current = title.to_string();
    loop {
        let next = EventStatus::ALL
            .into_iter()
            .fold(current.clone(), |acc, status| {
                acc.replace(&format!(" {}", marker(status)), "")
            });
        if next == current {
            return current;
        }
        current = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_appends_marker() {
        assert_eq!(encode("💪 WOD A", EventStatus::Reserved), "💪 WOD A ✅");
        assert_eq!(encode("💪 WOD A", EventStatus::Waitlist), "💪 WOD A ⏳");
        assert_eq!(encode("💪 WOD A", EventStatus::Unreserved), "💪 WOD A");
    }

    #[test]
    fn test_decode_ignores_trailing_whitespace() {
        assert_eq!(decode("WOD A ✅  "), EventStatus::Reserved);
        assert_eq!(decode("WOD A ⏳\n"), EventStatus::Waitlist);
        assert_eq!(decode("WOD A"), EventStatus::Unreserved);
        assert_eq!(decode(""), EventStatus::Unreserved);
    }

    #[test]
    fn test_decode_only_looks_at_the_suffix() {
        assert_eq!(decode("WOD ✅ A"), EventStatus::Unreserved);
    }

    #[test]
    fn test_strip_removes_stale_and_duplicate_markers() {
        assert_eq!(strip("💪 WOD A ✅ ⏳"), "💪 WOD A");
        assert_eq!(strip("💪 WOD A ✅ ✅"), "💪 WOD A");
        assert_eq!(strip("💪 WOD A ❌"), "💪 WOD A");
        assert_eq!(strip("💪 WOD A"), "💪 WOD A");
    }

    #[test]
    fn test_strip_handles_markers_exposed_by_removal() {
        // Removing " ⏳" leaves " ✅" behind, which must go as well.
        let title = "WOD  ⏳✅";
        let stripped = strip(title);
        assert_eq!(stripped, "WOD");
        assert_eq!(strip(&stripped), stripped);
    }
}
