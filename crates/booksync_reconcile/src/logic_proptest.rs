#[cfg(test)]
mod tests {
    use crate::logic::{booking_title, events_to_update, matches, reconcile};
    use crate::marker::{decode, encode, strip};
    use booksync_common::{Event, EventStatus};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use proptest::prelude::*;

    const PREFIX: &str = "💪 ";
    // No class name is a substring of another, so a title matches one class only.
    const CLASSES: [&str; 4] = ["WOD Alpha", "WOD Bravo", "Olympic Lifting", "Open Gym"];
    const SOURCE_MARKERS: [&str; 4] = ["", " ✅", " ⏳", " ❌"];

    fn slot(index: usize) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 5, 6, 0, 0).unwrap() + Duration::hours(index as i64 * 3)
    }

    fn status_strategy() -> impl Strategy<Value = EventStatus> {
        prop_oneof![Just(EventStatus::Reserved), Just(EventStatus::Waitlist)]
    }

    fn source_strategy() -> impl Strategy<Value = Vec<Event>> {
        prop::collection::vec((0..CLASSES.len(), 0..4usize, 0..SOURCE_MARKERS.len()), 0..8)
            .prop_map(|items| {
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, (class, start, marker))| {
                        let title = format!("{}{}{}", PREFIX, CLASSES[class], SOURCE_MARKERS[marker]);
                        Event::new(title, slot(start)).with_id(format!("gcal-{}", i))
                    })
                    .collect()
            })
    }

    fn destination_strategy() -> impl Strategy<Value = Vec<Event>> {
        prop::collection::vec((0..CLASSES.len(), 0..4usize, status_strategy()), 0..8).prop_map(
            |items| {
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, (class, start, status))| {
                        Event::new(CLASSES[class], slot(start))
                            .with_id(format!("res-{}", i))
                            .with_status(status)
                    })
                    .collect()
            },
        )
    }

    /// Applies deletes and bookings to the destination, then the resulting title
    /// updates to the source.
    fn apply_all(source: &[Event], destination: &[Event]) -> (Vec<Event>, Vec<Event>) {
        let plan = reconcile(source, destination, PREFIX);

        let mut next_destination: Vec<Event> = destination
            .iter()
            .filter(|d| !plan.to_delete.contains(d))
            .cloned()
            .collect();
        for event in &plan.to_book {
            next_destination.push(
                Event::new(booking_title(&event.title, PREFIX), event.start)
                    .with_status(EventStatus::Reserved),
            );
        }

        let updates = events_to_update(source, &next_destination, PREFIX);
        let next_source = source
            .iter()
            .map(|s| {
                updates
                    .iter()
                    .find(|u| u.id == s.id)
                    .cloned()
                    .unwrap_or_else(|| s.clone())
            })
            .collect();

        (next_source, next_destination)
    }

    proptest! {
        // A fully applied reconciliation leaves nothing to do
        #[test]
        fn test_reconcile_reaches_fixed_point(
            source in source_strategy(),
            destination in destination_strategy(),
        ) {
            let (next_source, next_destination) = apply_all(&source, &destination);
            let second = reconcile(&next_source, &next_destination, PREFIX);

            prop_assert!(second.is_empty(), "Second pass was not empty: {:?}", second);
        }

        // Bookings are attempted earliest first
        #[test]
        fn test_to_book_sorted_by_start(
            source in source_strategy(),
            destination in destination_strategy(),
        ) {
            let plan = reconcile(&source, &destination, PREFIX);
            for pair in plan.to_book.windows(2) {
                prop_assert!(pair[0].start <= pair[1].start);
            }
        }

        // A destination event is deleted exactly when nothing on the source matches it
        #[test]
        fn test_delete_completeness(
            source in source_strategy(),
            destination in destination_strategy(),
        ) {
            let plan = reconcile(&source, &destination, PREFIX);
            for d in &destination {
                let matched = source.iter().any(|s| matches(s, d));
                prop_assert_eq!(plan.to_delete.contains(d), !matched);
            }
        }

        // Markers survive encoding and stripping settles in one call
        #[test]
        fn test_marker_round_trip(
            title in "[A-Za-z0-9 ]{0,24}",
            status in prop_oneof![
                Just(EventStatus::Reserved),
                Just(EventStatus::Waitlist),
                Just(EventStatus::Unreserved),
            ],
        ) {
            prop_assert_eq!(decode(&encode(&title, status)), status);

            let marked = encode(&encode(&title, status), EventStatus::Reserved);
            let once = strip(&marked);
            prop_assert_eq!(strip(&once), once.clone());
            prop_assert_eq!(decode(&once), EventStatus::Unreserved);
        }
    }
}
