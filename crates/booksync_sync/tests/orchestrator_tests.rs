
use booksync_common::{Event, EventStatus};
use booksync_sync::{SyncError, SyncOrchestrator};
use chrono::Duration as ChronoDuration;
use fixtures::{
    calls, monday_at, now, options, AuthBehavior, CallLog, Class, FakeAuthorizer,
    FakeBookingSystem, FakeCalendar,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

fn orchestrator(
    calendar: &Arc<FakeCalendar>,
    booking: &Arc<FakeBookingSystem>,
    dry_run: bool,
) -> SyncOrchestrator {
    SyncOrchestrator::new(
        FakeAuthorizer::new(AuthBehavior::Grant),
        calendar.clone(),
        booking.clone(),
        options(dry_run),
    )
}

#[tokio::test]
async fn test_full_cycle_cancels_books_and_retitles() {
    let log = CallLog::default();
    let calendar = Arc::new(FakeCalendar::new(
        vec![
            Event::new("💪 WOD A", monday_at(7)).with_id("gcal-a"),
            Event::new("💪 WOD B ✅", monday_at(12)).with_id("gcal-b"),
        ],
        &log,
    ));
    let booking = Arc::new(FakeBookingSystem::new(
        vec![
            Event::new("WOD B", monday_at(12))
                .with_id("res-b")
                .with_status(EventStatus::Reserved),
            Event::new("WOD C", monday_at(18))
                .with_id("res-c")
                .with_status(EventStatus::Reserved),
        ],
        vec![Class::new("class-a", "WOD A", monday_at(7))],
        &log,
    ));

    let report = orchestrator(&calendar, &booking, false)
        .run_cycle_at(now())
        .await
        .unwrap();

    assert_eq!(
        calls(&log),
        vec![
            "cancel_reservation:res-c".to_string(),
            "reserve:class-a".to_string(),
            "retitle:gcal-a:💪 WOD A ✅".to_string(),
        ]
    );
    assert_eq!(report.cancelled.len(), 1);
    assert_eq!(report.booked.len(), 1);
    assert_eq!(report.retitled.len(), 1);
    assert!(!report.has_failures());
    assert_eq!(calendar.title_of("gcal-a").as_deref(), Some("💪 WOD A ✅"));
    assert_eq!(calendar.access_token.lock().unwrap().as_deref(), Some("access-token"));
    // Initial listing plus the listing after booking
    assert_eq!(booking.list_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_second_cycle_has_nothing_to_do() {
    let log = CallLog::default();
    let calendar = Arc::new(FakeCalendar::new(
        vec![
            Event::new("💪 WOD A", monday_at(7)).with_id("gcal-a"),
            Event::new("💪 WOD B", monday_at(9)).with_id("gcal-b"),
        ],
        &log,
    ));
    let booking = Arc::new(FakeBookingSystem::new(
        vec![],
        vec![
            Class::new("class-a", "WOD A", monday_at(7)),
            Class::new("class-b", "WOD B", monday_at(9)).full(),
        ],
        &log,
    ));
    let orchestrator = orchestrator(&calendar, &booking, false);

    orchestrator.run_cycle_at(now()).await.unwrap();
    let first_calls = calls(&log).len();
    let second = orchestrator.run_cycle_at(now()).await.unwrap();

    assert_eq!(calls(&log).len(), first_calls);
    assert!(second.cancelled.is_empty());
    assert!(second.booked.is_empty());
    assert!(second.retitled.is_empty());
}

#[tokio::test]
async fn test_bookings_are_made_in_start_order() {
    let log = CallLog::default();
    let calendar = Arc::new(FakeCalendar::new(
        vec![
            Event::new("💪 WOD C", monday_at(18)).with_id("gcal-c"),
            Event::new("💪 WOD A", monday_at(7)).with_id("gcal-a"),
            Event::new("💪 WOD B", monday_at(12)).with_id("gcal-b"),
        ],
        &log,
    ));
    let booking = Arc::new(FakeBookingSystem::new(
        vec![],
        vec![
            Class::new("class-c", "WOD C", monday_at(18)),
            Class::new("class-a", "WOD A", monday_at(7)),
            Class::new("class-b", "WOD B", monday_at(12)),
        ],
        &log,
    ));

    orchestrator(&calendar, &booking, false)
        .run_cycle_at(now())
        .await
        .unwrap();

    let reservations: Vec<String> = calls(&log)
        .into_iter()
        .filter(|c| c.starts_with("reserve:"))
        .collect();
    assert_eq!(
        reservations,
        vec!["reserve:class-a", "reserve:class-b", "reserve:class-c"]
    );
}

#[tokio::test]
async fn test_full_class_is_waitlisted_and_marked() {
    let log = CallLog::default();
    let calendar = Arc::new(FakeCalendar::new(
        vec![Event::new("💪 WOD A", monday_at(7)).with_id("gcal-a")],
        &log,
    ));
    let booking = Arc::new(FakeBookingSystem::new(
        vec![],
        vec![Class::new("class-a", "WOD A", monday_at(7)).full()],
        &log,
    ));

    let report = orchestrator(&calendar, &booking, false)
        .run_cycle_at(now())
        .await
        .unwrap();

    assert_eq!(report.waitlisted.len(), 1);
    assert!(report.booked.is_empty());
    assert_eq!(calendar.title_of("gcal-a").as_deref(), Some("💪 WOD A ⏳"));
}

#[tokio::test]
async fn test_waitlist_entry_is_cancelled_as_waitlist() {
    let log = CallLog::default();
    let calendar = Arc::new(FakeCalendar::new(vec![], &log));
    let booking = Arc::new(FakeBookingSystem::new(
        vec![
            Event::new("WOD A", monday_at(7))
                .with_id("res-a")
                .with_status(EventStatus::Waitlist),
            Event::new("WOD B", monday_at(9))
                .with_id("res-b")
                .with_status(EventStatus::Reserved),
        ],
        vec![],
        &log,
    ));

    orchestrator(&calendar, &booking, false)
        .run_cycle_at(now())
        .await
        .unwrap();

    assert_eq!(
        calls(&log),
        vec!["cancel_waitlist:res-a", "cancel_reservation:res-b"]
    );
    assert!(booking.reservations().is_empty());
}

#[tokio::test]
async fn test_failures_are_isolated_per_item() {
    let log = CallLog::default();
    let mut calendar = FakeCalendar::new(
        vec![
            Event::new("💪 WOD A", monday_at(7)).with_id("gcal-a"),
            Event::new("💪 WOD B", monday_at(9)).with_id("gcal-b"),
            Event::new("💪 WOD C", monday_at(11)).with_id("gcal-c"),
        ],
        &log,
    );
    calendar.fail_updates_for.insert("gcal-c".to_string());
    let calendar = Arc::new(calendar);

    let mut booking = FakeBookingSystem::new(
        vec![
            Event::new("WOD X", monday_at(18))
                .with_id("res-x")
                .with_status(EventStatus::Reserved),
            Event::new("WOD Y", monday_at(19))
                .with_id("res-y")
                .with_status(EventStatus::Reserved),
        ],
        vec![
            Class::new("class-a", "WOD A", monday_at(7)),
            Class::new("class-b", "WOD B", monday_at(9)),
            Class::new("class-c", "WOD C", monday_at(11)),
        ],
        &log,
    );
    booking.fail_bookings_for.insert("class-a".to_string());
    booking.fail_cancellations_for.insert("res-x".to_string());
    let booking = Arc::new(booking);

    let report = orchestrator(&calendar, &booking, false)
        .run_cycle_at(now())
        .await
        .unwrap();

    assert_eq!(report.failed_cancellations.len(), 1);
    assert_eq!(report.failed_cancellations[0].event.id.as_deref(), Some("res-x"));
    assert_eq!(report.cancelled.len(), 1);

    assert_eq!(report.failed_bookings.len(), 1);
    assert_eq!(report.failed_bookings[0].event.id.as_deref(), Some("gcal-a"));
    assert_eq!(report.failed_bookings[0].reason, "server error");
    assert_eq!(report.booked.len(), 2);

    assert_eq!(report.failed_updates.len(), 1);
    assert_eq!(report.retitled.len(), 1);
    assert_eq!(calendar.title_of("gcal-b").as_deref(), Some("💪 WOD B ✅"));
    assert_eq!(report.failure_count(), 3);
}

#[tokio::test]
async fn test_missing_class_is_nothing_to_do() {
    let log = CallLog::default();
    let calendar = Arc::new(FakeCalendar::new(
        vec![Event::new("💪 Open Gym", monday_at(7)).with_id("gcal-a")],
        &log,
    ));
    let booking = Arc::new(FakeBookingSystem::new(vec![], vec![], &log));

    let report = orchestrator(&calendar, &booking, false)
        .run_cycle_at(now())
        .await
        .unwrap();

    assert_eq!(report.nothing_to_book.len(), 1);
    assert!(!report.has_failures());
    assert!(calls(&log).is_empty());
}

#[tokio::test]
async fn test_stale_marker_is_removed_when_reservation_is_gone() {
    let log = CallLog::default();
    let calendar = Arc::new(FakeCalendar::new(
        vec![Event::new("💪 WOD A ✅", monday_at(7)).with_id("gcal-a")],
        &log,
    ));
    let booking = Arc::new(FakeBookingSystem::new(vec![], vec![], &log));

    orchestrator(&calendar, &booking, false)
        .run_cycle_at(now())
        .await
        .unwrap();

    assert_eq!(calls(&log), vec!["retitle:gcal-a:💪 WOD A"]);
}

#[tokio::test]
async fn test_dry_run_mutates_nothing() {
    let log = CallLog::default();
    let calendar = Arc::new(FakeCalendar::new(
        vec![
            Event::new("💪 WOD A", monday_at(7)).with_id("gcal-a"),
            Event::new("💪 WOD B", monday_at(12)).with_id("gcal-b"),
        ],
        &log,
    ));
    let booking = Arc::new(FakeBookingSystem::new(
        vec![
            Event::new("WOD B", monday_at(12))
                .with_id("res-b")
                .with_status(EventStatus::Reserved),
            Event::new("WOD C", monday_at(18))
                .with_id("res-c")
                .with_status(EventStatus::Reserved),
        ],
        vec![Class::new("class-a", "WOD A", monday_at(7))],
        &log,
    ));

    let report = orchestrator(&calendar, &booking, true)
        .run_cycle_at(now())
        .await
        .unwrap();

    assert!(calls(&log).is_empty());
    assert!(report.dry_run);
    assert_eq!(report.cancelled.len(), 1);
    assert_eq!(report.booked.len(), 1);
    assert_eq!(report.retitled.len(), 1);
    assert_eq!(report.retitled[0].title, "💪 WOD B ✅");
    assert_eq!(booking.reservations().len(), 2);
    assert_eq!(calendar.title_of("gcal-b").as_deref(), Some("💪 WOD B"));
}

#[tokio::test]
async fn test_fetch_window_spans_configured_weeks() {
    let log = CallLog::default();
    let calendar = Arc::new(FakeCalendar::new(vec![], &log));
    let booking = Arc::new(FakeBookingSystem::new(vec![], vec![], &log));

    orchestrator(&calendar, &booking, false)
        .run_cycle_at(now())
        .await
        .unwrap();

    let window = calendar.fetched_window.lock().unwrap().unwrap();
    assert_eq!(window, (now(), now() + ChronoDuration::weeks(2)));
}

#[tokio::test]
async fn test_unavailable_store_aborts_cycle() {
    let log = CallLog::default();
    let calendar = Arc::new(FakeCalendar::new(
        vec![Event::new("💪 WOD A", monday_at(7)).with_id("gcal-a")],
        &log,
    ));
    let booking = Arc::new(FakeBookingSystem::new(vec![], vec![], &log));
    let orchestrator = SyncOrchestrator::new(
        FakeAuthorizer::new(AuthBehavior::StoreDown),
        calendar.clone(),
        booking.clone(),
        options(false),
    );

    let result = orchestrator.run_cycle_at(now()).await;

    assert!(matches!(result, Err(SyncError::StoreUnavailable(_))));
    assert_eq!(booking.list_calls.load(Ordering::SeqCst), 0);
    assert!(calendar.fetched_window.lock().unwrap().is_none());
}

#[tokio::test]
async fn test_revoked_token_asks_for_reauthorization() {
    let log = CallLog::default();
    let calendar = Arc::new(FakeCalendar::new(vec![], &log));
    let booking = Arc::new(FakeBookingSystem::new(vec![], vec![], &log));
    let orchestrator = SyncOrchestrator::new(
        FakeAuthorizer::new(AuthBehavior::Revoked),
        calendar,
        booking,
        options(false),
    );

    let err = orchestrator.run_cycle_at(now()).await.unwrap_err();

    assert!(err.needs_reauthorization());
}

#[tokio::test]
async fn test_failed_refetch_skips_title_updates() {
    let log = CallLog::default();
    let calendar = Arc::new(FakeCalendar::new(
        vec![Event::new("💪 WOD A", monday_at(7)).with_id("gcal-a")],
        &log,
    ));
    let mut booking = FakeBookingSystem::new(
        vec![],
        vec![Class::new("class-a", "WOD A", monday_at(7))],
        &log,
    );
    booking.fail_refetch = true;
    let booking = Arc::new(booking);

    let report = orchestrator(&calendar, &booking, false)
        .run_cycle_at(now())
        .await
        .unwrap();

    assert_eq!(calls(&log), vec!["reserve:class-a"]);
    assert!(report.refetch_error.is_some());
    assert!(report.has_failures());
}

#[tokio::test]
async fn test_ambiguous_match_is_reported() {
    let log = CallLog::default();
    let calendar = Arc::new(FakeCalendar::new(
        vec![Event::new("💪 WOD A ⏳", monday_at(7)).with_id("gcal-a")],
        &log,
    ));
    let booking = Arc::new(FakeBookingSystem::new(
        vec![
            Event::new("WOD A", monday_at(7))
                .with_id("res-1")
                .with_status(EventStatus::Waitlist),
            Event::new("WOD A", monday_at(7))
                .with_id("res-2")
                .with_status(EventStatus::Reserved),
        ],
        vec![],
        &log,
    ));

    let report = orchestrator(&calendar, &booking, false)
        .run_cycle_at(now())
        .await
        .unwrap();

    assert_eq!(report.ambiguous.len(), 1);
    // First match wins, and its marker is already right
    assert!(calls(&log).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_periodic_runs_until_shutdown() {
    let log = CallLog::default();
    let calendar = Arc::new(FakeCalendar::new(vec![], &log));
    let booking = Arc::new(FakeBookingSystem::new(vec![], vec![], &log));
    let authorizer = FakeAuthorizer::new(AuthBehavior::Grant);
    let orchestrator =
        SyncOrchestrator::new(authorizer.clone(), calendar, booking, options(false));

    orchestrator
        .run_periodically(
            Duration::from_secs(300),
            tokio::time::sleep(Duration::from_secs(660)),
        )
        .await;

    // Ticks at 0, 5 and 10 minutes
    assert_eq!(authorizer.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_periodic_keeps_going_after_failed_cycle() {
    let log = CallLog::default();
    let calendar = Arc::new(FakeCalendar::new(vec![], &log));
    let booking = Arc::new(FakeBookingSystem::new(vec![], vec![], &log));
    let authorizer = FakeAuthorizer::new(AuthBehavior::Revoked);
    let orchestrator =
        SyncOrchestrator::new(authorizer.clone(), calendar, booking, options(false));

    orchestrator
        .run_periodically(
            Duration::from_secs(300),
            tokio::time::sleep(Duration::from_secs(360)),
        )
        .await;

    assert_eq!(authorizer.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_interrupts_running_cycle() {
    let log = CallLog::default();
    let calendar = Arc::new(FakeCalendar::new(vec![], &log));
    let booking = Arc::new(FakeBookingSystem::new(vec![], vec![], &log));
    let authorizer = FakeAuthorizer::new(AuthBehavior::Hang);
    let orchestrator =
        SyncOrchestrator::new(authorizer.clone(), calendar, booking, options(false));

    let stopped = tokio::time::timeout(
        Duration::from_secs(3600),
        orchestrator.run_periodically(
            Duration::from_secs(300),
            tokio::time::sleep(Duration::from_secs(10)),
        ),
    )
    .await;

    assert!(stopped.is_ok());
    assert_eq!(authorizer.call_count(), 1);
    assert!(!orchestrator.is_running());
}

#[tokio::test]
async fn test_on_demand_cycle_is_refused_while_one_runs() {
    let log = CallLog::default();
    let calendar = Arc::new(FakeCalendar::new(vec![], &log));
    let booking = Arc::new(FakeBookingSystem::new(vec![], vec![], &log));
    let authorizer = FakeAuthorizer::new(AuthBehavior::Hang);
    let orchestrator = Arc::new(SyncOrchestrator::new(
        authorizer.clone(),
        calendar,
        booking,
        options(false),
    ));

    let running = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move { orchestrator.run_cycle().await }
    });
    while authorizer.call_count() == 0 {
        tokio::task::yield_now().await;
    }

    assert!(orchestrator.is_running());
    let result = orchestrator.try_run_cycle().await;
    assert!(matches!(result, Err(SyncError::CycleInProgress)));
    assert_eq!(authorizer.call_count(), 1);

    running.abort();
    let _ = running.await;
    assert!(!orchestrator.is_running());
}

#[tokio::test]
async fn test_on_demand_cycle_runs_when_idle() {
    let log = CallLog::default();
    let calendar = Arc::new(FakeCalendar::new(vec![], &log));
    let booking = Arc::new(FakeBookingSystem::new(vec![], vec![], &log));
    let authorizer = FakeAuthorizer::new(AuthBehavior::Grant);
    let orchestrator =
        SyncOrchestrator::new(authorizer.clone(), calendar, booking, options(false));

    let report = orchestrator.try_run_cycle().await.unwrap();

    assert!(!report.has_failures());
    assert_eq!(authorizer.call_count(), 1);
}
