// --- File: crates/booksync_sync/src/orchestrator.rs ---
//! One sync cycle, and the periodic trigger around it.
//!
//! Reads run concurrently; every write (cancel, book, retitle) is issued one at a
//! time, in order. A failing item is recorded in the [`SyncReport`] and the cycle
//! moves on. Only authorization, the token store and the initial fetches can
//! abort a cycle.

use booksync_auth::Authorizer;
use booksync_common::{
    CycleCache, DestinationBookingProvider, Event, EventStatus, ReservationOutcome,
    SourceEventProvider,
};
use booksync_config::SyncConfig;
use booksync_reconcile::{booking_title, candidate_matches, events_to_update, reconcile};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use chrono_tz::Tz;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::error::SyncError;
use crate::report::{ItemFailure, SyncReport};

/// Settings the orchestrator needs from [`SyncConfig`].
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub dry_run: bool,
    pub weeks_to_sync: u32,
    pub event_prefix: String,
    pub time_zone: Tz,
}

impl SyncOptions {
    pub fn from_config(config: &SyncConfig) -> Result<Self, SyncError> {
        let time_zone = config
            .time_zone
            .parse::<Tz>()
            .map_err(|e| SyncError::Config(format!("unknown time zone '{}': {}", config.time_zone, e)))?;

        Ok(Self {
            dry_run: config.dry_run,
            weeks_to_sync: config.weeks_to_sync,
            event_prefix: config.event_prefix.clone(),
            time_zone,
        })
    }

    /// `[now, now + weeks_to_sync weeks)`
    pub fn window(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        (now, now + ChronoDuration::weeks(i64::from(self.weeks_to_sync)))
    }
}

pub struct SyncOrchestrator {
    authorizer: Arc<dyn Authorizer>,
    source: Arc<dyn SourceEventProvider>,
    destination: Arc<dyn DestinationBookingProvider>,
    options: SyncOptions,
    /// Held for the duration of a cycle so that cycles never overlap.
    running: Mutex<()>,
}

impl SyncOrchestrator {
    pub fn new(
        authorizer: Arc<dyn Authorizer>,
        source: Arc<dyn SourceEventProvider>,
        destination: Arc<dyn DestinationBookingProvider>,
        options: SyncOptions,
    ) -> Self {
        Self {
            authorizer,
            source,
            destination,
            options,
            running: Mutex::new(()),
        }
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    pub async fn run_cycle(&self) -> Result<SyncReport, SyncError> {
        self.run_cycle_at(Utc::now()).await
    }

    /// Runs one cycle with the sync window starting at `now`, after any cycle
    /// already running has finished.
    pub async fn run_cycle_at(&self, now: DateTime<Utc>) -> Result<SyncReport, SyncError> {
        let _running = self.running.lock().await;
        self.cycle(now).await
    }

    /// Runs one cycle now, unless one is already running.
    ///
    /// # Errors
    ///
    /// [`SyncError::CycleInProgress`] when another cycle holds the guard, or the
    /// error that aborted the cycle.
    pub async fn try_run_cycle(&self) -> Result<SyncReport, SyncError> {
        let Ok(_running) = self.running.try_lock() else {
            info!("Sync requested while a cycle is running, skipping");
            return Err(SyncError::CycleInProgress);
        };
        self.cycle(Utc::now()).await
    }

    pub fn is_running(&self) -> bool {
        self.running.try_lock().is_err()
    }

    async fn cycle(&self, now: DateTime<Utc>) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport {
            dry_run: self.options.dry_run,
            ..SyncReport::default()
        };
        if self.options.dry_run {
            info!("Dry run: no reservation or calendar event will be changed");
        }

        let credentials = self.authorizer.credentials().await?;
        self.source
            .authenticate(&credentials.access_token)
            .await
            .map_err(SyncError::SourceAuth)?;
        self.destination
            .authenticate()
            .await
            .map_err(SyncError::DestinationAuth)?;

        let cache = CycleCache::new();
        let (window_start, window_end) = self.options.window(now);
        let (source_events, destination_events) = tokio::join!(
            self.source
                .fetch_upcoming_events(window_start, window_end, &cache),
            self.destination.list_upcoming_reservations(&cache),
        );
        let source_events = source_events.map_err(SyncError::SourceFetch)?;
        let destination_events = destination_events.map_err(SyncError::DestinationFetch)?;

        self.log_events("Calendar events", &source_events);
        self.log_events("Reservations", &destination_events);

        for event in &source_events {
            let candidates = candidate_matches(event, &destination_events);
            if candidates.len() > 1 {
                warn!(
                    "{} matches {} reservations, using the first one",
                    self.describe(event),
                    candidates.len()
                );
                report.ambiguous.push(event.clone());
            }
        }

        let plan = reconcile(
            &source_events,
            &destination_events,
            &self.options.event_prefix,
        );
        info!(
            "To cancel: {}, to book: {}",
            plan.to_delete.len(),
            plan.to_book.len()
        );

        for event in &plan.to_delete {
            self.cancel(event, &mut report).await;
        }

        for event in &plan.to_book {
            self.book(event, &cache, &mut report).await;
        }

        // Booking changes reservation ids and statuses, so titles are computed
        // against a fresh listing.
        let refetch_cache = CycleCache::new();
        let fresh = match self
            .destination
            .list_upcoming_reservations(&refetch_cache)
            .await
        {
            Ok(events) => events,
            Err(err) => {
                error!("Failed to fetch reservations again, skipping title updates: {}", err);
                report.refetch_error = Some(err.to_string());
                return Ok(report);
            }
        };

        let to_update = events_to_update(&source_events, &fresh, &self.options.event_prefix);
        info!("To retitle: {}", to_update.len());
        for event in &to_update {
            self.retitle(event, &mut report).await;
        }

        if report.has_failures() {
            warn!("Sync cycle finished with failures: {}", report);
        } else {
            info!("Sync cycle finished: {}", report);
        }
        Ok(report)
    }

    async fn cancel(&self, event: &Event, report: &mut SyncReport) {
        let Some(id) = event.id.as_deref() else {
            warn!("Not cancelling {}: reservation has no id", self.describe(event));
            report
                .failed_cancellations
                .push(ItemFailure::new(event, "reservation has no id"));
            return;
        };

        let waitlisted = event.status == EventStatus::Waitlist;
        info!(
            "Cancelling {} {} (id: {})",
            if waitlisted { "waitlist entry" } else { "reservation" },
            self.describe(event),
            id
        );
        if self.options.dry_run {
            report.cancelled.push(event.clone());
            return;
        }

        let result = if waitlisted {
            self.destination.cancel_waitlist_entry(id).await
        } else {
            self.destination.cancel_reservation(id).await
        };
        match result {
            Ok(()) => report.cancelled.push(event.clone()),
            Err(err) => {
                error!("Failed to cancel {}: {}", self.describe(event), err);
                report
                    .failed_cancellations
                    .push(ItemFailure::new(event, err));
            }
        }
    }

    async fn book(&self, event: &Event, cache: &CycleCache, report: &mut SyncReport) {
        let title = booking_title(&event.title, &self.options.event_prefix);
        let item_id = match self
            .destination
            .resolve_bookable_item_id(&title, event.start, cache)
            .await
        {
            Ok(Some(id)) => id,
            Ok(None) => {
                info!("Not booking {}: no such class, nothing to do", self.describe(event));
                report.nothing_to_book.push(event.clone());
                return;
            }
            Err(err) => {
                error!("Failed to look up class for {}: {}", self.describe(event), err);
                report.failed_bookings.push(ItemFailure::new(event, err));
                return;
            }
        };

        info!("Booking {} (id: {})", self.describe(event), item_id);
        if self.options.dry_run {
            report.booked.push(event.clone());
            return;
        }

        match self.destination.create_reservation(&item_id).await {
            Ok(ReservationOutcome::Confirmed) => report.booked.push(event.clone()),
            Ok(ReservationOutcome::Waitlisted) => {
                info!("{} is fully booked, added to the waitlist", self.describe(event));
                report.waitlisted.push(event.clone());
            }
            Err(err) => {
                error!("Failed to book {}: {}", self.describe(event), err);
                report.failed_bookings.push(ItemFailure::new(event, err));
            }
        }
    }

    async fn retitle(&self, event: &Event, report: &mut SyncReport) {
        let Some(id) = event.id.as_deref() else {
            warn!("Not retitling {}: calendar event has no id", self.describe(event));
            report
                .failed_updates
                .push(ItemFailure::new(event, "calendar event has no id"));
            return;
        };

        info!(
            "Updating event at {} title to {} (id: {})",
            self.local_time(event.start),
            event.title,
            id
        );
        if self.options.dry_run {
            report.retitled.push(event.clone());
            return;
        }

        match self.source.update_event_title(id, &event.title).await {
            Ok(()) => report.retitled.push(event.clone()),
            Err(err) => {
                error!("Failed to retitle {}: {}", self.describe(event), err);
                report.failed_updates.push(ItemFailure::new(event, err));
            }
        }
    }

    fn local_time(&self, start: DateTime<Utc>) -> String {
        start
            .with_timezone(&self.options.time_zone)
            .format("%a %d/%m %H:%M")
            .to_string()
    }

    fn describe(&self, event: &Event) -> String {
        format!("'{}' at {}", event.title, self.local_time(event.start))
    }

    fn log_events(&self, label: &str, events: &[Event]) {
        info!("{}: {}", label, events.len());
        for event in events {
            info!(
                "  {}  {}  [{}]",
                self.local_time(event.start),
                event.title,
                event.status
            );
        }
    }

    /// Runs a cycle every `interval` until `shutdown` resolves.
    ///
    /// Cycles never overlap: a tick that fires while a cycle is still running is
    /// skipped. A failed cycle is logged and the next one runs on schedule. A
    /// cycle still running at shutdown is dropped mid-flight.
    pub async fn run_periodically<F>(&self, interval: Duration, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Stopping periodic sync");
                    return;
                }
                _ = ticker.tick() => {
                    debug!("Starting sync cycle");
                    tokio::select! {
                        _ = &mut shutdown => {
                            warn!("Stopping periodic sync, abandoning the running cycle");
                            return;
                        }
                        result = self.run_cycle() => match result {
                            Ok(_) => {}
                            Err(err) if err.needs_reauthorization() => {
                                error!("{}. Authorization will be requested again next cycle.", err);
                            }
                            Err(err) => error!("Sync cycle aborted: {}", err),
                        },
                    }
                }
            }
        }
    }
}
