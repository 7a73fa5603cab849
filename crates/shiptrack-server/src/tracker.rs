//! The tracking scheduler: an owned background task that drives the
//! reconciliation job on a fixed interval and exposes an on-demand
//! trigger sharing the same run-in-progress flag, so at most one run is
//! ever in flight. `start()`/`stop()` give the task an explicit
//! lifecycle instead of a free-running global timer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use shiptrack_core::reconcile::{Reconciler, RunSummary};
use shiptrack_core::{Result, TrackError};

/// Completed runs kept for the health surface's recent activity.
const RUN_HISTORY_LIMIT: usize = 50;

// ---------------------------------------------------------------------------
// TrackerStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TrackerStatus {
    /// The interval ticker is alive.
    pub scheduler_active: bool,
    /// A run (scheduled or on-demand) is executing right now.
    pub in_progress: bool,
    pub interval_minutes: u64,
    pub last_run: Option<RunSummary>,
}

// ---------------------------------------------------------------------------
// RunGuard
// ---------------------------------------------------------------------------

/// RAII hold on the run-in-progress flag; released on drop even when a
/// run errors out.
struct RunGuard<'a>(&'a AtomicBool);

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
            .then_some(Self(flag))
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

pub struct Tracker {
    inner: Arc<Inner>,
    ticker: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

struct Inner {
    reconciler: Reconciler,
    interval_minutes: u64,
    run_in_progress: AtomicBool,
    last_run: RwLock<Option<RunSummary>>,
    history: Mutex<Vec<RunSummary>>,
    events: broadcast::Sender<RunSummary>,
}

impl Inner {
    /// Attempt one run. Fails fast with `JobAlreadyRunning` when the
    /// flag is held — the shared guard for both trigger paths.
    fn try_run(&self) -> Result<RunSummary> {
        let _guard =
            RunGuard::acquire(&self.run_in_progress).ok_or(TrackError::JobAlreadyRunning)?;
        let summary = self.reconciler.run_once()?;

        *self
            .last_run
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(summary.clone());
        {
            let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
            history.insert(0, summary.clone());
            history.truncate(RUN_HISTORY_LIMIT);
        }
        let _ = self.events.send(summary.clone());
        Ok(summary)
    }
}

impl Tracker {
    pub fn new(reconciler: Reconciler, interval_minutes: u64) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(Inner {
                reconciler,
                interval_minutes,
                run_in_progress: AtomicBool::new(false),
                last_run: RwLock::new(None),
                history: Mutex::new(Vec::new()),
                events,
            }),
            ticker: Mutex::new(None),
        }
    }

    /// Spawn the interval ticker. One run is attempted per tick; when a
    /// prior run is still executing the tick is skipped rather than
    /// queued. Idempotent while a ticker is alive.
    pub fn start(&self) {
        let mut ticker = self.ticker.lock().unwrap_or_else(PoisonError::into_inner);
        if ticker.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }

        let inner = self.inner.clone();
        let period = Duration::from_secs(self.inner.interval_minutes * 60);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick completes immediately; consume it so the
            // first run happens one full interval after startup.
            interval.tick().await;
            loop {
                interval.tick().await;
                let inner = inner.clone();
                match tokio::task::spawn_blocking(move || inner.try_run()).await {
                    Ok(Ok(summary)) => {
                        debug!(
                            checked = summary.checked,
                            updated = summary.updated,
                            "scheduled tracking run finished"
                        );
                    }
                    Ok(Err(TrackError::JobAlreadyRunning)) => {
                        debug!("previous tracking run still in progress, skipping tick");
                    }
                    Ok(Err(e)) => {
                        warn!(error = %e, "scheduled tracking run failed");
                    }
                    Err(e) => {
                        warn!(error = %e, "tracking run task panicked");
                    }
                }
            }
        });
        *ticker = Some(handle);
        info!(
            interval_minutes = self.inner.interval_minutes,
            "tracking scheduler started"
        );
    }

    /// Stop the interval ticker. An in-flight run completes on its
    /// blocking thread; only future ticks are cancelled.
    pub fn stop(&self) {
        let handle = self
            .ticker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
            info!("tracking scheduler stopped");
        }
    }

    /// On-demand run. Blocking; call from `spawn_blocking` in async
    /// contexts. Fails fast with `JobAlreadyRunning` instead of queuing.
    pub fn trigger(&self) -> Result<RunSummary> {
        self.inner.try_run()
    }

    pub fn status(&self) -> TrackerStatus {
        let scheduler_active = self
            .ticker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|h| !h.is_finished());
        TrackerStatus {
            scheduler_active,
            in_progress: self.inner.run_in_progress.load(Ordering::Acquire),
            interval_minutes: self.inner.interval_minutes,
            last_run: self
                .inner
                .last_run
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }

    /// Completed run summaries, newest first.
    pub fn recent(&self) -> Vec<RunSummary> {
        self.inner
            .history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Subscribe to completed-run broadcasts (SSE surface).
    pub fn subscribe(&self) -> broadcast::Receiver<RunSummary> {
        self.inner.events.subscribe()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use shiptrack_core::config::Config;
    use shiptrack_core::order::Order;
    use shiptrack_core::store::OrderStore;
    use shiptrack_core::types::OrderStatus;
    use tempfile::TempDir;

    fn tracker_with_store(dir: &TempDir, base_url: &str) -> (Arc<OrderStore>, Arc<Tracker>) {
        let store = Arc::new(OrderStore::open(&dir.path().join("orders.redb")).unwrap());
        let mut config = Config::new();
        config.carrier.base_url = base_url.to_string();
        config.tracking.call_timeout_ms = 2_000;
        let reconciler = Reconciler::new(store.clone(), &config);
        (store, Arc::new(Tracker::new(reconciler, 30)))
    }

    fn dispatched(store: &OrderStore, number: &str, reference: &str) -> Order {
        let order = Order::new(number, "Test Customer", 100_000);
        store.insert(&order).unwrap();
        store.attach_tracking(order.id, reference).unwrap()
    }

    #[test]
    fn trigger_runs_and_records_summary() {
        let dir = TempDir::new().unwrap();
        let mut server = mockito::Server::new();
        let (store, tracker) = tracker_with_store(&dir, &server.url());
        let order = dispatched(&store, "AUR-1001", "SR123456789");
        server
            .mock("GET", "/shipments/SR123456789/track")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"current_status": "DELIVERED"}"#)
            .create();

        let summary = tracker.trigger().unwrap();
        assert_eq!(summary.updated, 1);
        assert_eq!(store.get(order.id).unwrap().status, OrderStatus::Delivered);

        let status = tracker.status();
        assert!(!status.in_progress);
        assert!(!status.scheduler_active);
        assert_eq!(status.last_run, Some(summary.clone()));
        assert_eq!(tracker.recent(), vec![summary]);
    }

    #[test]
    fn concurrent_trigger_fails_fast() {
        use std::io::Write as _;

        let dir = TempDir::new().unwrap();
        let mut server = mockito::Server::new();
        let (store, tracker) = tracker_with_store(&dir, &server.url());
        dispatched(&store, "AUR-1001", "SR123456789");
        // Slow carrier keeps the first run in flight while the second
        // trigger arrives.
        server
            .mock("GET", "/shipments/SR123456789/track")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_chunked_body(|w| {
                std::thread::sleep(Duration::from_millis(400));
                w.write_all(b"{\"current_status\": \"IN_TRANSIT\"}")
            })
            .create();

        let first = {
            let tracker = tracker.clone();
            std::thread::spawn(move || tracker.trigger())
        };
        std::thread::sleep(Duration::from_millis(100));

        let second = tracker.trigger();
        assert!(matches!(second, Err(TrackError::JobAlreadyRunning)));
        assert!(tracker.status().in_progress);

        // Only the first run's updates land.
        let first = first.join().unwrap().unwrap();
        assert_eq!(first.updated, 1);
        assert_eq!(tracker.recent().len(), 1);
    }

    #[test]
    fn guard_released_after_each_run() {
        let dir = TempDir::new().unwrap();
        let server = mockito::Server::new();
        let (_store, tracker) = tracker_with_store(&dir, &server.url());

        // Empty store: runs check nothing but the flag cycles cleanly.
        tracker.trigger().unwrap();
        tracker.trigger().unwrap();
        assert!(!tracker.status().in_progress);
        assert_eq!(tracker.recent().len(), 2);
    }

    #[tokio::test]
    async fn start_and_stop_lifecycle() {
        let dir = TempDir::new().unwrap();
        let server = mockito::Server::new_async().await;
        let (_store, tracker) = tracker_with_store(&dir, &server.url());

        assert!(!tracker.status().scheduler_active);
        tracker.start();
        assert!(tracker.status().scheduler_active);
        // Idempotent while running.
        tracker.start();
        assert!(tracker.status().scheduler_active);

        tracker.stop();
        // Abort is asynchronous; the handle is gone either way.
        assert!(tracker.ticker.lock().unwrap().is_none());
    }
}
