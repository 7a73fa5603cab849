use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use shiptrack_core::config::Config;
use shiptrack_core::reconcile::Reconciler;
use shiptrack_core::store::OrderStore;
use shiptrack_core::{paths, Result};

use crate::tracker::Tracker;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<OrderStore>,
    pub tracker: Arc<Tracker>,
    pub config: Config,
    pub started_at: DateTime<Utc>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Load the project config, open the order store, and build the
    /// tracking scheduler. The interval ticker is only spawned when a
    /// Tokio runtime is present (skipped in sync unit tests).
    pub fn open(root: &Path) -> Result<Self> {
        let config = Config::load(root)?;
        let store = Arc::new(OrderStore::open(&paths::store_path(root, &config))?);
        let reconciler = Reconciler::new(store.clone(), &config);
        let tracker = Arc::new(Tracker::new(reconciler, config.tracking.interval_minutes));

        if tokio::runtime::Handle::try_current().is_ok() {
            tracker.start();
        }

        Ok(Self {
            store,
            tracker,
            config,
            started_at: Utc::now(),
        })
    }

    /// Seconds since this server instance came up.
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn open_requires_config() {
        let dir = TempDir::new().unwrap();
        let err = AppState::open(dir.path()).unwrap_err();
        assert!(matches!(err, shiptrack_core::TrackError::NotInitialized));
    }

    #[test]
    fn open_without_runtime_leaves_scheduler_stopped() {
        let dir = TempDir::new().unwrap();
        Config::new().save(dir.path()).unwrap();
        let state = AppState::open(dir.path()).unwrap();
        assert!(!state.tracker.status().scheduler_active);
        assert_eq!(state.tracker.status().interval_minutes, 30);
    }
}
