//! The tracking reconciliation job: one run fetches a bounded batch of
//! candidate orders, asks the carrier for each shipment's current
//! status, and applies whatever updates succeed. A single order's
//! failure never aborts the run; a store failure does.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::carrier::{map_external_status, CarrierClient, MappedStatus};
use crate::config::Config;
use crate::error::Result;
use crate::store::OrderStore;

// ---------------------------------------------------------------------------
// RunSummary
// ---------------------------------------------------------------------------

/// Aggregate outcome of one reconciliation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Candidates attempted this run (successes and failures).
    pub checked: u32,
    /// Orders whose stored status changed.
    pub updated: u32,
    /// Orders refreshed without a status change (same or unknown code).
    pub unchanged: u32,
    /// Orders skipped after a carrier failure.
    pub failed: u32,
    /// Order numbers that reached a terminal status this run.
    pub terminal_transitions: Vec<String>,
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

pub struct Reconciler {
    store: Arc<OrderStore>,
    carrier_base_url: String,
    call_timeout: Duration,
    batch_size: usize,
}

impl Reconciler {
    pub fn new(store: Arc<OrderStore>, config: &Config) -> Self {
        Self {
            store,
            carrier_base_url: config.carrier.base_url.clone(),
            call_timeout: config.tracking.call_timeout(),
            batch_size: config.tracking.batch_size,
        }
    }

    /// Execute one full reconciliation run.
    ///
    /// Per-order carrier failures are tallied and skipped — no mutation,
    /// no `last_checked_at` refresh, so the order stays at the front of
    /// the next run's queue. Only store failures abort the run; the next
    /// scheduled tick is the retry.
    pub fn run_once(&self) -> Result<RunSummary> {
        let started_at = Utc::now();
        let client = CarrierClient::new(&self.carrier_base_url, self.call_timeout)?;
        let candidates = self.store.find_pending_trackable(self.batch_size)?;
        debug!(candidates = candidates.len(), "tracking run started");

        let mut checked = 0u32;
        let mut updated = 0u32;
        let mut unchanged = 0u32;
        let mut failed = 0u32;
        let mut terminal_transitions = Vec::new();

        for order in candidates {
            let Some(reference) = order.tracking_reference.clone() else {
                // find_pending_trackable never returns these.
                continue;
            };
            checked += 1;

            match client.fetch_status(&reference) {
                Ok(update) => {
                    let new_status = match map_external_status(&update.external_status) {
                        MappedStatus::Known(s) if s != order.status => Some(s),
                        _ => None,
                    };
                    let outcome =
                        self.store
                            .apply_status_update(order.id, new_status, update.raw, Utc::now())?;
                    if outcome.transitioned {
                        updated += 1;
                        info!(
                            order = %order.order_number,
                            from = %order.status,
                            to = %outcome.order.status,
                            "tracking status updated"
                        );
                        if outcome.is_terminal() {
                            terminal_transitions.push(order.order_number.clone());
                        }
                    } else {
                        unchanged += 1;
                    }
                }
                Err(e) if e.is_carrier_failure() => {
                    failed += 1;
                    warn!(
                        order = %order.order_number,
                        reference = %reference,
                        error = %e,
                        "tracking check failed, skipping order for this run"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        let summary = RunSummary {
            started_at,
            finished_at: Utc::now(),
            checked,
            updated,
            unchanged,
            failed,
            terminal_transitions,
        };
        info!(
            checked = summary.checked,
            updated = summary.updated,
            unchanged = summary.unchanged,
            failed = summary.failed,
            "tracking run finished"
        );
        Ok(summary)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
