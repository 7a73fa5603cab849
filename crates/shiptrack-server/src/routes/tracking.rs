use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

use shiptrack_core::reconcile::RunSummary;

use crate::error::AppError;
use crate::state::AppState;

/// Wire shape for a run summary. The tracking endpoints keep the
/// camelCase contract the storefront client already speaks.
pub(crate) fn summary_json(summary: &RunSummary) -> Value {
    json!({
        "startedAt": summary.started_at,
        "finishedAt": summary.finished_at,
        "checked": summary.checked,
        "updated": summary.updated,
        "unchanged": summary.unchanged,
        "failed": summary.failed,
        "terminalTransitions": summary.terminal_transitions,
    })
}

// ---------------------------------------------------------------------------
// Trigger
// ---------------------------------------------------------------------------

/// POST /api/tracking/update — run one reconciliation pass now.
/// Returns 409 when a scheduled or on-demand run is already in flight.
pub async fn trigger_update(State(app): State<AppState>) -> Result<Json<Value>, AppError> {
    let tracker = app.tracker.clone();
    let summary = tokio::task::spawn_blocking(move || tracker.trigger())
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(json!({
        "success": true,
        "data": {
            "message": format!(
                "Tracking refresh complete: {} updated, {} unchanged, {} failed of {} checked",
                summary.updated, summary.unchanged, summary.failed, summary.checked
            ),
            "updatedCount": summary.updated,
        }
    })))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

/// GET /api/tracking/health — scheduler state, store counts, uptime, and
/// recent run activity. Always reports rather than erroring: a store
/// failure shows up as `database.connected = false`.
pub async fn health(State(app): State<AppState>) -> Json<Value> {
    let status = app.tracker.status();
    let store = app.store.clone();
    let counts = tokio::task::spawn_blocking(move || store.counts()).await;
    let counts = match counts {
        Ok(Ok(c)) => Some(c),
        _ => None,
    };

    let recent: Vec<Value> = app.tracker.recent().iter().map(summary_json).collect();

    Json(json!({
        "timestamp": Utc::now(),
        "cronJob": {
            "status": if status.scheduler_active { "active" } else { "stopped" },
            "frequency": format!("every {} minutes", status.interval_minutes),
            "inProgress": status.in_progress,
            "lastRunAt": status.last_run.as_ref().map(|r| r.finished_at),
            "lastRun": status.last_run.as_ref().map(summary_json),
        },
        "database": {
            "connected": counts.is_some(),
            "totalOrders": counts.map_or(0, |c| c.total),
            "totalTracking": counts.map_or(0, |c| c.with_tracking),
            "ordersToUpdate": counts.map_or(0, |c| c.pending_trackable),
        },
        "systemInfo": {
            "uptime": app.uptime_seconds(),
        },
        "recentActivity": recent,
    }))
}

// ---------------------------------------------------------------------------
// Run history
// ---------------------------------------------------------------------------

/// GET /api/tracking/runs — recent run summaries, newest first.
pub async fn list_runs(State(app): State<AppState>) -> Json<Value> {
    let runs: Vec<Value> = app.tracker.recent().iter().map(summary_json).collect();
    Json(json!(runs))
}
