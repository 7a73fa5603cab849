use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;

use crate::routes::tracking::summary_json;
use crate::state::AppState;

/// GET /api/events — SSE stream emitting a `run` event whenever a
/// reconciliation run completes.
pub async fn sse_events(State(app): State<AppState>) -> impl axum::response::IntoResponse {
    let rx = app.tracker.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| {
        msg.ok().map(|summary| {
            Ok::<Event, Infallible>(
                Event::default()
                    .event("run")
                    .data(summary_json(&summary).to_string()),
            )
        })
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}
