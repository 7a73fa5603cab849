pub mod error;
pub mod routes;
pub mod state;
pub mod tracker;

use axum::routing::{get, post};
use axum::Router;
use std::path::Path;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Events (SSE)
        .route("/api/events", get(routes::events::sse_events))
        // Orders
        .route("/api/orders", get(routes::orders::list_orders))
        .route("/api/orders", post(routes::orders::create_order))
        .route("/api/orders/{id}", get(routes::orders::get_order))
        .route(
            "/api/orders/{id}/dispatch",
            post(routes::orders::dispatch_order),
        )
        // Tracking
        .route("/api/tracking/update", post(routes::tracking::trigger_update))
        .route("/api/tracking/health", get(routes::tracking::health))
        .route("/api/tracking/runs", get(routes::tracking::list_runs))
        // Pricing
        .route("/api/pricing/quote", post(routes::pricing::quote))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the shiptrack API server and tracking scheduler.
pub async fn serve(root: &Path, port: u16) -> anyhow::Result<()> {
    let app_state = AppState::open(root)?;
    let tracker = app_state.tracker.clone();
    let app = build_router(app_state);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let actual_port = listener.local_addr()?.port();

    tracing::info!("shiptrack API listening on http://localhost:{actual_port}");

    let result = axum::serve(listener, app).await;
    tracker.stop();
    result?;
    Ok(())
}
