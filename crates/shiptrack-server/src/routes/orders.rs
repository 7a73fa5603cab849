use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use shiptrack_core::order::Order;
use shiptrack_core::TrackError;

use crate::error::AppError;
use crate::state::AppState;

fn parse_order_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError(TrackError::InvalidOrderId(id.to_string()).into()))
}

// ---------------------------------------------------------------------------
// List / create / get
// ---------------------------------------------------------------------------

/// GET /api/orders — all orders, newest first.
pub async fn list_orders(State(app): State<AppState>) -> Result<Json<Vec<Order>>, AppError> {
    let store = app.store.clone();
    let orders = tokio::task::spawn_blocking(move || store.list())
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(orders))
}

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    /// Display identifier; generated when omitted.
    pub order_number: Option<String>,
    pub customer: String,
    pub total_cents: u64,
}

/// POST /api/orders — create an order in `placed` status.
pub async fn create_order(
    State(app): State<AppState>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<Json<Order>, AppError> {
    if body.customer.trim().is_empty() {
        return Err(AppError::bad_request("customer must not be empty"));
    }

    let order = match body.order_number {
        Some(number) => Order::new(number, body.customer, body.total_cents),
        None => Order::new_auto(body.customer, body.total_cents),
    };

    let store = app.store.clone();
    let stored = order.clone();
    tokio::task::spawn_blocking(move || store.insert(&stored))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(order))
}

/// GET /api/orders/{id}
pub async fn get_order(
    Path(id): Path<String>,
    State(app): State<AppState>,
) -> Result<Json<Order>, AppError> {
    let order_id = parse_order_id(&id)?;
    let store = app.store.clone();
    let order = tokio::task::spawn_blocking(move || store.get(order_id))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(order))
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct DispatchRequest {
    pub tracking_reference: String,
}

/// POST /api/orders/{id}/dispatch — attach a carrier tracking reference.
/// The order becomes `shipped` and enters the reconciliation candidate
/// set; from here on the tracking job owns its status.
pub async fn dispatch_order(
    Path(id): Path<String>,
    State(app): State<AppState>,
    Json(body): Json<DispatchRequest>,
) -> Result<Json<Order>, AppError> {
    let order_id = parse_order_id(&id)?;
    let store = app.store.clone();
    let order = tokio::task::spawn_blocking(move || {
        store.attach_tracking(order_id, &body.tracking_reference)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(order))
}
