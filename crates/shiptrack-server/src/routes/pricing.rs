use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use shiptrack_core::pricing::{self, PriceBreakdown};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct QuoteRequest {
    pub weight_grams: f64,
    pub rate_cents_per_gram: u64,
    #[serde(default)]
    pub stone_value_cents: u64,
    #[serde(default)]
    pub making_charge_pct: f64,
    #[serde(default)]
    pub gst_pct: f64,
}

/// POST /api/pricing/quote — price breakdown for a single piece.
pub async fn quote(
    State(_app): State<AppState>,
    Json(body): Json<QuoteRequest>,
) -> Result<Json<PriceBreakdown>, AppError> {
    if !body.weight_grams.is_finite() || body.weight_grams <= 0.0 {
        return Err(AppError::bad_request("weight_grams must be positive"));
    }
    if !body.making_charge_pct.is_finite() || body.making_charge_pct < 0.0 {
        return Err(AppError::bad_request("making_charge_pct must be non-negative"));
    }
    if !body.gst_pct.is_finite() || body.gst_pct < 0.0 {
        return Err(AppError::bad_request("gst_pct must be non-negative"));
    }

    Ok(Json(pricing::quote(
        body.weight_grams,
        body.rate_cents_per_gram,
        body.stone_value_cents,
        body.making_charge_pct,
        body.gst_pct,
    )))
}
