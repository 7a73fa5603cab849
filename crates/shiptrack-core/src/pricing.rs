//! Jewelry price computation: metal weight × rate, plus stone value,
//! making charges on the metal value, and GST on the subtotal. All
//! amounts are integer cents, rounded half away from zero.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PriceBreakdown
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub metal_value_cents: u64,
    pub stone_value_cents: u64,
    pub making_charges_cents: u64,
    pub gst_cents: u64,
    pub total_cents: u64,
}

/// Compute a price breakdown for a single piece.
///
/// `making_charge_pct` applies to the metal value only; `gst_pct`
/// applies to the subtotal (metal + stones + making charges).
pub fn quote(
    weight_grams: f64,
    rate_cents_per_gram: u64,
    stone_value_cents: u64,
    making_charge_pct: f64,
    gst_pct: f64,
) -> PriceBreakdown {
    let metal_value_cents = round_cents(weight_grams * rate_cents_per_gram as f64);
    let making_charges_cents = round_cents(metal_value_cents as f64 * making_charge_pct / 100.0);
    let subtotal = metal_value_cents + stone_value_cents + making_charges_cents;
    let gst_cents = round_cents(subtotal as f64 * gst_pct / 100.0);
    PriceBreakdown {
        metal_value_cents,
        stone_value_cents,
        making_charges_cents,
        gst_cents,
        total_cents: subtotal + gst_cents,
    }
}

fn round_cents(value: f64) -> u64 {
    if value <= 0.0 {
        return 0;
    }
    value.round() as u64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
