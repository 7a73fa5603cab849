//! Carrier status client and external-vocabulary mapping.
//!
//! The carrier speaks its own status code set; `map_external_status` is
//! the single lookup table translating it into the domain enumeration.
//! Codes outside the table map to `Unknown`, which the reconciliation
//! job treats as "no change": the stored status survives, but the raw
//! payload is still recorded and the check timestamp refreshed.

use std::time::Duration;

use serde_json::Value;

use crate::error::{Result, TrackError};
use crate::types::OrderStatus;

// ---------------------------------------------------------------------------
// MappedStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappedStatus {
    Known(OrderStatus),
    Unknown,
}

/// Translate a carrier status code into the domain vocabulary.
/// Case, surrounding whitespace, and space/hyphen separators are
/// normalised before lookup.
pub fn map_external_status(code: &str) -> MappedStatus {
    let normalized = code.trim().to_ascii_uppercase().replace([' ', '-'], "_");
    match normalized.as_str() {
        "PICKUP_SCHEDULED" | "PICKUP_GENERATED" | "MANIFESTED" => {
            MappedStatus::Known(OrderStatus::Processing)
        }
        "PICKED_UP" | "SHIPPED" => MappedStatus::Known(OrderStatus::Shipped),
        "IN_TRANSIT" | "REACHED_HUB" => MappedStatus::Known(OrderStatus::InTransit),
        "OUT_FOR_DELIVERY" => MappedStatus::Known(OrderStatus::OutForDelivery),
        "DELIVERED" => MappedStatus::Known(OrderStatus::Delivered),
        "UNDELIVERED" | "RTO_INITIATED" | "RTO_DELIVERED" | "LOST" => {
            MappedStatus::Known(OrderStatus::Failed)
        }
        "CANCELLED" => MappedStatus::Known(OrderStatus::Cancelled),
        _ => MappedStatus::Unknown,
    }
}

// ---------------------------------------------------------------------------
// CarrierClient
// ---------------------------------------------------------------------------

/// One status lookup result: the carrier's own code plus the payload
/// verbatim, kept for the order's tracking history.
#[derive(Debug, Clone)]
pub struct CarrierUpdate {
    pub external_status: String,
    pub raw: Value,
}

pub struct CarrierClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl CarrierClient {
    /// Build a client with a total per-call timeout. The timeout covers
    /// connect, request, and body read; an expired call surfaces as
    /// `CarrierTimeout` and counts as a per-order failure.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TrackError::CarrierUnavailable(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the current shipment status for a tracking reference.
    pub fn fetch_status(&self, reference: &str) -> Result<CarrierUpdate> {
        let url = format!("{}/shipments/{}/track", self.base_url, reference);
        let resp = self.http.get(&url).send().map_err(|e| {
            if e.is_timeout() {
                TrackError::CarrierTimeout(format!("{reference}: {e}"))
            } else {
                TrackError::CarrierUnavailable(format!("{reference}: {e}"))
            }
        })?;

        let status = resp.status();
        if status.is_client_error() {
            return Err(TrackError::CarrierRejected(format!(
                "{reference}: HTTP {status}"
            )));
        }
        if !status.is_success() {
            return Err(TrackError::CarrierUnavailable(format!(
                "{reference}: HTTP {status}"
            )));
        }

        let raw: Value = resp.json().map_err(|e| {
            if e.is_timeout() {
                TrackError::CarrierTimeout(format!("{reference}: {e}"))
            } else {
                TrackError::CarrierUnavailable(format!("{reference}: {e}"))
            }
        })?;
        let external_status = raw
            .get("current_status")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        Ok(CarrierUpdate {
            external_status,
            raw,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
