use crate::error::{Result, TrackError};
use crate::types::OrderStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// TrackingEvent
// ---------------------------------------------------------------------------

/// One append-only entry in an order's tracking history. `raw` carries the
/// carrier payload verbatim; entries are never reordered or truncated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
    pub raw: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Order
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub customer: String,
    pub total_cents: u64,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_reference: Option<String>,
    #[serde(default)]
    pub last_checked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tracking_history: Vec<TrackingEvent>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(
        order_number: impl Into<String>,
        customer: impl Into<String>,
        total_cents: u64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            order_number: order_number.into(),
            customer: customer.into(),
            total_cents,
            status: OrderStatus::Placed,
            tracking_reference: None,
            last_checked_at: None,
            tracking_history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create an order with a generated display number derived from its
    /// id, e.g. `AUR-9F2C41D0`.
    pub fn new_auto(customer: impl Into<String>, total_cents: u64) -> Self {
        let mut order = Self::new("", customer, total_cents);
        order.order_number = format!(
            "AUR-{}",
            order.id.simple().to_string()[..8].to_uppercase()
        );
        order
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Eligible for a reconciliation scan: has a carrier reference and is
    /// not in a terminal status.
    pub fn is_trackable(&self) -> bool {
        self.tracking_reference.is_some() && !self.is_terminal()
    }

    /// Attach a carrier tracking reference at dispatch time. Marks the
    /// order `Shipped` and appends the dispatch event; from here on the
    /// reconciliation job owns status and history.
    pub fn dispatch(&mut self, reference: &str) -> Result<()> {
        validate_tracking_reference(reference)?;
        if self.is_terminal() {
            return Err(TrackError::TerminalOrder {
                order: self.order_number.clone(),
                status: self.status.to_string(),
            });
        }
        if self.tracking_reference.is_some() {
            return Err(TrackError::AlreadyDispatched(self.order_number.clone()));
        }
        let now = Utc::now();
        self.tracking_reference = Some(reference.to_string());
        self.status = OrderStatus::Shipped;
        self.tracking_history.push(TrackingEvent {
            status: OrderStatus::Shipped,
            timestamp: now,
            raw: serde_json::json!({ "source": "dispatch", "reference": reference }),
        });
        self.updated_at = now;
        Ok(())
    }

    /// Apply one tracking check result. `new_status = None` is the
    /// no-change refresh (same or unknown carrier code): status is left
    /// untouched but the raw payload is still appended and
    /// `last_checked_at` advances. Returns true when the status changed.
    pub fn record_tracking(
        &mut self,
        new_status: Option<OrderStatus>,
        raw: serde_json::Value,
        checked_at: DateTime<Utc>,
    ) -> bool {
        let transitioned = match new_status {
            Some(s) if s != self.status => {
                self.status = s;
                true
            }
            _ => false,
        };
        self.tracking_history.push(TrackingEvent {
            status: self.status,
            timestamp: checked_at,
            raw,
        });
        self.last_checked_at = Some(checked_at);
        self.updated_at = checked_at;
        transitioned
    }
}

// ---------------------------------------------------------------------------
// Tracking reference validation
// ---------------------------------------------------------------------------

fn reference_pattern() -> &'static regex::Regex {
    static PATTERN: OnceLock<regex::Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        regex::Regex::new(r"^[A-Za-z0-9-]{6,32}$").expect("tracking reference pattern is valid")
    })
}

pub fn validate_tracking_reference(reference: &str) -> Result<()> {
    if !reference_pattern().is_match(reference) {
        return Err(TrackError::InvalidTrackingReference(reference.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
