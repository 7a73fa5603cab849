//! Persistent order storage using redb.
//!
//! A single `orders` table maps the order UUID (string key) to the
//! JSON-encoded `Order`. Candidate selection for reconciliation is a
//! filtered scan sorted by `last_checked_at` — never-checked orders sort
//! first, so the oldest work is always picked up before recently-polled
//! orders.

use std::path::Path;

use chrono::{DateTime, Utc};
use redb::{Database, ReadableTable, TableDefinition};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{Result, TrackError};
use crate::order::Order;
use crate::types::OrderStatus;

// ---------------------------------------------------------------------------
// Table definition
// ---------------------------------------------------------------------------

/// Key: order UUID as string. Value: JSON-encoded Order.
const ORDERS: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Outcome of one `apply_status_update` call.
#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    pub order: Order,
    /// True when the stored status actually changed.
    pub transitioned: bool,
}

impl ApplyOutcome {
    pub fn is_terminal(&self) -> bool {
        self.order.is_terminal()
    }
}

/// Store-level counts for the health surface.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StoreCounts {
    pub total: u64,
    pub with_tracking: u64,
    pub pending_trackable: u64,
}

// ---------------------------------------------------------------------------
// OrderStore
// ---------------------------------------------------------------------------

pub struct OrderStore {
    db: Database,
}

impl OrderStore {
    /// Open or create the order database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::create(path).map_err(|e| TrackError::Store(e.to_string()))?;
        // Ensure the table exists before any reads
        let wt = db
            .begin_write()
            .map_err(|e| TrackError::Store(e.to_string()))?;
        wt.open_table(ORDERS)
            .map_err(|e| TrackError::Store(e.to_string()))?;
        wt.commit().map_err(|e| TrackError::Store(e.to_string()))?;
        Ok(Self { db })
    }

    /// Insert a new order. Fails with `OrderExists` on a duplicate id.
    pub fn insert(&self, order: &Order) -> Result<()> {
        let key = order.id.to_string();
        let value = serde_json::to_vec(order)?;
        let wt = self
            .db
            .begin_write()
            .map_err(|e| TrackError::Store(e.to_string()))?;
        {
            let mut table = wt
                .open_table(ORDERS)
                .map_err(|e| TrackError::Store(e.to_string()))?;
            let exists = table
                .get(key.as_str())
                .map_err(|e| TrackError::Store(e.to_string()))?
                .is_some();
            if exists {
                return Err(TrackError::OrderExists(order.order_number.clone()));
            }
            table
                .insert(key.as_str(), value.as_slice())
                .map_err(|e| TrackError::Store(e.to_string()))?;
        }
        wt.commit().map_err(|e| TrackError::Store(e.to_string()))?;
        Ok(())
    }

    /// Load a single order by id.
    pub fn get(&self, id: Uuid) -> Result<Order> {
        let rt = self
            .db
            .begin_read()
            .map_err(|e| TrackError::Store(e.to_string()))?;
        let table = rt
            .open_table(ORDERS)
            .map_err(|e| TrackError::Store(e.to_string()))?;
        let key = id.to_string();
        let guard = table
            .get(key.as_str())
            .map_err(|e| TrackError::Store(e.to_string()))?
            .ok_or_else(|| TrackError::OrderNotFound(key.clone()))?;
        let order: Order = serde_json::from_slice(guard.value())?;
        Ok(order)
    }

    /// All orders, newest first.
    pub fn list(&self) -> Result<Vec<Order>> {
        let mut orders = self.scan()?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// Attach a carrier tracking reference at dispatch time.
    pub fn attach_tracking(&self, id: Uuid, reference: &str) -> Result<Order> {
        self.mutate(id, |order| order.dispatch(reference))
    }

    /// Candidate orders for a reconciliation run: tracking reference
    /// present, status non-terminal, ordered by `last_checked_at`
    /// ascending with never-checked orders first, capped at `limit`.
    pub fn find_pending_trackable(&self, limit: usize) -> Result<Vec<Order>> {
        let mut candidates: Vec<Order> = self
            .scan()?
            .into_iter()
            .filter(|o| o.is_trackable())
            .collect();
        // Option<DateTime> orders None before Some, which is exactly the
        // nulls-first contract.
        candidates.sort_by_key(|o| o.last_checked_at);
        candidates.truncate(limit);
        Ok(candidates)
    }

    /// Apply one tracking check result to an order, atomically: status
    /// change (when `new_status` differs), one history append, and the
    /// `last_checked_at` refresh all land in a single write transaction.
    ///
    /// `new_status = None` is the no-change refresh used for unknown or
    /// unchanged carrier codes.
    pub fn apply_status_update(
        &self,
        id: Uuid,
        new_status: Option<OrderStatus>,
        raw: serde_json::Value,
        checked_at: DateTime<Utc>,
    ) -> Result<ApplyOutcome> {
        let mut transitioned = false;
        let order = self.mutate(id, |order| {
            transitioned = order.record_tracking(new_status, raw, checked_at);
            Ok(())
        })?;
        Ok(ApplyOutcome {
            order,
            transitioned,
        })
    }

    /// Store-level counts for the health surface.
    pub fn counts(&self) -> Result<StoreCounts> {
        let orders = self.scan()?;
        let with_tracking = orders
            .iter()
            .filter(|o| o.tracking_reference.is_some())
            .count() as u64;
        let pending_trackable = orders.iter().filter(|o| o.is_trackable()).count() as u64;
        Ok(StoreCounts {
            total: orders.len() as u64,
            with_tracking,
            pending_trackable,
        })
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn scan(&self) -> Result<Vec<Order>> {
        let rt = self
            .db
            .begin_read()
            .map_err(|e| TrackError::Store(e.to_string()))?;
        let table = rt
            .open_table(ORDERS)
            .map_err(|e| TrackError::Store(e.to_string()))?;
        let mut orders = Vec::new();
        for entry in table.iter().map_err(|e| TrackError::Store(e.to_string()))? {
            let (_, v) = entry.map_err(|e| TrackError::Store(e.to_string()))?;
            let order: Order = serde_json::from_slice(v.value())?;
            orders.push(order);
        }
        Ok(orders)
    }

    /// Read-modify-write one order inside a single write transaction.
    /// redb serialises writers, so concurrent mutations of different
    /// orders never interfere and same-order mutations apply in sequence
    /// with no lost history appends.
    fn mutate<F>(&self, id: Uuid, f: F) -> Result<Order>
    where
        F: FnOnce(&mut Order) -> Result<()>,
    {
        let key = id.to_string();
        let wt = self
            .db
            .begin_write()
            .map_err(|e| TrackError::Store(e.to_string()))?;
        let order = {
            let mut table = wt
                .open_table(ORDERS)
                .map_err(|e| TrackError::Store(e.to_string()))?;
            let mut order: Order = {
                let guard = table
                    .get(key.as_str())
                    .map_err(|e| TrackError::Store(e.to_string()))?
                    .ok_or_else(|| TrackError::OrderNotFound(key.clone()))?;
                serde_json::from_slice(guard.value())?
            };
            f(&mut order)?;
            let value = serde_json::to_vec(&order)?;
            table
                .insert(key.as_str(), value.as_slice())
                .map_err(|e| TrackError::Store(e.to_string()))?;
            order
        };
        wt.commit().map_err(|e| TrackError::Store(e.to_string()))?;
        Ok(order)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
