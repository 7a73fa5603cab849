use crate::output::print_json;
use anyhow::Context;
use shiptrack_core::config::Config;
use shiptrack_core::paths;
use shiptrack_core::store::OrderStore;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root)?;
    let store =
        OrderStore::open(&paths::store_path(root, &config)).context("failed to open order store")?;
    let counts = store.counts()?;

    if json {
        print_json(&serde_json::json!({
            "orders": {
                "total": counts.total,
                "with_tracking": counts.with_tracking,
                "pending_trackable": counts.pending_trackable,
            },
            "tracking": {
                "interval_minutes": config.tracking.interval_minutes,
                "batch_size": config.tracking.batch_size,
                "call_timeout_ms": config.tracking.call_timeout_ms,
                "carrier_base_url": config.carrier.base_url,
            },
        }))?;
        return Ok(());
    }

    println!("orders: {} total", counts.total);
    println!("  with tracking reference: {}", counts.with_tracking);
    println!("  pending tracking update: {}", counts.pending_trackable);
    println!(
        "tracking: every {} minutes, batch {}, carrier timeout {} ms",
        config.tracking.interval_minutes, config.tracking.batch_size, config.tracking.call_timeout_ms
    );
    println!("carrier: {}", config.carrier.base_url);
    Ok(())
}
