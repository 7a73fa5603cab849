use crate::output::print_json;
use anyhow::Context;
use shiptrack_core::config::Config;
use shiptrack_core::paths;
use shiptrack_core::reconcile::Reconciler;
use shiptrack_core::store::OrderStore;
use std::path::Path;
use std::sync::Arc;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root)?;
    let store = Arc::new(
        OrderStore::open(&paths::store_path(root, &config)).context("failed to open order store")?,
    );
    let reconciler = Reconciler::new(store, &config);
    let summary = reconciler.run_once().context("tracking run failed")?;

    if json {
        print_json(&summary)?;
    } else {
        println!(
            "checked {}  updated {}  unchanged {}  failed {}",
            summary.checked, summary.updated, summary.unchanged, summary.failed
        );
        if !summary.terminal_transitions.is_empty() {
            println!(
                "reached terminal status: {}",
                summary.terminal_transitions.join(", ")
            );
        }
    }
    Ok(())
}
