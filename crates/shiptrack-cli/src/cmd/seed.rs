use crate::output::print_json;
use anyhow::Context;
use shiptrack_core::config::Config;
use shiptrack_core::order::Order;
use shiptrack_core::store::OrderStore;
use shiptrack_core::{paths, pricing};
use std::path::Path;

/// Demo customers and pieces (weight in grams, stone value in cents,
/// making charge percent). Totals come from the pricing module at the
/// current demo gold rate.
const CUSTOMERS: &[&str] = &[
    "Priya Sharma",
    "Arjun Mehta",
    "Kavya Nair",
    "Rohan Gupta",
    "Ananya Iyer",
    "Vikram Rao",
    "Meera Joshi",
    "Aditya Kulkarni",
];

const PIECES: &[(f64, u64, f64)] = &[
    (4.2, 0, 10.0),
    (10.5, 200_000, 12.0),
    (2.8, 150_000, 14.0),
    (7.0, 0, 11.0),
    (15.3, 450_000, 12.5),
    (3.6, 80_000, 13.0),
    (8.9, 0, 10.5),
    (5.4, 120_000, 12.0),
];

const DEMO_GOLD_RATE_CENTS_PER_GRAM: u64 = 650_000;
const GST_PCT: f64 = 3.0;

pub fn run(root: &Path, count: usize, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root)?;
    let store =
        OrderStore::open(&paths::store_path(root, &config)).context("failed to open order store")?;

    let mut created = Vec::with_capacity(count);
    for i in 0..count {
        let customer = CUSTOMERS[i % CUSTOMERS.len()];
        let (weight, stone, making) = PIECES[i % PIECES.len()];
        let breakdown = pricing::quote(
            weight,
            DEMO_GOLD_RATE_CENTS_PER_GRAM,
            stone,
            making,
            GST_PCT,
        );

        let order = Order::new_auto(customer, breakdown.total_cents);
        store.insert(&order)?;

        // Dispatch every other order so a seeded store has work for the
        // reconciliation job straight away.
        let order = if i % 2 == 0 {
            let reference = format!("SR{:09}", 100_000_000 + i as u64);
            store.attach_tracking(order.id, &reference)?
        } else {
            order
        };
        created.push(order);
    }

    if json {
        print_json(&created)?;
    } else {
        let dispatched = created
            .iter()
            .filter(|o| o.tracking_reference.is_some())
            .count();
        println!(
            "Seeded {} orders ({} dispatched with tracking references)",
            created.len(),
            dispatched
        );
    }
    Ok(())
}
