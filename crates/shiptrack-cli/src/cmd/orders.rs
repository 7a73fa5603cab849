use crate::output::{format_cents, print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use shiptrack_core::config::Config;
use shiptrack_core::order::Order;
use shiptrack_core::paths;
use shiptrack_core::store::OrderStore;
use shiptrack_core::TrackError;
use std::path::Path;
use uuid::Uuid;

#[derive(Subcommand)]
pub enum OrdersSubcommand {
    /// List all orders
    List,
    /// Show one order with its tracking history
    Show { id: String },
    /// Create an order in `placed` status
    Create {
        #[arg(long)]
        customer: String,
        /// Order total in cents
        #[arg(long)]
        total_cents: u64,
        /// Display identifier; generated when omitted
        #[arg(long)]
        number: Option<String>,
    },
    /// Attach a carrier tracking reference (marks the order shipped)
    Dispatch {
        id: String,
        #[arg(long)]
        reference: String,
    },
}

pub fn run(root: &Path, subcmd: OrdersSubcommand, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root)?;
    let store =
        OrderStore::open(&paths::store_path(root, &config)).context("failed to open order store")?;

    match subcmd {
        OrdersSubcommand::List => list(&store, json),
        OrdersSubcommand::Show { id } => show(&store, &id, json),
        OrdersSubcommand::Create {
            customer,
            total_cents,
            number,
        } => create(&store, &customer, total_cents, number.as_deref(), json),
        OrdersSubcommand::Dispatch { id, reference } => dispatch(&store, &id, &reference, json),
    }
}

fn parse_id(id: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(id).map_err(|_| TrackError::InvalidOrderId(id.to_string()).into())
}

fn list(store: &OrderStore, json: bool) -> anyhow::Result<()> {
    let orders = store.list()?;
    if json {
        return print_json(&orders);
    }

    let headers = &["ORDER", "CUSTOMER", "TOTAL", "STATUS", "TRACKING", "LAST CHECK"];
    let rows: Vec<Vec<String>> = orders
        .iter()
        .map(|o| {
            vec![
                o.order_number.clone(),
                o.customer.clone(),
                format_cents(o.total_cents),
                o.status.to_string(),
                o.tracking_reference.clone().unwrap_or_else(|| "-".into()),
                o.last_checked_at
                    .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
                    .unwrap_or_else(|| "never".into()),
            ]
        })
        .collect();
    print_table(headers, rows);
    Ok(())
}

fn show(store: &OrderStore, id: &str, json: bool) -> anyhow::Result<()> {
    let order = store.get(parse_id(id)?)?;
    if json {
        return print_json(&order);
    }

    println!("{}  {}  {}", order.order_number, order.customer, order.status);
    println!("  id: {}", order.id);
    println!("  total: {}", format_cents(order.total_cents));
    match &order.tracking_reference {
        Some(reference) => println!("  tracking: {reference}"),
        None => println!("  tracking: not dispatched"),
    }
    if !order.tracking_history.is_empty() {
        println!("  history:");
        for event in &order.tracking_history {
            println!(
                "    {}  {}",
                event.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
                event.status
            );
        }
    }
    Ok(())
}

fn create(
    store: &OrderStore,
    customer: &str,
    total_cents: u64,
    number: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let order = match number {
        Some(number) => Order::new(number, customer, total_cents),
        None => Order::new_auto(customer, total_cents),
    };
    store.insert(&order)?;
    if json {
        print_json(&order)?;
    } else {
        println!("Created order {} ({})", order.order_number, order.id);
    }
    Ok(())
}

fn dispatch(store: &OrderStore, id: &str, reference: &str, json: bool) -> anyhow::Result<()> {
    let order = store.attach_tracking(parse_id(id)?, reference)?;
    if json {
        print_json(&order)?;
    } else {
        println!(
            "Dispatched {} with tracking reference {}",
            order.order_number, reference
        );
    }
    Ok(())
}
