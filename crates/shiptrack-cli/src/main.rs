mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::orders::OrdersSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "shiptrack",
    about = "Order shipment tracking — durable order store, carrier reconciliation, API server",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root containing shiptrack.yaml (default: current directory)
    #[arg(long, global = true, env = "SHIPTRACK_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a shiptrack project (config + order store)
    Init,

    /// Run the API server and tracking scheduler
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "3141")]
        port: u16,
    },

    /// Execute one tracking reconciliation run now
    Run,

    /// Show store counts and tracking configuration
    Status,

    /// Manage orders
    Orders {
        #[command(subcommand)]
        subcommand: OrdersSubcommand,
    },

    /// Insert demo orders for local development
    Seed {
        /// Number of orders to create
        #[arg(long, default_value = "8")]
        count: usize,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = cli.root.unwrap_or_else(|| PathBuf::from("."));

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Serve { port } => cmd::serve::run(&root, port),
        Commands::Run => cmd::run::run(&root, cli.json),
        Commands::Status => cmd::status::run(&root, cli.json),
        Commands::Orders { subcommand } => cmd::orders::run(&root, subcommand, cli.json),
        Commands::Seed { count } => cmd::seed::run(&root, count, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
