use anyhow::Context;
use shiptrack_core::config::Config;
use shiptrack_core::store::OrderStore;
use shiptrack_core::{io, paths};
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    io::ensure_dir(root).context("failed to create project root")?;

    let config_file = paths::config_path(root);
    if config_file.exists() {
        println!("shiptrack already initialized at {}", root.display());
    } else {
        Config::new()
            .save(root)
            .context("failed to write shiptrack.yaml")?;
        println!("Created {}", config_file.display());
    }

    let config = Config::load(root)?;
    for warning in config.validate() {
        println!("warning: {}", warning.message);
    }

    let store_file = paths::store_path(root, &config);
    OrderStore::open(&store_file).context("failed to open order store")?;
    println!("Order store ready at {}", store_file.display());
    Ok(())
}
