use anyhow::bail;
use shiptrack_core::config::{Config, WarnLevel};
use std::path::Path;

pub fn run(root: &Path, port: u16) -> anyhow::Result<()> {
    // Fail early on a missing or broken config instead of mid-serve.
    let config = Config::load(root)?;
    for warning in config.validate() {
        match warning.level {
            WarnLevel::Error => bail!("invalid configuration: {}", warning.message),
            WarnLevel::Warning => tracing::warn!("{}", warning.message),
        }
    }

    let rt = tokio::runtime::Runtime::new()?;
    let root = root.to_path_buf();
    rt.block_on(async move {
        tokio::select! {
            res = shiptrack_server::serve(&root, port) => res,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                Ok(())
            }
        }
    })
}
