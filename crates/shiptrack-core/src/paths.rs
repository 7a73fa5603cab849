use crate::config::Config;
use std::path::{Path, PathBuf};

/// Project configuration file, at the root of a shiptrack project.
pub fn config_path(root: &Path) -> PathBuf {
    root.join("shiptrack.yaml")
}

/// Order database file; `store.path` in the config is resolved relative
/// to the project root.
pub fn store_path(root: &Path, config: &Config) -> PathBuf {
    root.join(&config.store.path)
}
