use crate::error::{Result, TrackError};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// StoreConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: String,
}

fn default_store_path() -> String {
    "orders.redb".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

// ---------------------------------------------------------------------------
// CarrierConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarrierConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    "https://track.example-carrier.com/api/v1".to_string()
}

impl Default for CarrierConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

// ---------------------------------------------------------------------------
// TrackingConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Scheduler tick frequency.
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,
    /// Upper bound on candidate orders per run.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Total timeout for one carrier status call.
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
}

fn default_interval_minutes() -> u64 {
    30
}

fn default_batch_size() -> usize {
    50
}

fn default_call_timeout_ms() -> u64 {
    10_000
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            interval_minutes: default_interval_minutes(),
            batch_size: default_batch_size(),
            call_timeout_ms: default_call_timeout_ms(),
        }
    }
}

impl TrackingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes * 60)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub carrier: CarrierConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            version: 1,
            store: StoreConfig::default(),
            carrier: CarrierConfig::default(),
            tracking: TrackingConfig::default(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(TrackError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.tracking.interval_minutes == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "tracking.interval_minutes must be at least 1".to_string(),
            });
        }
        if self.tracking.batch_size == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "tracking.batch_size must be at least 1".to_string(),
            });
        }
        if self.tracking.call_timeout_ms == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "tracking.call_timeout_ms must be at least 1".to_string(),
            });
        }
        if self.tracking.batch_size > 500 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "tracking.batch_size={} (>500 is unusual for a polling batch)",
                    self.tracking.batch_size
                ),
            });
        }
        if !self.carrier.base_url.starts_with("http://")
            && !self.carrier.base_url.starts_with("https://")
        {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "carrier.base_url '{}' is not an http(s) URL",
                    self.carrier.base_url
                ),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::new();
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.version, 1);
        assert_eq!(parsed.tracking.interval_minutes, 30);
        assert_eq!(parsed.tracking.batch_size, 50);
        assert_eq!(parsed.tracking.call_timeout_ms, 10_000);
        assert_eq!(parsed.store.path, "orders.redb");
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let yaml = "version: 1\ntracking:\n  batch_size: 10\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.tracking.batch_size, 10);
        assert_eq!(cfg.tracking.interval_minutes, 30);
        assert_eq!(cfg.carrier.base_url, default_base_url());
    }

    #[test]
    fn load_missing_config_is_not_initialized() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = Config::load(dir.path()).unwrap_err();
        assert!(matches!(err, TrackError::NotInitialized));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut cfg = Config::new();
        cfg.tracking.interval_minutes = 5;
        cfg.save(dir.path()).unwrap();
        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.tracking.interval_minutes, 5);
    }

    #[test]
    fn validate_default_config_no_warnings() {
        assert!(Config::new().validate().is_empty());
    }

    #[test]
    fn validate_zero_interval_is_error() {
        let mut cfg = Config::new();
        cfg.tracking.interval_minutes = 0;
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("interval_minutes")));
    }

    #[test]
    fn validate_oversized_batch_is_warning() {
        let mut cfg = Config::new();
        cfg.tracking.batch_size = 1000;
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Warning && w.message.contains("batch_size=1000")));
    }

    #[test]
    fn validate_non_http_base_url_is_error() {
        let mut cfg = Config::new();
        cfg.carrier.base_url = "ftp://carrier.example".to_string();
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("base_url")));
    }

    #[test]
    fn interval_and_timeout_durations() {
        let cfg = TrackingConfig::default();
        assert_eq!(cfg.interval(), Duration::from_secs(30 * 60));
        assert_eq!(cfg.call_timeout(), Duration::from_millis(10_000));
    }
}
