//! Service configuration

use recon_alerts::manager::DEFAULT_ALERT_THRESHOLD;
use recon_core::ReconConfig;
use recon_ingest::IngestConfig;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// HTTP listen address
    pub listen_addr: String,

    /// Critical-alert threshold (absolute value difference)
    pub alert_threshold: Decimal,

    /// Directory for report exports
    pub report_dir: PathBuf,

    /// Ingestion settings
    pub ingest: IngestConfig,

    /// Core reconciliation settings
    pub recon: ReconConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
            report_dir: PathBuf::from("./data/reports"),
            ingest: IngestConfig::default(),
            recon: ReconConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Load from a TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ServiceConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load defaults with environment overrides
    ///
    /// `RECON_LISTEN_ADDR`, `ALERT_THRESHOLD`, `RECON_REPORT_DIR`, plus the
    /// ingest and core overrides those crates read themselves.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = ServiceConfig::default();

        if let Ok(addr) = std::env::var("RECON_LISTEN_ADDR") {
            config.listen_addr = addr;
        }

        if let Ok(threshold) = std::env::var("ALERT_THRESHOLD") {
            config.alert_threshold = threshold
                .parse()
                .map_err(|_| anyhow::anyhow!("bad ALERT_THRESHOLD '{}'", threshold))?;
        }

        if let Ok(dir) = std::env::var("RECON_REPORT_DIR") {
            config.report_dir = PathBuf::from(dir);
        }

        config.ingest = IngestConfig::from_env()?;
        config.recon = ReconConfig::from_env()?;

        Ok(config)
    }
}
