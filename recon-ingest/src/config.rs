//! Configuration for the ingestion pipeline

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Time zone the bank's clearing exports report their trade dates in
    pub bank_timezone: Tz,

    /// Rows per processing chunk (progress logging granularity)
    pub chunk_size: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            bank_timezone: chrono_tz::Australia::Sydney,
            chunk_size: 1000,
        }
    }
}

impl IngestConfig {
    /// Load from a TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: IngestConfig = toml::from_str(&content)
            .map_err(|e| crate::IngestError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables
    ///
    /// `INGEST_BANK_TZ` takes an IANA zone name; `INGEST_CHUNK_SIZE` a row
    /// count.
    pub fn from_env() -> crate::Result<Self> {
        let mut config = IngestConfig::default();

        if let Ok(tz) = std::env::var("INGEST_BANK_TZ") {
            config.bank_timezone = tz
                .parse()
                .map_err(|_| crate::IngestError::Config(format!("unknown time zone '{}'", tz)))?;
        }

        if let Ok(size) = std::env::var("INGEST_CHUNK_SIZE") {
            config.chunk_size = size
                .parse()
                .map_err(|_| crate::IngestError::Config(format!("bad chunk size '{}'", size)))?;
        }

        Ok(config)
    }
}
