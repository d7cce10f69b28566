//! Configuration for the reconciliation core

use crate::keys::DayBasis;
use serde::{Deserialize, Serialize};

/// Reconciliation core configuration
///
/// Matching tolerances are deliberately not configurable (see
/// [`crate::reconcile`]); the one policy knob the core exposes is how
/// exchange timestamps are assigned to business days.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconConfig {
    /// Day-assignment policy for exchange execution timestamps
    #[serde(default)]
    pub exchange_day_basis: DayBasis,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            exchange_day_basis: DayBasis::Utc,
        }
    }
}

impl ReconConfig {
    /// Load from a TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ReconConfig = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables
    ///
    /// `RECON_EXCHANGE_DAY_BASIS` accepts `utc` or an IANA zone name.
    pub fn from_env() -> crate::Result<Self> {
        let mut config = ReconConfig::default();

        if let Ok(basis) = std::env::var("RECON_EXCHANGE_DAY_BASIS") {
            config.exchange_day_basis = DayBasis::parse(&basis)?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_utc_truncation() {
        assert_eq!(ReconConfig::default().exchange_day_basis, DayBasis::Utc);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ReconConfig {
            exchange_day_basis: DayBasis::Zone(chrono_tz::Australia::Sydney),
        };
        let encoded = toml::to_string(&config).unwrap();
        let decoded: ReconConfig = toml::from_str(&encoded).unwrap();
        assert_eq!(decoded.exchange_day_basis, config.exchange_day_basis);
    }
}
