//! Prometheus metrics

use once_cell::sync::Lazy;
use prometheus::{
    register_int_counter_vec_with_registry, register_int_counter_with_registry, Encoder,
    IntCounter, IntCounterVec, Registry, TextEncoder,
};

/// Global metrics handle
pub static METRICS: Lazy<Metrics> = Lazy::new(Metrics::new);

/// Service metrics
pub struct Metrics {
    registry: Registry,

    /// Fills ingested, by side
    pub rows_ingested: IntCounterVec,

    /// Reconciliation runs executed
    pub recon_runs: IntCounter,

    /// Reconciliation records produced, by status
    pub records_by_status: IntCounterVec,

    /// Critical alerts raised
    pub critical_alerts: IntCounter,
}

impl Metrics {
    fn new() -> Self {
        let registry = Registry::new();

        let rows_ingested = register_int_counter_vec_with_registry!(
            "recon_rows_ingested_total",
            "Fills ingested into the staging store",
            &["side"],
            registry
        )
        .unwrap();

        let recon_runs = register_int_counter_with_registry!(
            "recon_runs_total",
            "Reconciliation runs executed",
            registry
        )
        .unwrap();

        let records_by_status = register_int_counter_vec_with_registry!(
            "recon_records_total",
            "Reconciliation records produced",
            &["status"],
            registry
        )
        .unwrap();

        let critical_alerts = register_int_counter_with_registry!(
            "recon_critical_alerts_total",
            "Critical alerts raised",
            registry
        )
        .unwrap();

        Self {
            registry,
            rows_ingested,
            recon_runs,
            records_by_status,
            critical_alerts,
        }
    }

    /// Export in Prometheus text exposition format
    pub fn export(&self) -> prometheus::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
