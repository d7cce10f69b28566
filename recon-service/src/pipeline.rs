//! Reconciliation pipeline
//!
//! Pulls the current window snapshot from the staging store, runs the pure
//! core over it, and packages the classified records with run statistics.
//! The pipeline itself holds no state and touches no I/O beyond the store.

use crate::metrics::METRICS;
use recon_core::{
    ReconConfig, ReconSummary, Reconciler, ReconciliationRecord, RejectedFill, SideAggregator,
};
use recon_ingest::{StagingStore, Window};
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

/// Output of one reconciliation run
#[derive(Debug, Clone)]
pub struct ReconRun {
    /// Run ID
    pub run_id: Uuid,

    /// Window the run covered
    pub window: Window,

    /// Classified records, sorted by business key
    pub records: Vec<ReconciliationRecord>,

    /// Run statistics
    pub summary: ReconSummary,

    /// Fills the aggregator rejected, both sides
    pub rejected: Vec<RejectedFill>,
}

/// Run reconciliation over one window's staging snapshot
///
/// An empty snapshot is a valid (empty) run, not an error; a failed load
/// never reaches this point.
pub fn run_window(
    store: &StagingStore,
    config: &ReconConfig,
    window: Window,
    alert_threshold: Decimal,
) -> ReconRun {
    let clearing = store.clearing_for(window);
    let executions = store.executions_for(window);

    info!(
        "Reconciling window {}: {} clearing fills, {} executions",
        window,
        clearing.len(),
        executions.len()
    );

    let aggregator = SideAggregator::new(config.exchange_day_basis);
    let mut bank = aggregator.aggregate_clearing(&clearing);
    let mut exchange = aggregator.aggregate_executions(&executions);

    let reconciler = Reconciler::new();
    let records = reconciler.reconcile(&bank.summaries, &exchange.summaries);
    let summary = reconciler.summarize(&records, alert_threshold);

    METRICS.recon_runs.inc();
    for record in &records {
        METRICS
            .records_by_status
            .with_label_values(&[record.status.as_str()])
            .inc();
    }
    METRICS.critical_alerts.inc_by(summary.critical_alerts as u64);

    info!(
        "Reconciliation complete: {} keys, {} matched, {} critical",
        summary.total_keys, summary.matched, summary.critical_alerts
    );

    let mut rejected = std::mem::take(&mut bank.rejected);
    rejected.append(&mut exchange.rejected);

    ReconRun {
        run_id: Uuid::new_v4(),
        window,
        records,
        summary,
        rejected,
    }
}
