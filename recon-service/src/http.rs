//! HTTP serving layer
//!
//! Thin axum front over the staging store and the pure core. Uploads replace
//! a window's snapshot; reads run reconciliation over the current snapshot.
//! Nothing here owns reconciliation semantics; the handlers translate
//! between HTTP and the core's types.

use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::metrics::METRICS;
use crate::pipeline::run_window;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use recon_core::{ReconStatus, ReconSummary, ReconciliationRecord, RejectedFill};
use recon_ingest::{
    ClearingCsvReader, ExecutionCsvReader, IngestReport, StagingStore, Window,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    /// Staging store snapshots
    pub store: Arc<StagingStore>,
    /// Service configuration
    pub config: ServiceConfig,
}

/// Build the service router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .route("/api/v1/ingest/clearing", post(ingest_clearing))
        .route("/api/v1/ingest/executions", post(ingest_executions))
        .route("/api/v1/reconciliation", get(get_reconciliation))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct WindowParams {
    from: NaiveDate,
    to: NaiveDate,
}

impl WindowParams {
    fn window(&self) -> ServiceResult<Window> {
        Ok(Window::new(self.from, self.to)?)
    }
}

#[derive(Debug, Deserialize)]
struct ReconParams {
    from: NaiveDate,
    to: NaiveDate,
    status: Option<String>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    clearing_fills: usize,
    execution_fills: usize,
}

#[derive(Debug, Serialize)]
struct ReconciliationResponse {
    run_id: uuid::Uuid,
    window: Window,
    summary: ReconSummary,
    records: Vec<ReconciliationRecord>,
    rejected: Vec<RejectedFill>,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "recon-service",
        version: env!("CARGO_PKG_VERSION"),
        clearing_fills: state.store.clearing_count(),
        execution_fills: state.store.execution_count(),
    })
}

async fn metrics_handler() -> ServiceResult<String> {
    METRICS
        .export()
        .map_err(|e| ServiceError::Internal(format!("Failed to export metrics: {}", e)))
}

async fn ingest_clearing(
    State(state): State<AppState>,
    Query(params): Query<WindowParams>,
    body: String,
) -> ServiceResult<Json<IngestReport>> {
    let window = params.window()?;

    let reader = ClearingCsvReader::new(state.config.ingest.clone());
    let (fills, report) = reader.read(body.as_bytes())?;

    METRICS
        .rows_ingested
        .with_label_values(&["bank"])
        .inc_by(report.loaded as u64);
    state.store.replace_clearing(window, fills);

    Ok(Json(report))
}

async fn ingest_executions(
    State(state): State<AppState>,
    Query(params): Query<WindowParams>,
    body: String,
) -> ServiceResult<Json<IngestReport>> {
    let window = params.window()?;

    let reader = ExecutionCsvReader::new(state.config.ingest.clone());
    let (fills, report) = reader.read(body.as_bytes())?;

    METRICS
        .rows_ingested
        .with_label_values(&["exchange"])
        .inc_by(report.loaded as u64);
    state.store.replace_executions(window, fills);

    Ok(Json(report))
}

async fn get_reconciliation(
    State(state): State<AppState>,
    Query(params): Query<ReconParams>,
) -> ServiceResult<Json<ReconciliationResponse>> {
    let window = Window::new(params.from, params.to)?;

    let status_filter = params
        .status
        .as_deref()
        .map(|s| {
            ReconStatus::parse(s)
                .ok_or_else(|| ServiceError::BadRequest(format!("unknown status '{}'", s)))
        })
        .transpose()?;

    let run = run_window(
        &state.store,
        &state.config.recon,
        window,
        state.config.alert_threshold,
    );

    let records = match status_filter {
        Some(status) => run
            .records
            .into_iter()
            .filter(|r| r.status == status)
            .collect(),
        None => run.records,
    };

    Ok(Json(ReconciliationResponse {
        run_id: run.run_id,
        window: run.window,
        summary: run.summary,
        records,
        rejected: run.rejected,
    }))
}
