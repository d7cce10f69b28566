//! Batch reconciliation runner
//!
//! One-shot pipeline over a pair of CSV exports:
//! ingest -> staging snapshot -> reconcile -> alerts (+ email) -> report.
//!
//! ```text
//! recon-run <clearing.csv> <executions.csv> [--from YYYY-MM-DD] [--to YYYY-MM-DD]
//!           [--report <path>] [--json]
//! ```
//!
//! Without an explicit window the run covers every business date observed in
//! the loaded fills.

use anyhow::Context;
use chrono::NaiveDate;
use recon_alerts::{send_email_alerts, AlertManager, EmailConfig, FileTransport, ReportFormat, ReportWriter};
use recon_ingest::{ClearingCsvReader, ExecutionCsvReader, StagingStore, Window};
use recon_service::{run_window, ServiceConfig};
use std::fs::File;
use std::path::PathBuf;
use tracing::info;

struct Args {
    clearing_path: PathBuf,
    executions_path: PathBuf,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    report_path: Option<PathBuf>,
    json: bool,
}

fn usage() -> ! {
    eprintln!(
        "Usage: recon-run <clearing.csv> <executions.csv> \
         [--from YYYY-MM-DD] [--to YYYY-MM-DD] [--report <path>] [--json]"
    );
    std::process::exit(2);
}

fn parse_args() -> anyhow::Result<Args> {
    let mut positional = Vec::new();
    let mut from = None;
    let mut to = None;
    let mut report_path = None;
    let mut json = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--from" => {
                let value = args.next().unwrap_or_else(|| usage());
                from = Some(value.parse().context("bad --from date")?);
            }
            "--to" => {
                let value = args.next().unwrap_or_else(|| usage());
                to = Some(value.parse().context("bad --to date")?);
            }
            "--report" => {
                let value = args.next().unwrap_or_else(|| usage());
                report_path = Some(PathBuf::from(value));
            }
            "--json" => json = true,
            "--help" | "-h" => usage(),
            _ if arg.starts_with("--") => usage(),
            _ => positional.push(PathBuf::from(arg)),
        }
    }

    if positional.len() != 2 {
        usage();
    }

    let mut positional = positional.into_iter();
    Ok(Args {
        clearing_path: positional.next().unwrap(),
        executions_path: positional.next().unwrap(),
        from,
        to,
        report_path,
        json,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = parse_args()?;
    let config = ServiceConfig::from_env()?;

    info!("Starting reconciliation run");

    // Ingest both sides; a failed load aborts the run, it never becomes an
    // empty reconciliation
    let clearing_reader = ClearingCsvReader::new(config.ingest.clone());
    let clearing_file = File::open(&args.clearing_path)
        .with_context(|| format!("cannot open {}", args.clearing_path.display()))?;
    let (clearing, clearing_report) = clearing_reader.read(clearing_file)?;
    info!(
        "Clearing: {} loaded, {} incomplete, {} malformed",
        clearing_report.loaded, clearing_report.incomplete, clearing_report.malformed
    );

    let execution_reader = ExecutionCsvReader::new(config.ingest.clone());
    let executions_file = File::open(&args.executions_path)
        .with_context(|| format!("cannot open {}", args.executions_path.display()))?;
    let (executions, execution_report) = execution_reader.read(executions_file)?;
    info!(
        "Executions: {} loaded, {} malformed",
        execution_report.loaded, execution_report.malformed
    );

    // Window: explicit bounds, or the span of business dates in the data
    let day_basis = config.recon.exchange_day_basis;
    let observed = clearing
        .iter()
        .map(|f| f.trade_date_local)
        .chain(executions.iter().map(|f| day_basis.business_date(f.trade_date_utc)));
    let (min_date, max_date) = match observed.fold(None, |acc: Option<(NaiveDate, NaiveDate)>, d| {
        Some(match acc {
            None => (d, d),
            Some((lo, hi)) => (lo.min(d), hi.max(d)),
        })
    }) {
        Some(bounds) => bounds,
        None => {
            info!("No fills loaded; nothing to reconcile");
            return Ok(());
        }
    };
    let window = Window::new(args.from.unwrap_or(min_date), args.to.unwrap_or(max_date))?;

    let store = StagingStore::new();
    store.replace_clearing(window, clearing);
    store.replace_executions(window, executions);

    let run = run_window(&store, &config.recon, window, config.alert_threshold);

    if !run.rejected.is_empty() {
        info!("{} fills rejected during aggregation", run.rejected.len());
    }

    // Alerts
    let alert_manager = AlertManager::new(config.alert_threshold);
    let critical = alert_manager.critical_alerts(&run.records);
    alert_manager.log_alerts(&critical);
    alert_manager.log_summary(&run.summary);

    // Email, when enabled
    let email_config = EmailConfig::from_env();
    if email_config.enabled {
        let transport = FileTransport::new(&email_config.outbox_dir)?;
        send_email_alerts(&email_config, &transport, &critical, &run.summary)?;
    }

    // Report
    let format = if args.json { ReportFormat::Json } else { ReportFormat::Csv };
    let writer = ReportWriter::new(&config.report_dir)?;
    let report_path = match args.report_path {
        Some(path) => {
            writer.write_to(&run.records, &path, format)?;
            path
        }
        None => writer.write(&run.records, &window.to_string(), format)?,
    };
    info!("Report written to {}", report_path.display());

    Ok(())
}
