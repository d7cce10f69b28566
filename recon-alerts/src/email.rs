//! Email alerting for reconciliation discrepancies
//!
//! Renders clean, minimal notification emails (plain text plus HTML) from the
//! critical alert set and the run summary. Delivery goes through the
//! [`AlertTransport`] trait; the shipped [`FileTransport`] drops RFC
//! 5322-style `.eml` files into an outbox directory for a relay to pick up,
//! and tests substitute an in-memory transport.
//!
//! Configuration via environment variables:
//! - `EMAIL_ENABLED`: `true` to enable, `false` to disable (default)
//! - `EMAIL_FROM`: sender address
//! - `EMAIL_TO`: comma-separated recipient addresses
//! - `EMAIL_OUTBOX_DIR`: where the file transport writes messages

use crate::error::{AlertError, Result};
use chrono::Utc;
use recon_core::{ReconSummary, ReconciliationRecord};
use std::path::PathBuf;
use tracing::{info, warn};

/// Email alerting configuration
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// Master switch; off by default
    pub enabled: bool,

    /// Sender address
    pub from: String,

    /// Recipient addresses
    pub to: Vec<String>,

    /// Outbox directory for the file transport
    pub outbox_dir: PathBuf,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            from: "reconciliation@company.com".to_string(),
            to: Vec::new(),
            outbox_dir: PathBuf::from("./data/outbox"),
        }
    }
}

impl EmailConfig {
    /// Load from environment variables
    ///
    /// Enabling without recipients disables alerts again, loudly.
    pub fn from_env() -> Self {
        let mut config = EmailConfig::default();

        config.enabled = std::env::var("EMAIL_ENABLED")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        if let Ok(from) = std::env::var("EMAIL_FROM") {
            config.from = from;
        }

        if let Ok(to) = std::env::var("EMAIL_TO") {
            config.to = to
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }

        if let Ok(dir) = std::env::var("EMAIL_OUTBOX_DIR") {
            config.outbox_dir = PathBuf::from(dir);
        }

        if config.enabled && config.to.is_empty() {
            warn!("EMAIL_ENABLED=true but EMAIL_TO is not set. Disabling email alerts.");
            config.enabled = false;
        }

        config
    }
}

/// A rendered alert email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// Sender address
    pub from: String,
    /// Recipient addresses
    pub to: Vec<String>,
    /// Subject line
    pub subject: String,
    /// Plain-text body (fallback)
    pub text_body: String,
    /// HTML body
    pub html_body: String,
}

/// Delivery mechanism for rendered alert emails
pub trait AlertTransport {
    /// Deliver one message
    fn deliver(&self, message: &EmailMessage) -> Result<()>;
}

/// Transport that writes `.eml` files into an outbox directory
#[derive(Debug, Clone)]
pub struct FileTransport {
    outbox_dir: PathBuf,
}

impl FileTransport {
    /// Create the transport, creating the outbox directory if needed
    pub fn new(outbox_dir: impl Into<PathBuf>) -> Result<Self> {
        let outbox_dir = outbox_dir.into();
        std::fs::create_dir_all(&outbox_dir)?;
        Ok(Self { outbox_dir })
    }
}

impl AlertTransport for FileTransport {
    fn deliver(&self, message: &EmailMessage) -> Result<()> {
        let filename = format!(
            "reconciliation_alert_{}.eml",
            Utc::now().format("%Y%m%d_%H%M%S")
        );
        let path = self.outbox_dir.join(filename);

        let mut content = String::new();
        content.push_str(&format!("From: {}\r\n", message.from));
        content.push_str(&format!("To: {}\r\n", message.to.join(", ")));
        content.push_str(&format!("Subject: {}\r\n", message.subject));
        content.push_str("MIME-Version: 1.0\r\n");
        content.push_str("Content-Type: multipart/alternative; boundary=\"recon-alert\"\r\n");
        content.push_str("\r\n--recon-alert\r\n");
        content.push_str("Content-Type: text/plain; charset=UTF-8\r\n\r\n");
        content.push_str(&message.text_body);
        content.push_str("\r\n--recon-alert\r\n");
        content.push_str("Content-Type: text/html; charset=UTF-8\r\n\r\n");
        content.push_str(&message.html_body);
        content.push_str("\r\n--recon-alert--\r\n");

        std::fs::write(&path, content)?;
        info!("Alert email written to {}", path.display());
        Ok(())
    }
}

/// Render the alert email for a run
pub fn render_alert_email(
    config: &EmailConfig,
    alerts: &[&ReconciliationRecord],
    summary: &ReconSummary,
) -> EmailMessage {
    let issues = alerts.len();
    let subject = format!(
        "Reconciliation Alert: {} issue{} found (${})",
        issues,
        if issues == 1 { "" } else { "s" },
        summary.total_discrepancy_amount
    );

    EmailMessage {
        from: config.from.clone(),
        to: config.to.clone(),
        subject,
        text_body: render_text_body(alerts, summary),
        html_body: render_html_body(alerts, summary),
    }
}

fn render_text_body(alerts: &[&ReconciliationRecord], summary: &ReconSummary) -> String {
    let mut text = String::new();

    text.push_str("RECONCILIATION ALERT\n");
    text.push_str(&format!("{}\n", Utc::now().format("%B %d, %Y at %H:%M")));
    text.push_str(&format!("{}\n\n", "=".repeat(70)));

    text.push_str("SUMMARY\n");
    text.push_str(&format!("Total Keys:          {}\n", summary.total_keys));
    text.push_str(&format!("Alerts Found:        {}\n", summary.critical_alerts));
    text.push_str(&format!(
        "Total Discrepancy:   ${}\n\n",
        summary.total_discrepancy_amount
    ));

    text.push_str("DETAILS\n");
    text.push_str(&format!("{}\n", "-".repeat(70)));
    for record in alerts {
        text.push_str(&format!(
            "{} | {} | {} {}\n",
            record.key.product, record.key.counterparty, record.key.trade_date, record.key.direction
        ));
        text.push_str(&format!(
            "Status: {:<20} Bank: ${:<12} Exchange: ${:<12} Diff: ${}\n",
            record.status.as_str(),
            record.bank_value,
            record.exchange_value,
            record.value_diff.abs()
        ));
        text.push_str(&format!("{}\n", "-".repeat(70)));
    }

    text.push_str("\n---\nAutomated Reconciliation Pipeline\n");
    text
}

fn render_html_body(alerts: &[&ReconciliationRecord], summary: &ReconSummary) -> String {
    let mut rows = String::new();
    for record in alerts {
        rows.push_str(&format!(
            "<tr>\
             <td style=\"padding: 8px; font-weight: 500;\">{}</td>\
             <td style=\"padding: 8px;\">{}</td>\
             <td style=\"padding: 8px;\">{}</td>\
             <td style=\"padding: 8px; text-align: right;\">${}</td>\
             <td style=\"padding: 8px; text-align: right;\">${}</td>\
             <td style=\"padding: 8px; text-align: right; font-weight: 600; color: #dc2626;\">${}</td>\
             </tr>\n",
            record.key.product,
            record.key.counterparty,
            record.status,
            record.bank_value,
            record.exchange_value,
            record.value_diff.abs()
        ));
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<body style=\"font-family: sans-serif; color: #1f2937;\">\n\
         <h1 style=\"font-size: 20px;\">Reconciliation Alert</h1>\n\
         <p>{}</p>\n\
         <table style=\"border-collapse: collapse; font-size: 14px;\">\n\
         <tr><td style=\"padding: 4px 12px 4px 0;\">Total Keys</td><td style=\"font-weight: 600;\">{}</td></tr>\n\
         <tr><td style=\"padding: 4px 12px 4px 0;\">Alerts Found</td><td style=\"font-weight: 600;\">{}</td></tr>\n\
         <tr><td style=\"padding: 4px 12px 4px 0;\">Total Discrepancy</td><td style=\"font-weight: 700; color: #dc2626;\">${}</td></tr>\n\
         </table>\n\
         <h2 style=\"font-size: 16px;\">Details</h2>\n\
         <table style=\"width: 100%; border-collapse: collapse; font-size: 14px;\">\n\
         <thead><tr style=\"border-bottom: 2px solid #e5e7eb; color: #6b7280;\">\
         <th style=\"padding: 8px; text-align: left;\">Contract</th>\
         <th style=\"padding: 8px; text-align: left;\">Counterparty</th>\
         <th style=\"padding: 8px; text-align: left;\">Status</th>\
         <th style=\"padding: 8px; text-align: right;\">Bank</th>\
         <th style=\"padding: 8px; text-align: right;\">Exchange</th>\
         <th style=\"padding: 8px; text-align: right;\">Diff</th>\
         </tr></thead>\n<tbody>\n{}</tbody>\n</table>\n\
         <p style=\"font-size: 12px; color: #6b7280;\">Automated Reconciliation Pipeline</p>\n\
         </body>\n</html>\n",
        Utc::now().format("%B %d, %Y at %H:%M"),
        summary.total_keys,
        summary.critical_alerts,
        summary.total_discrepancy_amount,
        rows
    )
}

/// Render and deliver the alert email for a run
///
/// Returns `Ok(false)` without delivering when alerts are disabled or there
/// is nothing to send (original behavior: silence is success).
pub fn send_email_alerts(
    config: &EmailConfig,
    transport: &dyn AlertTransport,
    alerts: &[&ReconciliationRecord],
    summary: &ReconSummary,
) -> Result<bool> {
    if !config.enabled {
        info!("Email alerts disabled (EMAIL_ENABLED=false)");
        return Ok(false);
    }

    if alerts.is_empty() {
        info!("No alerts to send via email");
        return Ok(false);
    }

    if config.to.is_empty() {
        return Err(AlertError::Config("no recipients configured".to_string()));
    }

    let message = render_alert_email(config, alerts, summary);
    transport.deliver(&message)?;
    info!("Email sent successfully to {}", message.to.join(", "));
    Ok(true)
}
