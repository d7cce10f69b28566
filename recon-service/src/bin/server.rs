//! Reconciliation HTTP server
//!
//! Serves ingestion and reconciliation over HTTP. Configuration comes from
//! the environment (see [`ServiceConfig::from_env`]); a `.env` file is
//! honored for local runs.

use recon_ingest::StagingStore;
use recon_service::http::{router, AppState};
use recon_service::ServiceConfig;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = ServiceConfig::from_env()?;
    let listen_addr = config.listen_addr.clone();

    let state = AppState {
        store: Arc::new(StagingStore::new()),
        config,
    };

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;

    info!("recon-server listening on {}", listen_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
