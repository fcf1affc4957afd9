//! MiningPoolHub exporter
//!
//! - `GET /metrics?apikey=...&fiat=EUR` scrapes pool balances + prices
//! - `GET /` usage page, `GET /healthz` liveness
//! - Logging via `RUST_LOG` (default `info`)

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use miningpoolhub_core::error::{ExporterError, Result};
use miningpoolhub_exporter::{app_state::AppState, config, router};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = config::Args::parse();
    let cfg = config::load(&args)?;
    let listen = cfg.web.listen_addrs()?;
    let metrics_path = cfg.web.telemetry_path.clone();

    let state = AppState::new(cfg)?;
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&listen[..])
        .await
        .map_err(|e| ExporterError::Internal(format!("bind {} failed: {e}", join_addrs(&listen))))?;
    let local = listener
        .local_addr()
        .map_err(|e| ExporterError::Internal(format!("local_addr failed: {e}")))?;
    tracing::info!(listen = %local, %metrics_path, "miningpoolhub-exporter starting");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ExporterError::Internal(format!("server failed: {e}")))?;

    Ok(())
}

fn join_addrs(addrs: &[std::net::SocketAddr]) -> String {
    addrs.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, starting graceful shutdown");
}
