//! promkit exporter
//!
//! Serves host and process metrics in the Prometheus text format.
//! Usage: `promkit-exporter [config.yaml]`

use tokio::sync::watch;
use tracing_subscriber::{fmt, EnvFilter};

use promkit_core::error::{MetricsError, Result};
use promkit_exporter::{app_state::AppState, config, router};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    if let Err(e) = run().await {
        tracing::error!(code = e.code().as_str(), error = %e, "promkit-exporter failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cfg = config::load_from_args(std::env::args())?;
    let listen = cfg.exporter.listen_addr()?;

    let state = AppState::new(cfg)?;
    let sampler = state.build_sampler()?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sampler_task = tokio::spawn(sampler.run(shutdown_rx));

    let app = router::build_router(state.clone());
    tracing::info!(%listen, "promkit-exporter starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| MetricsError::Config(format!("bind {listen} failed: {e}")))?;

    let draining = state.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            draining.set_draining();
            let _ = shutdown_tx.send(true);
        })
        .await
        .map_err(|e| MetricsError::Config(format!("server failed: {e}")))?;

    if let Err(e) = sampler_task.await {
        tracing::warn!(error = %e, "sampler task ended abnormally");
    }
    tracing::info!("promkit-exporter stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "ctrl-c handler unavailable");
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
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
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
