//! Prometheus data generator.
//!
//! Reads the metric document, starts one runner per metric and serves the
//! exposition on port 9000 until SIGINT/SIGTERM.

use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use pdg_server::{
    app_state::AppState,
    config::FileSource,
    engine::{exit_process, ReloadCoordinator},
    router,
    settings::Settings,
};

#[tokio::main]
async fn main() {
    let settings = Settings::from_env();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_level.as_filter()));
    fmt().with_env_filter(filter).init();

    if let Err(e) = run(settings).await {
        tracing::error!(error = %e, "pdg-server failed");
        std::process::exit(1);
    }
}

async fn run(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let source = Arc::new(FileSource::new(settings.config_path.clone()));
    let coordinator = Arc::new(ReloadCoordinator::start(source, exit_process()).await?);

    let app = router::build_router(AppState::new(Arc::clone(&coordinator)));

    tracing::info!(listen = %settings.listen, "pdg-server starting");
    let listener = tokio::net::TcpListener::bind(settings.listen).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    coordinator.shutdown().await;
    tracing::info!("runners stopped, bye");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
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
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
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
