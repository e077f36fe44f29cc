mod api;
mod middleware;
mod sweeper;

use std::sync::Arc;

use compscan_core::TtlCache;
use compscan_pipeline::Scanner;
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, build_cors, AppState};
use crate::sweeper::{spawn_cache_sweeper, CACHE_SWEEP_INTERVAL};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = compscan_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(env = %config.env, bind_addr = %config.bind_addr, "starting compscan server");

    let cache = Arc::new(TtlCache::new());
    let scanner = Arc::new(Scanner::from_config(&config, Arc::clone(&cache))?);
    let sweeper = spawn_cache_sweeper(cache, CACHE_SWEEP_INTERVAL);

    let app = build_app(AppState { scanner }, build_cors(&config.cors_origin)?);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
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
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
