//! ssm-server - Student score manager HTTP service
//!
//! Serves student/score CRUD and bulk CSV import over a single in-memory store.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use ssm_common::config::TomlConfig;
use ssm_common::StudentStore;
use ssm_server::{build_router, AppState};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for ssm-server
#[derive(Parser, Debug)]
#[command(name = "ssm-server")]
#[command(about = "Student score manager HTTP service")]
#[command(version)]
struct Args {
    /// Path to TOML config file
    #[arg(short, long, env = "SSM_CONFIG")]
    config: Option<PathBuf>,

    /// Interface to bind to (overrides config file)
    #[arg(long, env = "SSM_HOST")]
    host: Option<String>,

    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "SSM_PORT")]
    port: Option<u16>,

    /// Number of bulk import workers (overrides config file)
    #[arg(long, env = "SSM_IMPORT_WORKERS")]
    import_workers: Option<usize>,

    /// Log level when RUST_LOG is unset (overrides config file)
    #[arg(long, env = "SSM_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Args {
    fn apply_to(&self, config: &mut TomlConfig) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(workers) = self.import_workers {
            config.import.workers = workers;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config loading logs through a scoped subscriber; the global one depends on its result
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("info"))
        .finish();
    let mut config = tracing::subscriber::with_default(bootstrap, || {
        TomlConfig::load(args.config.as_deref())
    })
    .context("Failed to load configuration")?;
    args.apply_to(&mut config);
    config.validate().context("Invalid configuration")?;

    let level = &config.logging.level;
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "ssm_server={0},ssm_common={0},tower_http={0}",
                level
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting ssm-server v{} (import workers: {})",
        env!("CARGO_PKG_VERSION"),
        config.import.workers
    );

    let store = Arc::new(StudentStore::new());
    let state = AppState::new(store, config.import);
    let shutdown = state.shutdown.clone();
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            shutdown.cancel();
        })
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
