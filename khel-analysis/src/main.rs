//! khel-analysis - Fitness test analysis service
//!
//! Accepts exercise recordings over HTTP, analyzes them session by session
//! and reports scores back to the submissions backend.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

use khel_analysis::config::{CliOverrides, ServiceConfig};
use khel_analysis::media::LandmarkTrackBackend;
use khel_analysis::{build_router, AppState};
use khel_common::api::auth::auth_enabled;
use khel_common::config::{load_config, CONFIG_ENV_VAR};

/// Command-line arguments for khel-analysis
///
/// Service values also resolve from `KHEL_*` environment variables inside
/// `ServiceConfig::resolve`, below the command line and above the TOML file.
#[derive(Parser, Debug)]
#[command(name = "khel-analysis")]
#[command(about = "Fitness test analysis service")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(short, long, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// Bind address
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Shared secret for the x-internal-api-secret header
    #[arg(long)]
    shared_secret: Option<String>,

    /// Endpoint receiving score callbacks
    #[arg(long)]
    callback_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is loaded before tracing so its log level can seed the filter
    let toml = load_config(args.config.as_deref()).context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&toml.logging.level)),
        )
        .init();

    // Build identification first, before anything that can fail slowly
    info!(
        "Starting Khel Analysis (khel-analysis) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let cli = CliOverrides {
        host: args.host,
        port: args.port,
        shared_secret: args.shared_secret,
        callback_url: args.callback_url,
    };
    let config = ServiceConfig::resolve(&toml, &cli).context("Invalid configuration")?;

    if auth_enabled(&config.shared_secret) {
        info!("✓ Shared-secret authentication enabled");
    } else {
        warn!("API authentication disabled (shared_secret is empty)");
    }
    match &config.callback_url {
        Some(url) => info!("Score callbacks go to {}", url),
        None => warn!("No callback URL configured; submissions will not report scores"),
    }
    match config.session_timeout {
        Some(limit) => info!("Session watchdog: {} s", limit.as_secs()),
        None => info!("Session watchdog disabled"),
    }

    let address = config.bind_address();
    let state = AppState::new(config, Arc::new(LandmarkTrackBackend))
        .context("Failed to initialize callback client")?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind to {}", address))?;
    info!("khel-analysis listening on http://{}", address);
    info!("Health check: http://{}/health", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
