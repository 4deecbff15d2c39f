//! sentiment-api - Review sentiment analysis service
//!
//! Loads the vectorizer and classifier artifacts once at startup, then serves
//! the sentiment endpoints. Startup aborts if either artifact fails to load.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use sentiment_api::{build_router, cors_layer, AppState};
use sentiment_core::config::{resolve_config_path, ConfigOverrides, ServiceConfig};
use sentiment_core::SentimentPipeline;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for sentiment-api
#[derive(Parser, Debug)]
#[command(name = "sentiment-api")]
#[command(about = "Review sentiment analysis service")]
#[command(version)]
struct Args {
    /// Path to TOML configuration file (also SENTIMENT_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "SENTIMENT_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "SENTIMENT_PORT")]
    port: Option<u16>,

    /// Vectorizer artifact path
    #[arg(long, env = "SENTIMENT_VECTORIZER_PATH")]
    vectorizer: Option<PathBuf>,

    /// Classifier artifact path
    #[arg(long, env = "SENTIMENT_MODEL_PATH")]
    model: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, env = "SENTIMENT_LOG_LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before tracing so the file can set the log level
    let config_path = resolve_config_path(args.config.as_deref());
    let mut config = ServiceConfig::load(args.config.as_deref())?;
    config.apply_overrides(ConfigOverrides {
        host: args.host,
        port: args.port,
        vectorizer_path: args.vectorizer,
        model_path: args.model,
        log_level: args.log_level,
    });

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting sentiment-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match config_path.filter(|path| path.is_file()) {
        Some(path) => info!("Configuration file: {}", path.display()),
        None => warn!("No configuration file found, using built-in defaults"),
    }

    config.validate()?;
    info!("Vectorizer: {}", config.artifacts.vectorizer_path.display());
    info!("Model: {}", config.artifacts.model_path.display());

    let pipeline = match SentimentPipeline::from_config(&config) {
        Ok(pipeline) => {
            info!("✓ Sentiment pipeline loaded");
            pipeline
        }
        Err(e) => {
            error!("Failed to load sentiment pipeline: {}", e);
            return Err(e.into());
        }
    };

    let state = AppState::new(Arc::new(pipeline), config.limits)
        .with_parallel_batch(config.analysis.parallel_batch);
    let app = build_router(state).layer(cors_layer(&config.server.cors_origins)?);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("sentiment-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

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
            error!("Failed to listen for Ctrl+C: {}", e);
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
