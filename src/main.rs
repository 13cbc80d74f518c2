//! Quake-Grade - Seismic Severity Classification Service
//!
//! Loads the base earthquake dataset and the trained severity model, then
//! serves the assessment page and JSON API.
//!
//! # Usage
//!
//! ```bash
//! # Run with the bundled dataset and model
//! cargo run --release
//!
//! # Custom assets and JSON logs
//! ./quake-grade --dataset data/quakes.csv --model model/severity_model.json --log-json
//! ```
//!
//! # Environment Variables
//!
//! - `OPENAI_API_KEY`: LLM credential (name configurable); insights are disabled without it
//! - `QUAKE_CONFIG`: Path to a TOML config file (default: `./quake_grade.toml`)
//! - `QUAKE_SERVER_ADDR`: Bind address override
//! - `QUAKE_CORS_ORIGINS`: Comma-separated allowed CORS origins
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use quake_grade::{create_app, AppConfig, AppContext, InsightService};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "quake-grade")]
#[command(about = "Quake-Grade Seismic Severity Classification Service")]
#[command(version)]
struct CliArgs {
    /// Override the server address (default: "0.0.0.0:8080")
    #[arg(short, long, env = "QUAKE_SERVER_ADDR")]
    addr: Option<String>,

    /// TOML config file (takes precedence over QUAKE_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base dataset CSV (overrides config)
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Severity model artifact (overrides config)
    #[arg(long)]
    model: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = CliArgs::parse();
    init_tracing(args.log_json);

    let config = match &args.config {
        Some(path) => AppConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AppConfig::load(),
    };
    let server_addr = args.addr.clone().unwrap_or_else(|| config.server.addr.clone());

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("  Quake-Grade - Seismic Severity Classification");
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let insights = InsightService::from_config(&config.llm);
    let ctx = AppContext::load(config, args.dataset.as_deref(), args.model.as_deref(), insights)
        .context("Startup failed")?;
    let app = create_app(Arc::new(ctx));

    let listener = tokio::net::TcpListener::bind(&server_addr)
        .await
        .with_context(|| format!("Failed to bind {server_addr}"))?;
    info!("🌐 Listening on http://{}", server_addr);

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("🛑 Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancel_token.cancelled().await;
        })
        .await;

    if let Err(e) = result {
        error!("HTTP server error: {}", e);
        return Err(anyhow::anyhow!("HTTP server error: {}", e));
    }

    info!("✓ Quake-Grade shutdown complete");
    Ok(())
}
