//! PhysioPulse server
//!
//! # Usage
//!
//! ```bash
//! # Run with ./pulse.toml (or built-in defaults)
//! cargo run --release
//!
//! # Keep everything in memory
//! cargo run --release -- --memory
//! ```
//!
//! # Environment Variables
//!
//! - `PULSE_CONFIG`: Path to the TOML config file
//! - `PULSE_SERVER_ADDR`: Override the HTTP bind address
//! - `GEMINI_API_KEY`: Generative text service key (fallback feedback when unset)
//! - `RUST_LOG`: Logging level (default: info)
//! - `RESET_DB`: Set to "true" to wipe the database on startup

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use physio_pulse::api::{create_app, ApiState};
use physio_pulse::auth::StaticTokenProvider;
use physio_pulse::llm::LlmFactory;
use physio_pulse::storage::{InMemoryStore, SledStore, Store};
use physio_pulse::{ExerciseService, PulseConfig};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "physio-pulse")]
#[command(about = "PhysioPulse exercise-session telemetry and coaching service")]
#[command(version)]
struct CliArgs {
    /// Path to a TOML config file (overrides PULSE_CONFIG and ./pulse.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the server address (default: "0.0.0.0:8080")
    #[arg(short, long)]
    addr: Option<String>,

    /// Keep all sessions in memory; nothing survives a restart
    #[arg(long)]
    memory: bool,

    /// Wipe the database on startup.
    /// Can also be set via RESET_DB=true environment variable.
    #[arg(long)]
    reset_db: bool,
}

// ============================================================================
// Database Reset
// ============================================================================

/// Check if database reset is requested via CLI flag or environment variable.
fn should_reset_db(cli_flag: bool) -> bool {
    if cli_flag {
        return true;
    }
    if let Ok(val) = std::env::var("RESET_DB") {
        let val_lower = val.to_lowercase();
        return val_lower == "true" || val_lower == "1" || val_lower == "yes";
    }
    false
}

fn reset_database(path: &Path) -> Result<()> {
    if !path.exists() {
        info!(path = %path.display(), "Database does not exist, nothing to reset");
        return Ok(());
    }
    warn!(path = %path.display(), "RESET_DB set, wiping persistent data");
    std::fs::remove_dir_all(path)
        .with_context(|| format!("Failed to remove database at {}", path.display()))
}

// ============================================================================
// Startup
// ============================================================================

fn load_config(args: &CliArgs) -> Result<PulseConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let mut config = PulseConfig::load_from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            config.apply_env_overrides();
            config
        }
        None => PulseConfig::load(),
    };

    if let Some(addr) = &args.addr {
        config.server.addr = addr.clone();
    }
    if args.memory {
        config.storage.in_memory = true;
    }
    Ok(config)
}

fn open_store(config: &PulseConfig, reset: bool) -> Result<Arc<dyn Store>> {
    if config.storage.in_memory {
        info!("Using in-memory store");
        return Ok(Arc::new(InMemoryStore::new()));
    }

    let path = Path::new(&config.storage.path);
    if reset {
        reset_database(path)?;
    }
    let store = SledStore::open(path)
        .with_context(|| format!("Failed to open database at {}", path.display()))?;
    info!(path = %path.display(), "Opened sled store");
    Ok(Arc::new(store))
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();
    let config = load_config(&args)?;

    let store = open_store(&config, should_reset_db(args.reset_db))?;
    let backend = LlmFactory::create(&config.llm)?;
    info!(backend = backend.backend_name(), "Feedback backend ready");

    let identity = StaticTokenProvider::new(&config.auth.tokens);
    if identity.is_empty() {
        warn!("No auth tokens configured; every authenticated request will be rejected");
    }

    let service = Arc::new(ExerciseService::from_config(&config, store, backend));
    let state = ApiState::new(service, Arc::new(identity));
    let app = create_app(state, &config.server.cors_origins);

    let listener = tokio::net::TcpListener::bind(&config.server.addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.server.addr))?;
    info!(addr = %config.server.addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Received Ctrl+C, shutting down");
        })
        .await
        .context("HTTP server error")?;

    info!("PhysioPulse shutdown complete");
    Ok(())
}
