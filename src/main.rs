//! aidash - backend for an AI content dashboard
//!
//! An HTTP service that proxies chat, image analysis and content
//! generation to Google Gemini, keeps projects and chat history in
//! memory, and reports usage analytics.
//!
//! Exit codes:
//!   0 - Clean shutdown
//!   1 - Startup or runtime error (bad arguments, config, bind failure)

mod analysis;
mod cli;
mod config;
mod gateway;
mod models;
mod server;
mod store;

use anyhow::{Context, Result};
use cli::Args;
use config::{Config, DEFAULT_CONFIG_FILE};
use gateway::GeminiGateway;
use server::AppState;
use std::sync::Arc;
use store::MemStorage;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args)?;

    info!("aidash v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args).await {
        error!("Server failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .aidash.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Set GEMINI_API_KEY in the environment rather than in the file.");
    Ok(())
}

/// Initialize logging based on verbosity settings. RUST_LOG overrides them.
fn init_logging(args: &Args) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(args.log_level()).into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Build the store and gateway, then serve until shutdown.
async fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.apply_env_fallback(|name| std::env::var(name).ok());
    config.validate().context("Invalid configuration")?;

    if config.gateway.api_key.is_none() {
        warn!("No Gemini API key configured; AI requests will fail until GEMINI_API_KEY is set");
    }

    println!("🤖 Gemini model: {}", config.gateway.model);
    println!("   Timeout: {}s", config.gateway.timeout_seconds);

    let gateway =
        GeminiGateway::new(config.gemini_config()).context("Failed to create Gemini client")?;
    let state = AppState::new(store::shared(MemStorage::new()), Arc::new(gateway));

    server::serve(&config.server, state).await
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
