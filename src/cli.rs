//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation. Unset options fall back to the config file.

use clap::Parser;
use std::path::PathBuf;

/// aidash - backend for an AI content dashboard
///
/// Serves the dashboard API: projects, Gemini-powered chat, image analysis
/// and content generation, plus usage analytics. All data is kept in memory.
///
/// Examples:
///   aidash
///   aidash --port 8080 --model gemini-2.5-flash
///   GEMINI_API_KEY=... aidash --host 0.0.0.0
///   aidash --init-config
#[derive(Parser, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Interface to bind
    #[arg(long, value_name = "HOST", env = "AIDASH_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, value_name = "PORT", env = "AIDASH_PORT")]
    pub port: Option<u16>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .aidash.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Gemini model to use
    #[arg(short, long, env = "AIDASH_MODEL")]
    pub model: Option<String>,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Gemini API base URL
    #[arg(long, value_name = "URL")]
    pub gemini_url: Option<String>,

    /// Request timeout for Gemini calls in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .aidash.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

// Debug output must not include the API key.
impl std::fmt::Debug for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Args")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("config", &self.config)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("gemini_url", &self.gemini_url)
            .field("timeout", &self.timeout)
            .field("verbose", &self.verbose)
            .field("quiet", &self.quiet)
            .field("init_config", &self.init_config)
            .finish()
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.port == Some(0) {
            return Err("Port must be between 1 and 65535".to_string());
        }

        if let Some(ref url) = self.gemini_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Gemini URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
