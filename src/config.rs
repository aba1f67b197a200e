//! Configuration file handling.
//!
//! This module handles loading `.aidash.toml` and merging it with
//! command-line arguments and environment variables.

use crate::gateway::GeminiConfig;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".aidash.toml";

/// Secondary environment variable for the API key.
const FALLBACK_API_KEY_ENV: &str = "GOOGLE_AI_API_KEY";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Generative model settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted request body (image uploads), in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024 // 10MB
}

/// Gemini API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,

    /// API key. Prefer the GEMINI_API_KEY environment variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key: None,
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_timeout() -> u64 {
    60
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments (and the environment variables clap reads for them)
    /// take precedence over config file settings.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref host) = args.host {
            self.server.host = host.clone();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }

        if let Some(ref model) = args.model {
            self.gateway.model = model.clone();
        }
        if let Some(ref url) = args.gemini_url {
            self.gateway.base_url = url.clone();
        }
        if let Some(ref key) = args.api_key {
            self.gateway.api_key = Some(key.clone());
        }
        if let Some(timeout) = args.timeout {
            self.gateway.timeout_seconds = timeout;
        }
    }

    /// Fill the API key from the secondary environment variable when
    /// neither the CLI, GEMINI_API_KEY nor the file supplied one.
    pub fn apply_env_fallback<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let has_key = self
            .gateway
            .api_key
            .as_deref()
            .is_some_and(|k| !k.is_empty());

        if !has_key {
            self.gateway.api_key = lookup(FALLBACK_API_KEY_ENV).filter(|k| !k.is_empty());
        }
    }

    /// Reject values the merged configuration cannot run with.
    ///
    /// CLI flags are checked by `Args::validate`; this covers values that
    /// came from the config file.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            bail!("server.port must be between 1 and 65535");
        }
        if self.server.max_upload_bytes == 0 {
            bail!("server.max_upload_bytes must be at least 1");
        }

        let url = &self.gateway.base_url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            bail!("gateway.base_url must start with 'http://' or 'https://'");
        }
        if self.gateway.timeout_seconds == 0 {
            bail!("gateway.timeout_seconds must be at least 1");
        }

        Ok(())
    }

    /// Client settings for the Gemini gateway.
    pub fn gemini_config(&self) -> GeminiConfig {
        GeminiConfig {
            base_url: self.gateway.base_url.clone(),
            api_key: self.gateway.api_key.clone(),
            model: self.gateway.model.clone(),
            timeout_seconds: self.gateway.timeout_seconds,
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
