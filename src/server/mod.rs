//! HTTP API.
//!
//! Handlers translate requests into store and gateway calls. The store
//! and gateway are injected through [`AppState`].

pub mod error;
pub mod routes;

pub use error::ApiError;
pub use routes::router;

use crate::config::ServerConfig;
use crate::gateway::SharedGateway;
use crate::store::SharedStorage;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStorage,
    pub gateway: SharedGateway,
    /// Serializes chat exchanges and history clears.
    chat_lock: Arc<Mutex<()>>,
    /// Largest accepted image, in bytes. Set by [`router`].
    upload_limit: usize,
}

impl AppState {
    pub fn new(store: SharedStorage, gateway: SharedGateway) -> Self {
        Self {
            store,
            gateway,
            chat_lock: Arc::new(Mutex::new(())),
            upload_limit: usize::MAX,
        }
    }

    fn with_upload_limit(mut self, upload_limit: usize) -> Self {
        self.upload_limit = upload_limit;
        self
    }
}

/// Bind and serve until Ctrl-C.
pub async fn serve(config: &ServerConfig, state: AppState) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    let local = listener.local_addr().context("Failed to read local address")?;
    info!("Listening on http://{}", local);
    println!("🚀 aidash listening on http://{}", local);

    axum::serve(listener, router(state, config.max_upload_bytes))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
