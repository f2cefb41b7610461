//! HTTP server for the cosign coordination service.
//!
//! Exposes the proposal store over a small JSON API so signers can publish
//! proposals, attach signatures and record execution.

pub mod error;
pub mod health;
pub mod rest;

pub use error::{ApiError, ApiResult};
pub use rest::create_router;

use axum::Router;
use cosign_store::{ProposalStore, StoreLimits};
use cosign_telemetry::MetricsRegistry;
use cosign_types::Config;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    /// Bind error
    #[error("failed to bind to address: {0}")]
    Bind(String),

    /// Serve error
    #[error("server error: {0}")]
    Serve(String),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for server operations
pub type Result<T> = std::result::Result<T, ServerError>;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    pub store: Arc<ProposalStore>,
    pub config: Arc<Config>,
    pub metrics: Arc<MetricsRegistry>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let store = ProposalStore::new(StoreLimits::from(&config.store));
        Self {
            store: Arc::new(store),
            config: Arc::new(config),
            metrics: cosign_telemetry::registry(),
        }
    }
}

/// HTTP server for the Coordination API
pub struct Server {
    address: SocketAddr,
    state: Arc<AppState>,
}

impl Server {
    /// Create a new server. Fails if the configured listen address is invalid.
    pub fn new(config: Config) -> Result<Self> {
        let address = config
            .listen_address()
            .map_err(|e| ServerError::Config(e.to_string()))?;
        Ok(Self {
            address,
            state: Arc::new(AppState::new(config)),
        })
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    pub fn state(&self) -> Arc<AppState> {
        self.state.clone()
    }

    /// Build the router
    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    /// Bind the configured address and serve until Ctrl-C
    pub async fn start(&self) -> Result<()> {
        let listener = TcpListener::bind(&self.address)
            .await
            .map_err(|e| ServerError::Bind(format!("{}: {e}", self.address)))?;

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let address = listener
            .local_addr()
            .map_err(|e| ServerError::Bind(e.to_string()))?;
        let config = &self.state.config.server;

        info!(
            %address,
            admin_reset = config.enable_admin_reset,
            metrics = config.enable_metrics,
            "Coordination API listening"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Serve(e.to_string()))?;

        info!("Coordination API stopped");
        Ok(())
    }
}

/// Resolves on Ctrl-C
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
