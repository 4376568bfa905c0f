//! gallery - placeholder photo gallery daemon
//!
//! Mounts one image feed at startup, fetches its photo records concurrently
//! and serves the rendered view over HTTP.

pub mod api;
pub mod config;
pub mod feed;
pub mod photos;
pub mod view;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

pub use config::{Config, ConfigError};
use feed::ImageFeed;
use photos::PhotoClient;

/// The gallery server instance
pub struct Server {
    config: Config,
    feed: Arc<ImageFeed>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Server {
    /// Create a new server instance and mount its feed.
    ///
    /// Must be called inside a tokio runtime; the fetch starts immediately.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let client = PhotoClient::new(&config)?;
        let feed = ImageFeed::mount(client, config.endpoints.clone());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            config,
            feed: Arc::new(feed),
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Get the feed handle
    pub fn feed(&self) -> Arc<ImageFeed> {
        self.feed.clone()
    }

    /// Build the router
    fn router(&self) -> Router {
        api::router(self.feed.clone())
    }

    /// Run the server until shutdown
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        let local_addr = listener.local_addr()?;
        info!("gallery listening on {}", local_addr);

        let router = self.router();
        let mut shutdown_rx = self.shutdown_rx.clone();

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown_rx.changed().await.ok();
            })
            .await?;

        self.feed.unmount();
        info!("gallery shutdown complete");
        Ok(())
    }

    /// Signal the server to shutdown
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Get the configured bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }
}
