//! trackd - combat initiative tracker daemon
//!
//! A game master's encounter tracker: roster management, initiative
//! rolling with hidden tie-breakers, turn cycling, and a template
//! inventory, behind a small HTTP API with SQLite persistence.

pub mod api;
pub mod db;
pub mod encounter;
pub mod images;
pub mod init;
pub mod store;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

use db::Database;
use store::InventoryStore;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub db_path: Option<String>,
    /// Quick-adjust hp deltas offered to clients
    pub hp_shortcuts: Vec<i32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".parse().expect("valid default address"),
            db_path: None, // None = in-memory
            hp_shortcuts: vec![-1, -5, -10, 1, 5],
        }
    }
}

impl Config {
    /// Load configuration: defaults, then a TOML file, then `TRACKD_`
    /// environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        figment = match path {
            Some(p) => figment.merge(Toml::file_exact(p)),
            None => figment.merge(Toml::file("trackd.toml")),
        };
        let config = figment.merge(Env::prefixed("TRACKD_")).extract()?;
        Ok(config)
    }
}

/// The trackd server instance
pub struct Server {
    config: Config,
    db: Arc<Database>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Server {
    /// Create a new server instance
    ///
    /// Opens (or creates) the database and installs the stock template
    /// catalog when it is empty.
    pub async fn new(config: Config) -> Result<Self> {
        let db = Database::new(config.db_path.as_deref()).await?;
        InventoryStore::new(db.pool().clone()).seed_defaults().await?;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            config,
            db: Arc::new(db),
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Get the database handle
    pub fn db(&self) -> Arc<Database> {
        self.db.clone()
    }

    /// Build the router
    async fn router(&self) -> Router {
        api::router(self.db.clone(), self.config.hp_shortcuts.clone()).await
    }

    /// Run the server until shutdown
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        let local_addr = listener.local_addr()?;
        info!("trackd listening on {}", local_addr);

        let router = self.router().await;
        let mut shutdown_rx = self.shutdown_rx.clone();

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown_rx.changed().await.ok();
            })
            .await?;

        info!("trackd shutdown complete");
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
