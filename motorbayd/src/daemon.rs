//! Daemon: Main runtime orchestrator.
//!
//! The Daemon ties together:
//! - Reservation store (session state plus durable slot)
//! - API Server (HTTP endpoints)
//!
//! # Lifecycle
//!
//! 1. Load configuration
//! 2. Build slot, seed and adapter, then open the store
//! 3. Start API server
//! 4. Wait for SIGINT
//! 5. Graceful shutdown

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info, warn};

use motorbay_store::{
    EmptySeed, FileSlot, FixtureSeed, KeyValueSlot, MemorySlot, PersistenceAdapter,
    ReservationStore, SeedProvider, StoreOptions,
};

use crate::api::{create_router, ApiState};
use crate::config::{Config, Environment, SeedKind};
use crate::error::{DaemonError, DaemonResult};

// =============================================================================
// Daemon
// =============================================================================

/// The main Motorbay daemon.
pub struct Daemon {
    /// Configuration
    config: Config,
    /// Reservation store shared with every handler
    store: Arc<ReservationStore>,
}

impl Daemon {
    /// Create a daemon from configuration.
    ///
    /// The test environment keeps reservations in memory; every other
    /// environment uses a file slot under `storage.data_dir`.
    ///
    /// # Errors
    /// Fails if the data directory cannot be created.
    pub fn new(config: Config) -> DaemonResult<Self> {
        let slot: Arc<dyn KeyValueSlot> = match config.environment {
            Environment::Test => Arc::new(MemorySlot::new()),
            Environment::Development | Environment::Production => {
                Arc::new(FileSlot::new(&config.storage.data_dir).map_err(|e| {
                    DaemonError::Config(format!(
                        "Failed to prepare data directory {}: {}",
                        config.storage.data_dir.display(),
                        e
                    ))
                })?)
            },
        };

        Ok(Self::with_slot(config, slot))
    }

    /// Create a daemon over an explicit slot.
    pub fn with_slot(config: Config, slot: Arc<dyn KeyValueSlot>) -> Self {
        let seed: Arc<dyn SeedProvider> = match config.storage.seed {
            SeedKind::Fixtures => Arc::new(FixtureSeed),
            SeedKind::Empty => Arc::new(EmptySeed),
        };

        let adapter = PersistenceAdapter::new(slot, seed).with_key(config.storage.key.clone());
        let options = StoreOptions {
            zone: config.storage.zone,
            mode: config.storage.mode,
        };
        let store = Arc::new(ReservationStore::open(adapter, options));

        Self { config, store }
    }

    /// Shared reservation store.
    pub fn store(&self) -> Arc<ReservationStore> {
        self.store.clone()
    }

    /// Build the HTTP router over this daemon's store.
    pub fn router(&self) -> axum::Router {
        create_router(Arc::new(ApiState {
            store: self.store.clone(),
            auth: self.config.auth.clone(),
            mock_latency: self.config.mock_latency,
        }))
    }

    /// Run the daemon.
    ///
    /// This method blocks until shutdown is requested (SIGINT).
    pub async fn run(self) -> DaemonResult<()> {
        info!(
            version = env!("CARGO_PKG_VERSION"),
            environment = %self.config.environment,
            reservations = self.store.len().await,
            "Starting Motorbay daemon"
        );

        let health = self.store.persistence_health().await;
        if !health.is_healthy() {
            warn!(?health, "Starting with degraded persistence");
        }

        let api_addr = self.start_api_server().await?;
        info!(%api_addr, "API server started");

        tokio::signal::ctrl_c().await?;
        info!("Received shutdown signal");

        self.shutdown().await;
        Ok(())
    }

    /// Start the API server.
    async fn start_api_server(&self) -> DaemonResult<SocketAddr> {
        let router = self.router();
        let addr = format!("{}:{}", self.config.api.host, self.config.api.port);

        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            DaemonError::Config(format!("Failed to bind to {}: {}", addr, e))
        })?;

        let local_addr = listener.local_addr().map_err(|e| {
            DaemonError::Config(format!("Failed to get local address: {}", e))
        })?;

        // Spawn the server task
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                error!(error = %e, "API server error");
            }
        });

        Ok(local_addr)
    }

    /// Graceful shutdown. Every mutation is already written through, so
    /// this only reports the final state.
    async fn shutdown(&self) {
        info!(
            reservations = self.store.len().await,
            persistence = ?self.store.persistence_health().await,
            "Shutting down"
        );
    }
}

// =============================================================================
// Tests
// =============================================================================
