//! Motorbay Daemon Library
//!
//! Serves the reservation store over HTTP for the service-desk dashboard.
//!
//! # Architecture
//!
//! ```text
//! Dashboard → API Server → ReservationStore → PersistenceAdapter → Slot (file | memory)
//! ```
//!
//! # Components
//!
//! - **Daemon**: builds the store from configuration and runs the API server
//! - **API**: HTTP endpoints with the `{success, data, message}` envelope
//! - **Config**: Environment-based configuration
//!
//! # Example
//!
//! ```rust,ignore
//! use motorbayd::{Config, Daemon};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::from_env().expect("Failed to load config");
//!     let daemon = Daemon::new(config).expect("Failed to open store");
//!     daemon.run().await.expect("Daemon error");
//! }
//! ```

#![warn(clippy::all)]

pub mod api;
pub mod config;
pub mod daemon;
pub mod error;

// Re-exports for convenience
pub use api::{create_router, ApiResponse, ApiState};
pub use config::{ApiConfig, AuthConfig, Config, Environment, SeedKind, StorageConfig};
pub use daemon::Daemon;
pub use error::{DaemonError, DaemonResult};
