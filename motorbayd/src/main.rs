//! Motorbay Daemon
//!
//! HTTP service for vehicle-service reservations.
//!
//! # Usage
//!
//! ```bash
//! # Start with default configuration
//! cargo run -p motorbayd
//!
//! # Start with custom environment
//! MOTORBAY_ENV=test MOTORBAY_API_PORT=8081 cargo run -p motorbayd
//! ```
//!
//! # Environment Variables
//!
//! - `MOTORBAY_ENV`: Environment (test, development, production)
//! - `MOTORBAY_API_HOST`: API host (default: 0.0.0.0)
//! - `MOTORBAY_API_PORT`: API port (default: 8080)
//! - `MOTORBAY_DATA_DIR`: Slot directory (default: ./data)
//! - `MOTORBAY_STORAGE_KEY`: Slot key (default: motorbay-reservations)
//! - `MOTORBAY_SEED`: Seed for an empty slot (fixtures, empty)
//! - `MOTORBAY_CALENDAR_ZONE`: `local` or a UTC offset such as `+09:00`
//! - `MOTORBAY_PERSISTENCE_MODE`: best-effort or strict
//! - `MOTORBAY_MOCK_LATENCY_MS`: Artificial handler delay (default: 0)
//! - `MOTORBAY_LOGIN_EMAIL` / `MOTORBAY_LOGIN_PASSWORD`: Accepted login
//! - `MOTORBAY_LOG_FORMAT`: `json` for JSON log lines

use motorbayd::{Config, Daemon};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("motorbayd=info,motorbay_store=info"));
    let json = std::env::var("MOTORBAY_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::registry().with(fmt::layer().json()).with(filter).init();
    } else {
        tracing_subscriber::registry().with(fmt::layer()).with(filter).init();
    }

    // Load configuration
    let config = Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        api_host = %config.api.host,
        api_port = config.api.port,
        data_dir = %config.storage.data_dir.display(),
        zone = %config.storage.zone,
        "Motorbay Daemon"
    );

    // Create and run daemon
    let daemon = Daemon::new(config)?;
    daemon.run().await?;

    Ok(())
}
