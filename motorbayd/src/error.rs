//! Daemon error types.

use motorbay_domain::DomainError;
use motorbay_store::StoreError;
use thiserror::Error;

/// Daemon-level errors.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Validation error at the request boundary
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Reservation not found
    #[error("Reservation not found: {0}")]
    ReservationNotFound(String),

    /// Malformed request body or query
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Login credentials did not match
    #[error("Invalid email or password")]
    Unauthorized,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Server I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for daemon operations.
pub type DaemonResult<T> = Result<T, DaemonError>;
