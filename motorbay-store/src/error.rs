//! Storage layer errors

use thiserror::Error;

/// Errors that can occur in the storage layer
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity not found
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        /// Type of entity (reservation)
        entity_type: String,
        /// Entity ID
        id: String,
    },

    /// Durable medium could not be read or written
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Collection could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Slot key is not usable by the backing medium
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

impl StoreError {
    /// Create a not found error
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// Create an unavailable error
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }

    /// True for a missing entity
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// True when the durable medium is at fault rather than the request
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::InvalidKey(_))
    }
}
