//! Durable key-value slot (port) and its in-memory implementation
//!
//! A slot holds string values under string keys. It is the only medium the
//! persistence adapter talks to; file and memory backends plug in here.

use crate::error::StoreError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

/// Generic key-value persistence interface.
///
/// All methods take `&self`; implementations use interior mutability.
pub trait KeyValueSlot: Send + Sync {
    /// Retrieve a value by key. `Ok(None)` if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Insert or overwrite a value.
    fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a value. `Ok(())` even if the key did not exist.
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

// =============================================================================
// Memory Slot
// =============================================================================

/// In-memory slot for tests and ephemeral sessions.
///
/// Can be switched off to behave like disabled storage, and can carry a byte
/// quota to behave like a full one.
pub struct MemorySlot {
    values: RwLock<HashMap<String, String>>,
    available: AtomicBool,
    quota_bytes: Option<usize>,
}

impl MemorySlot {
    /// Create a new empty, available slot
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
            quota_bytes: None,
        }
    }

    /// Create a slot that fails every operation
    pub fn unavailable() -> Self {
        let slot = Self::new();
        slot.set_available(false);
        slot
    }

    /// Limit the total size of stored values
    pub fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota_bytes = Some(quota_bytes);
        self
    }

    /// Switch the medium on or off
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Pre-populate a key, bypassing availability checks (test setup)
    pub fn preload(&self, key: &str, value: &str) {
        if let Ok(mut values) = self.values.write() {
            values.insert(key.to_string(), value.to_string());
        }
    }

    /// Get the number of stored keys
    pub fn key_count(&self) -> usize {
        self.values.read().map(|values| values.len()).unwrap_or(0)
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::unavailable("memory slot is disabled"))
        }
    }
}

impl Default for MemorySlot {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueSlot for MemorySlot {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.ensure_available()?;
        let values = self
            .values
            .read()
            .map_err(|_| StoreError::unavailable("memory slot lock poisoned"))?;
        Ok(values.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.ensure_available()?;
        let mut values = self
            .values
            .write()
            .map_err(|_| StoreError::unavailable("memory slot lock poisoned"))?;

        if let Some(quota) = self.quota_bytes {
            let others: usize = values
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(StoreError::unavailable(format!(
                    "quota exceeded: {} of {} bytes",
                    needed, quota
                )));
            }
        }

        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.ensure_available()?;
        let mut values = self
            .values
            .write()
            .map_err(|_| StoreError::unavailable("memory slot lock poisoned"))?;
        values.remove(key);
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
