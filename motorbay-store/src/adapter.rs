//! Persistence adapter
//!
//! Bridges the store's in-memory collection and a durable slot. The adapter
//! is the only component that reads or writes the slot.

use crate::error::StoreError;
use crate::seed::SeedProvider;
use crate::slot::KeyValueSlot;
use motorbay_domain::Reservation;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Whole-collection persistence over a key-value slot
#[derive(Clone)]
pub struct PersistenceAdapter {
    slot: Arc<dyn KeyValueSlot>,
    seed: Arc<dyn SeedProvider>,
    key: String,
}

impl PersistenceAdapter {
    /// Slot key used when none is configured
    pub const DEFAULT_KEY: &'static str = "motorbay-reservations";

    /// Create an adapter over `slot`, seeding from `seed`
    pub fn new(slot: Arc<dyn KeyValueSlot>, seed: Arc<dyn SeedProvider>) -> Self {
        Self {
            slot,
            seed,
            key: Self::DEFAULT_KEY.to_string(),
        }
    }

    /// Use a different slot key
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Slot key this adapter reads and writes
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the persisted collection.
    ///
    /// An absent value, or one that is not a JSON array, is replaced by the
    /// seed set, which is written back before being returned. A stored array
    /// is never overwritten here: records that fail to decode are skipped with
    /// a warning and the rest are returned as-is.
    ///
    /// # Errors
    /// `StoreError::Unavailable` if the slot cannot be read, or the seed set
    /// cannot be written.
    pub fn load(&self) -> Result<Vec<Reservation>, StoreError> {
        let stored = match self.slot.get(&self.key)? {
            Some(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Array(records)) => Some(records),
                Ok(other) => {
                    warn!(
                        key = %self.key,
                        found = json_kind(&other),
                        "Persisted value is not an array, reseeding"
                    );
                    None
                },
                Err(e) => {
                    warn!(
                        key = %self.key,
                        error = %e,
                        "Persisted reservations unparsable, reseeding"
                    );
                    None
                },
            },
            None => {
                info!(key = %self.key, "No persisted reservations, seeding");
                None
            },
        };

        match stored {
            Some(records) => Ok(self.decode(records)),
            None => {
                let seeded = self.seed.seed();
                self.save(&seeded)?;
                info!(key = %self.key, count = seeded.len(), "Seeded reservations");
                Ok(seeded)
            },
        }
    }

    fn decode(&self, records: Vec<Value>) -> Vec<Reservation> {
        let total = records.len();
        let reservations: Vec<Reservation> = records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| {
                let id = record.get("id").and_then(Value::as_str).map(str::to_string);
                match serde_json::from_value(record) {
                    Ok(reservation) => Some(reservation),
                    Err(e) => {
                        warn!(
                            key = %self.key,
                            index,
                            id = ?id,
                            error = %e,
                            "Skipping undecodable reservation"
                        );
                        None
                    },
                }
            })
            .collect();

        debug!(
            key = %self.key,
            count = reservations.len(),
            skipped = total - reservations.len(),
            "Loaded reservations"
        );
        reservations
    }

    /// Serialize the full collection and overwrite the slot.
    pub fn save(&self, reservations: &[Reservation]) -> Result<(), StoreError> {
        let json = serde_json::to_string(reservations)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.slot.put(&self.key, &json)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
