//! Motorbay Storage Layer
//!
//! Reservation state for a session, persisted to a durable key-value slot.
//!
//! # Architecture
//!
//! - **Repository trait**: the reservation storage interface (port)
//! - **Reservation store**: in-memory collection, the single authority during a session
//! - **Persistence adapter**: whole-collection load/save, seeding an empty slot
//! - **Slots**: `MemorySlot` for tests, `FileSlot` for a data directory
//!
//! # Usage
//!
//! ```rust
//! use motorbay_store::{
//!     FixtureSeed, MemorySlot, PersistenceAdapter, ReservationRepository, ReservationStore,
//!     StoreOptions,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let adapter = PersistenceAdapter::new(Arc::new(MemorySlot::new()), Arc::new(FixtureSeed));
//!     let store = ReservationStore::open(adapter, StoreOptions::default());
//!
//!     let all = store.list().await.unwrap();
//!     println!("Reservations: {}", all.len());
//! }
//! ```

#![warn(clippy::all)]

// Modules
mod adapter;
mod error;
mod file;
mod repository;
mod seed;
mod slot;
mod store;

// Re-exports
pub use adapter::PersistenceAdapter;
pub use error::StoreError;
pub use file::FileSlot;
pub use repository::{ReservationFilter, ReservationRepository};
pub use seed::{EmptySeed, FixtureSeed, SeedProvider, StaticSeed};
pub use slot::{KeyValueSlot, MemorySlot};
pub use store::{PersistenceHealth, PersistenceMode, ReservationStore, StoreOptions};
