//! Test helpers for Motorbay store- and daemon-level tests.
//!
//! Provides draft builders, pre-wired stores over memory slots, and fixed
//! calendar zones so day filtering does not depend on the host timezone.

mod helpers;

pub use helpers::{
    draft, kim_draft, memory_store, read_slot, seoul, store_with, utc, TestStore,
};

/// Result alias for helpers that can fail during setup
pub type Result<T> = anyhow::Result<T>;
