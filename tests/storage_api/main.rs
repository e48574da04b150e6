//! Storage API Test Suite
//!
//! End-to-end tests of `StorageHandle` against the bundled engine.
//!
//! ## Key Verification Points
//!
//! 1. Existence semantics of new/set/remove and their batch forms
//! 2. Batches write everything or nothing
//! 3. Transactions are isolated until commit and end exactly once
//! 4. Iteration order, prefix filtering and cursor release
//! 5. The file scheme survives close/reopen and torn WAL tails
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test storage_api
//!
//! # Transaction tests only
//! cargo test --test storage_api transactions::
//! ```

use ledgerstore::{Config, StorageHandle};
use std::path::Path;

// Test modules
mod basic_ops;
mod batch_ops;
mod iteration;
mod properties;
mod transactions;

// =============================================================================
// SHARED TEST UTILITIES
// =============================================================================

/// Install a fmt subscriber once so engine logs show up with `--nocapture`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Open an in-memory store
pub fn memory_storage() -> StorageHandle {
    init_tracing();
    StorageHandle::open(&Config::memory()).expect("Failed to open in-memory storage")
}

/// Open a file-backed store with strict durability
pub fn file_storage(dir: &Path) -> StorageHandle {
    init_tracing();
    StorageHandle::open(&Config::file(dir).strict()).expect("Failed to open file storage")
}

/// Collect the keys yielded by an iteration, as strings
pub fn collect_keys(storage: &StorageHandle, prefix: &str, reverse: bool) -> Vec<String> {
    storage
        .iter(prefix, reverse)
        .expect("Failed to open iterator")
        .map(|item| item.key_str().into_owned())
        .collect()
}
