//! Durability mode for WAL operations.
//!
//! Defines when appended WAL records are fsynced to disk.

use serde::{Deserialize, Serialize};

/// Durability mode for WAL writes.
///
/// Only meaningful for the `file` scheme; the `memory` scheme has no WAL.
///
/// # Mode Comparison
///
/// | Mode | fsync | Data Loss Window |
/// |------|-------|------------------|
/// | NoSync | never (OS decides) | unbounded on power loss |
/// | Batched | every N records or T ms | bounded |
/// | Strict | every record | zero |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurabilityMode {
    /// Records are written to the file but never explicitly fsynced.
    NoSync,

    /// fsync after every record.
    Strict,

    /// fsync every `batch_size` records OR once `interval_ms` has elapsed
    /// since the previous fsync, checked on each append.
    Batched {
        /// Maximum time between fsyncs in milliseconds
        interval_ms: u64,
        /// Maximum records between fsyncs
        batch_size: usize,
    },
}

impl DurabilityMode {
    /// Check if this mode requires fsync on every append.
    pub fn requires_immediate_fsync(&self) -> bool {
        matches!(self, DurabilityMode::Strict)
    }

    /// Human-readable description of the mode.
    pub fn description(&self) -> &'static str {
        match self {
            DurabilityMode::NoSync => "No fsync (fastest, OS-buffered)",
            DurabilityMode::Strict => "Sync fsync (safest, slowest)",
            DurabilityMode::Batched { .. } => "Batched fsync (balanced speed/safety)",
        }
    }

    /// Create a batched mode with recommended defaults.
    ///
    /// Returns `Batched { interval_ms: 100, batch_size: 1000 }`.
    pub fn buffered_default() -> Self {
        DurabilityMode::Batched {
            interval_ms: 100,
            batch_size: 1000,
        }
    }
}

impl Default for DurabilityMode {
    fn default() -> Self {
        Self::buffered_default()
    }
}
