//! Error types for the engine layers
//!
//! Every engine-side crate (storage, durability, concurrency, engine) reports
//! failures through this type. The public API crate converts it into the
//! user-facing error kinds.

use thiserror::Error;

/// Engine-level errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Underlying I/O failure (file scheme)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A WAL payload could not be serialized or deserialized
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// On-disk data failed validation
    #[error("corruption: {0}")]
    Corruption(String),

    /// A WAL frame ends before its declared length
    #[error("incomplete entry at offset {offset}: need {needed} bytes, have {have}")]
    IncompleteEntry {
        /// Offset of the frame in the log
        offset: u64,
        /// Bytes available from the offset
        have: usize,
        /// Bytes the frame header announced
        needed: usize,
    },

    /// Optimistic validation failed at commit time
    #[error("transaction conflict: {0}")]
    TransactionConflict(String),

    /// The transaction was already committed or discarded
    #[error("transaction not active ({0})")]
    TransactionNotActive(String),

    /// The store directory is held by another open engine
    #[error("store is locked: {0}")]
    Locked(String),

    /// The engine has been closed
    #[error("engine is closed")]
    Closed,

    /// Configuration could not be parsed or is inconsistent
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is a commit-time conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::TransactionConflict(_))
    }

    /// Check if this error indicates damaged on-disk state.
    pub fn is_corruption(&self) -> bool {
        matches!(self, Error::Corruption(_) | Error::IncompleteEntry { .. })
    }
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Error::SerializationError(e.to_string())
    }
}
