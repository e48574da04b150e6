//! Public error type for ledgerstore.
//!
//! Engine crates report `ledgerstore_core::Error`; this module maps those
//! onto the kinds callers act on and wraps everything else as
//! [`Error::Engine`].

use ledgerstore_core::Error as CoreError;
use thiserror::Error;

/// All storage errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Key is absent
    #[error("key not found: {0}")]
    NotFound(String),

    /// Key is already present
    #[error("key already exists: {0}")]
    AlreadyExists(String),

    /// Batch operation called with no items
    #[error("batch is empty")]
    EmptyBatch,

    /// `open_transaction` called on a transaction handle
    #[error("transactions cannot be nested")]
    NoNestedTransaction,

    /// `commit` or `discard` called on a root handle
    #[error("handle is not a transaction")]
    NotATransaction,

    /// Another writer changed a key this transaction touched
    #[error("commit conflict: {0}")]
    CommitConflict(String),

    /// Stored bytes do not match the requested type
    #[error("failed to decode value of '{key}': {message}")]
    Decode {
        /// Key whose value failed to decode
        key: String,
        /// Decoder message
        message: String,
    },

    /// Value could not be encoded
    #[error("failed to encode value of '{key}': {message}")]
    Encode {
        /// Key whose value failed to encode
        key: String,
        /// Encoder message
        message: String,
    },

    /// Transaction already committed or discarded
    #[error("transaction already committed or discarded")]
    TransactionClosed,

    /// Storage was closed
    #[error("storage is closed")]
    Closed,

    /// Configuration is invalid
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Failure inside the engine (I/O, corruption, ...)
    #[error("engine error: {0}")]
    Engine(#[source] CoreError),
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Check if this is an already-exists error.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Error::AlreadyExists(_))
    }

    /// Check if this is a commit conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::CommitConflict(_))
    }

    /// Check if this error is retryable.
    ///
    /// A conflicting transaction may succeed when re-run from a fresh
    /// snapshot. Nothing is retried internally.
    pub fn is_retryable(&self) -> bool {
        self.is_conflict()
    }

    /// Check if the storage was closed.
    pub fn is_closed(&self) -> bool {
        matches!(self, Error::Closed)
    }
}

impl From<CoreError> for Error {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::TransactionConflict(msg) => Error::CommitConflict(msg),
            CoreError::TransactionNotActive(_) => Error::TransactionClosed,
            CoreError::Closed => Error::Closed,
            CoreError::InvalidConfig(msg) => Error::Config(msg),
            other => Error::Engine(other),
        }
    }
}
