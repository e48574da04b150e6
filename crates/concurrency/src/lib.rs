//! Concurrency layer for ledgerstore
//!
//! This crate implements optimistic concurrency control (OCC) with:
//! - TransactionContext: snapshot plus read/write set tracking
//! - Conflict detection at commit time (first-committer-wins)
//! - TransactionManager: the single serialized write path shared by direct
//!   writes and transaction commits

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod manager;
pub mod transaction;
pub mod validation;

pub use manager::TransactionManager;
pub use transaction::{TransactionContext, TransactionStatus};
pub use validation::{
    validate_read_set, validate_transaction, validate_write_set, ConflictType, ValidationResult,
};
