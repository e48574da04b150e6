//! Commit-time conflict detection
//!
//! First-committer-wins: a transaction fails validation when another writer
//! committed a change to a key it touched after its snapshot was taken.
//!
//! - Read set: the version observed must still be the current version
//! - Write set: the current version must equal the snapshot's version
//!
//! Version `0` stands for "absent", so a key that was created or deleted
//! concurrently is a conflict as well.
//!
//! Validation must run under the commit lock; otherwise the store can move
//! between the check and the apply.

use crate::transaction::TransactionContext;
use ledgerstore_core::Version;
use ledgerstore_storage::{OrderedStore, Snapshot};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::fmt;

/// A single detected conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictType {
    /// A key the transaction read was changed by another writer
    ReadWriteConflict {
        /// Conflicting key
        key: Vec<u8>,
        /// Version the transaction observed
        read_version: Version,
        /// Version in the store now
        current_version: Version,
    },

    /// A key the transaction wrote was changed by another writer
    WriteWriteConflict {
        /// Conflicting key
        key: Vec<u8>,
        /// Version in the transaction's snapshot
        snapshot_version: Version,
        /// Version in the store now
        current_version: Version,
    },
}

impl ConflictType {
    /// The key involved.
    pub fn key(&self) -> &[u8] {
        match self {
            ConflictType::ReadWriteConflict { key, .. }
            | ConflictType::WriteWriteConflict { key, .. } => key,
        }
    }
}

impl fmt::Display for ConflictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictType::ReadWriteConflict {
                key,
                read_version,
                current_version,
            } => write!(
                f,
                "read-write conflict on '{}' (read v{}, now v{})",
                String::from_utf8_lossy(key),
                read_version,
                current_version
            ),
            ConflictType::WriteWriteConflict {
                key,
                snapshot_version,
                current_version,
            } => write!(
                f,
                "write-write conflict on '{}' (snapshot v{}, now v{})",
                String::from_utf8_lossy(key),
                snapshot_version,
                current_version
            ),
        }
    }
}

/// Outcome of validating a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    /// Every conflict found, read set first
    pub conflicts: Vec<ConflictType>,
}

impl ValidationResult {
    /// A result with no conflicts.
    pub fn ok() -> Self {
        Self::default()
    }

    /// Check if the transaction may commit.
    pub fn is_valid(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Number of conflicts found.
    pub fn conflict_count(&self) -> usize {
        self.conflicts.len()
    }

    /// Append the conflicts of another result.
    pub fn merge(&mut self, other: ValidationResult) {
        self.conflicts.extend(other.conflicts);
    }

    /// One-line description of the conflicts, for error messages.
    pub fn describe(&self) -> String {
        self.conflicts
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Check every read against the current store.
pub fn validate_read_set(
    read_set: &FxHashMap<Vec<u8>, Version>,
    store: &OrderedStore,
) -> ValidationResult {
    let mut result = ValidationResult::ok();
    for (key, &read_version) in read_set {
        let current_version = store.version_of(key);
        if current_version != read_version {
            result.conflicts.push(ConflictType::ReadWriteConflict {
                key: key.clone(),
                read_version,
                current_version,
            });
        }
    }
    result
}

/// Check every buffered write against the current store.
pub fn validate_write_set(
    write_set: &BTreeMap<Vec<u8>, Option<Vec<u8>>>,
    snapshot: &Snapshot,
    store: &OrderedStore,
) -> ValidationResult {
    let mut result = ValidationResult::ok();
    for key in write_set.keys() {
        let snapshot_version = snapshot.version_of(key);
        let current_version = store.version_of(key);
        if current_version != snapshot_version {
            result.conflicts.push(ConflictType::WriteWriteConflict {
                key: key.clone(),
                snapshot_version,
                current_version,
            });
        }
    }
    result
}

/// Validate a transaction's read and write sets.
pub fn validate_transaction(txn: &TransactionContext, store: &OrderedStore) -> ValidationResult {
    let mut result = validate_read_set(txn.read_set(), store);
    result.merge(validate_write_set(txn.write_set(), txn.snapshot(), store));
    result
}
