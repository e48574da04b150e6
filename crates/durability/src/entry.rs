//! WAL entry types
//!
//! Every state-changing engine write is persisted as exactly one entry:
//! - Batch: a direct put, delete, or write batch on the root engine
//! - Commit: the write set of a committed transaction
//!
//! One entry per write is what makes batches and transactions atomic across
//! a crash: replay applies an entry completely or not at all.

use ledgerstore_core::{Mutation, Version};
use serde::{Deserialize, Serialize};

/// A single WAL record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalEntry {
    /// Direct write on the root engine
    Batch {
        /// Version assigned to every mutation in the entry
        version: Version,
        /// Mutations, applied in order
        mutations: Vec<Mutation>,
    },

    /// Committed transaction
    Commit {
        /// Engine-local transaction identifier
        txn_id: u64,
        /// Version assigned to every mutation in the entry
        version: Version,
        /// The transaction's write set
        mutations: Vec<Mutation>,
    },
}

impl WalEntry {
    /// Version stamped on the entry.
    pub fn version(&self) -> Version {
        match self {
            WalEntry::Batch { version, .. } | WalEntry::Commit { version, .. } => *version,
        }
    }

    /// Mutations carried by the entry.
    pub fn mutations(&self) -> &[Mutation] {
        match self {
            WalEntry::Batch { mutations, .. } | WalEntry::Commit { mutations, .. } => mutations,
        }
    }

    /// Transaction ID, for commit entries.
    pub fn txn_id(&self) -> Option<u64> {
        match self {
            WalEntry::Commit { txn_id, .. } => Some(*txn_id),
            WalEntry::Batch { .. } => None,
        }
    }

    /// Check if the entry records a transaction commit.
    pub fn is_commit(&self) -> bool {
        matches!(self, WalEntry::Commit { .. })
    }
}
