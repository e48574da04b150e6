//! Transaction context for optimistic concurrency control
//!
//! A transaction reads from the snapshot taken when it began and buffers its
//! writes privately. Reads of keys the transaction has not written are
//! recorded in the read set together with the version observed, so that
//! commit can detect writers that changed them in the meantime.
//!
//! ## Read-your-writes
//!
//! - `get`/`has` consult the write set first
//! - a buffered delete hides the snapshot value
//! - `merged_view` overlays the write set on a snapshot range for cursors
//!
//! Range reads are not recorded in the read set: a concurrent insert into a
//! scanned range does not conflict (no phantom protection).

use ledgerstore_core::{Error, KeyRange, Mutation, Result, Version, WriteBatch};
use ledgerstore_storage::{Snapshot, Table, VersionedValue};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Lifecycle state of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Accepting reads and writes
    Active,
    /// Write set applied
    Committed,
    /// Discarded or failed validation
    Aborted {
        /// Why the transaction ended
        reason: String,
    },
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Active => write!(f, "active"),
            TransactionStatus::Committed => write!(f, "committed"),
            TransactionStatus::Aborted { reason } => write!(f, "aborted ({})", reason),
        }
    }
}

/// Per-transaction state: snapshot, read set and buffered writes.
#[derive(Debug)]
pub struct TransactionContext {
    /// Engine-local identifier, recorded in the commit entry
    pub txn_id: u64,
    snapshot: Snapshot,
    read_set: FxHashMap<Vec<u8>, Version>,
    write_set: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
    status: TransactionStatus,
}

impl TransactionContext {
    /// Begin a transaction over `snapshot`.
    pub fn new(txn_id: u64, snapshot: Snapshot) -> Self {
        TransactionContext {
            txn_id,
            snapshot,
            read_set: FxHashMap::default(),
            write_set: BTreeMap::new(),
            status: TransactionStatus::Active,
        }
    }

    /// Snapshot the transaction reads from.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Store version at the time the transaction began.
    pub fn start_version(&self) -> Version {
        self.snapshot.version()
    }

    /// Current lifecycle state.
    pub fn status(&self) -> &TransactionStatus {
        &self.status
    }

    /// Check if the transaction still accepts operations.
    pub fn is_active(&self) -> bool {
        self.status == TransactionStatus::Active
    }

    /// Fail with `TransactionNotActive` unless the transaction is active.
    pub fn ensure_active(&self) -> Result<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(Error::TransactionNotActive(format!(
                "transaction {} is {}",
                self.txn_id, self.status
            )))
        }
    }

    /// Read a key, preferring buffered writes over the snapshot.
    pub fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.ensure_active()?;

        if let Some(buffered) = self.write_set.get(key) {
            return Ok(buffered.clone());
        }

        let found = self.snapshot.get(key);
        self.read_set
            .entry(key.to_vec())
            .or_insert_with(|| found.map(|v| v.version).unwrap_or(0));
        Ok(found.map(|v| v.value.clone()))
    }

    /// Check if a key is visible to this transaction.
    pub fn has(&mut self, key: &[u8]) -> Result<bool> {
        self.ensure_active()?;

        if let Some(buffered) = self.write_set.get(key) {
            return Ok(buffered.is_some());
        }

        let version = self.snapshot.version_of(key);
        self.read_set.entry(key.to_vec()).or_insert(version);
        Ok(version != 0)
    }

    /// Buffer a put.
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.ensure_active()?;
        self.write_set.insert(key.to_vec(), Some(value.to_vec()));
        Ok(())
    }

    /// Buffer a delete.
    pub fn delete(&mut self, key: &[u8]) -> Result<()> {
        self.ensure_active()?;
        self.write_set.insert(key.to_vec(), None);
        Ok(())
    }

    /// Buffer every mutation of a batch, in order.
    pub fn apply_batch(&mut self, batch: WriteBatch) -> Result<()> {
        self.ensure_active()?;
        for mutation in batch.into_mutations() {
            match mutation {
                Mutation::Put { key, value } => {
                    self.write_set.insert(key, Some(value));
                }
                Mutation::Delete { key } => {
                    self.write_set.insert(key, None);
                }
            }
        }
        Ok(())
    }

    /// Materialize `range` as this transaction sees it.
    ///
    /// The result is the snapshot range overlaid with buffered writes:
    /// buffered puts appear (stamped with the start version) and buffered
    /// deletes disappear.
    pub fn merged_view(&self, range: &KeyRange) -> Result<Snapshot> {
        self.ensure_active()?;

        let mut table: Table = self
            .snapshot
            .range(range)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        for (key, buffered) in &self.write_set {
            if !range.contains(key) {
                continue;
            }
            match buffered {
                Some(value) => {
                    table.insert(
                        key.clone(),
                        VersionedValue {
                            value: value.clone(),
                            version: self.snapshot.version(),
                        },
                    );
                }
                None => {
                    table.remove(key.as_slice());
                }
            }
        }

        Ok(Snapshot::new(Arc::new(table), self.snapshot.version()))
    }

    /// Keys read from the snapshot, with the version observed.
    pub fn read_set(&self) -> &FxHashMap<Vec<u8>, Version> {
        &self.read_set
    }

    /// Buffered writes; `None` marks a delete.
    pub fn write_set(&self) -> &BTreeMap<Vec<u8>, Option<Vec<u8>>> {
        &self.write_set
    }

    /// Check if the transaction buffered no writes.
    pub fn is_read_only(&self) -> bool {
        self.write_set.is_empty()
    }

    /// Buffered writes as mutations, in key order.
    pub fn mutations(&self) -> Vec<Mutation> {
        self.write_set
            .iter()
            .map(|(key, buffered)| match buffered {
                Some(value) => Mutation::Put {
                    key: key.clone(),
                    value: value.clone(),
                },
                None => Mutation::Delete { key: key.clone() },
            })
            .collect()
    }

    /// Transition Active → Committed.
    pub fn mark_committed(&mut self) -> Result<()> {
        self.ensure_active()?;
        self.status = TransactionStatus::Committed;
        Ok(())
    }

    /// Transition Active → Aborted, dropping buffered writes.
    pub fn mark_aborted(&mut self, reason: impl Into<String>) -> Result<()> {
        self.ensure_active()?;
        self.status = TransactionStatus::Aborted {
            reason: reason.into(),
        };
        self.write_set.clear();
        self.read_set.clear();
        Ok(())
    }
}
