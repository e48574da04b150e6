//! Transaction manager: the serialized write path
//!
//! Every state change of an engine goes through one lock, whether it is a
//! direct put/delete/batch or a transaction commit:
//!
//! ```text
//! 1. lock the write path
//! 2. fail with Closed if the engine was closed
//! 3. (commit only) validate the transaction, abort on conflict
//! 4. version = current_version + 1
//! 5. append ONE WAL entry (file scheme)   <- durability point
//! 6. apply the mutations to the in-memory table
//! ```
//!
//! Holding the lock across validate → WAL → apply prevents a second writer
//! from slipping in between the check and the apply. If the WAL append
//! fails nothing is applied and a committing transaction is aborted.

use crate::transaction::TransactionContext;
use crate::validation::validate_transaction;
use ledgerstore_core::{Error, Mutation, Result, Version};
use ledgerstore_durability::{Wal, WalEntry};
use ledgerstore_storage::OrderedStore;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{debug, error};

#[derive(Debug)]
struct WritePath {
    wal: Option<Wal>,
}

/// Coordinates versions, transaction IDs and the WAL for one engine.
#[derive(Debug)]
pub struct TransactionManager {
    next_txn_id: AtomicU64,
    closed: AtomicBool,
    write_path: Mutex<WritePath>,
}

impl TransactionManager {
    /// Create a manager writing through `wal`, if any.
    pub fn new(wal: Option<Wal>) -> Self {
        Self::with_txn_id(wal, 0)
    }

    /// Create a manager whose transaction IDs start after `max_txn_id`.
    ///
    /// Used after replay so new commit entries never reuse an ID already
    /// present in the log.
    pub fn with_txn_id(wal: Option<Wal>, max_txn_id: u64) -> Self {
        TransactionManager {
            next_txn_id: AtomicU64::new(max_txn_id + 1),
            closed: AtomicBool::new(false),
            write_path: Mutex::new(WritePath { wal }),
        }
    }

    /// Allocate the next transaction ID.
    pub fn next_txn_id(&self) -> u64 {
        self.next_txn_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Begin a transaction over the current state of `store`.
    pub fn begin(&self, store: &OrderedStore) -> Result<TransactionContext> {
        self.ensure_open()?;
        let txn = TransactionContext::new(self.next_txn_id(), store.snapshot());
        debug!(
            txn_id = txn.txn_id,
            start_version = txn.start_version(),
            "Transaction opened"
        );
        Ok(txn)
    }

    /// Check if [`close`](Self::close) has run.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Fail with `Closed` if the engine was closed.
    pub fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            Err(Error::Closed)
        } else {
            Ok(())
        }
    }

    /// Apply a direct write atomically.
    ///
    /// An empty mutation list is a no-op and returns the current version.
    pub fn write(&self, store: &OrderedStore, mutations: Vec<Mutation>) -> Result<Version> {
        let mut path = self.write_path.lock();
        self.ensure_open()?;

        if mutations.is_empty() {
            return Ok(store.current_version());
        }

        let version = store.current_version() + 1;
        let entry = WalEntry::Batch { version, mutations };
        Self::log(&mut path, &entry)?;
        store.apply(entry.mutations(), version);
        Ok(version)
    }

    /// Commit a transaction atomically.
    ///
    /// # Errors
    ///
    /// - `TransactionNotActive` if the transaction already ended
    /// - `TransactionConflict` if validation fails; the transaction is aborted
    /// - `Closed` if the engine was closed
    /// - I/O errors from the WAL; the transaction is aborted
    pub fn commit(&self, txn: &mut TransactionContext, store: &OrderedStore) -> Result<Version> {
        let mut path = self.write_path.lock();
        self.ensure_open()?;
        txn.ensure_active()?;

        if txn.is_read_only() {
            txn.mark_committed()?;
            debug!(txn_id = txn.txn_id, "Read-only transaction committed");
            return Ok(store.current_version());
        }

        let validation = validate_transaction(txn, store);
        if !validation.is_valid() {
            let reason = validation.describe();
            debug!(
                txn_id = txn.txn_id,
                conflicts = validation.conflict_count(),
                "Transaction aborted on conflict"
            );
            txn.mark_aborted(reason.clone())?;
            return Err(Error::TransactionConflict(reason));
        }

        let version = store.current_version() + 1;
        let entry = WalEntry::Commit {
            txn_id: txn.txn_id,
            version,
            mutations: txn.mutations(),
        };

        if let Err(e) = Self::log(&mut path, &entry) {
            txn.mark_aborted(format!("WAL write failed: {}", e))?;
            return Err(e);
        }

        store.apply(entry.mutations(), version);
        txn.mark_committed()?;

        debug!(
            txn_id = txn.txn_id,
            version,
            writes = entry.mutations().len(),
            "Transaction committed"
        );
        Ok(version)
    }

    /// Explicitly abort a transaction. Nothing is written to the WAL.
    pub fn abort(&self, txn: &mut TransactionContext, reason: impl Into<String>) -> Result<()> {
        txn.mark_aborted(reason)?;
        debug!(txn_id = txn.txn_id, "Transaction discarded");
        Ok(())
    }

    /// fsync the WAL, if any.
    pub fn sync(&self) -> Result<()> {
        let mut path = self.write_path.lock();
        self.ensure_open()?;
        match path.wal.as_mut() {
            Some(wal) => wal.sync(),
            None => Ok(()),
        }
    }

    /// Sync and drop the WAL. Every later write fails with `Closed`.
    pub fn close(&self) -> Result<()> {
        let mut path = self.write_path.lock();
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err(Error::Closed);
        }
        match path.wal.take() {
            Some(mut wal) => wal.sync(),
            None => Ok(()),
        }
    }

    fn log(path: &mut WritePath, entry: &WalEntry) -> Result<()> {
        if let Some(wal) = path.wal.as_mut() {
            if let Err(e) = wal.append(entry) {
                error!(version = entry.version(), error = %e, "WAL append failed");
                return Err(e);
            }
        }
        Ok(())
    }
}

impl Default for TransactionManager {
    fn default() -> Self {
        Self::new(None)
    }
}
