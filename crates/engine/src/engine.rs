//! LogEngine: the concrete ordered engine
//!
//! One `LogEngine` owns:
//! - an [`OrderedStore`] holding the live table
//! - a [`TransactionManager`] serializing every write (and owning the WAL)
//! - a [`CursorTracker`] counting unreleased cursors
//!
//! Clones share the same state. Opening a `file` engine replays the WAL
//! into an empty table before the engine becomes visible.

use crate::config::{Config, Scheme};
use crate::transaction::LogTransaction;
use ledgerstore_concurrency::TransactionManager;
use ledgerstore_core::{
    Cursor, Engine, EngineTransaction, KeyRange, KvCore, Mutation, Result, Version, WriteBatch,
};
use ledgerstore_durability::Wal;
use ledgerstore_storage::{CursorTracker, OrderedStore, SnapshotCursor};
use std::sync::Arc;
use tracing::info;

#[derive(Debug)]
pub(crate) struct EngineInner {
    pub(crate) store: OrderedStore,
    pub(crate) manager: TransactionManager,
    pub(crate) cursors: CursorTracker,
    config: Config,
}

/// Ordered key-value engine with optimistic transactions.
#[derive(Debug, Clone)]
pub struct LogEngine {
    inner: Arc<EngineInner>,
}

impl LogEngine {
    /// Open an engine.
    ///
    /// The memory scheme starts empty. The file scheme creates the directory
    /// if needed and replays its WAL.
    pub fn open(config: &Config) -> Result<Self> {
        config.validate()?;

        let store = OrderedStore::new();
        let manager = match config.scheme {
            Scheme::Memory => TransactionManager::new(None),
            Scheme::File => {
                let (wal, stats) = Wal::open(&config.path, config.durability, |entry| {
                    store.apply(entry.mutations(), entry.version());
                })?;
                TransactionManager::with_txn_id(Some(wal), stats.max_txn_id)
            }
        };

        info!(
            uri = %config,
            keys = store.len(),
            version = store.current_version(),
            "Engine opened"
        );

        Ok(LogEngine {
            inner: Arc::new(EngineInner {
                store,
                manager,
                cursors: CursorTracker::new(),
                config: config.clone(),
            }),
        })
    }

    /// Configuration the engine was opened with.
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Version of the most recent write.
    pub fn current_version(&self) -> Version {
        self.inner.store.current_version()
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        self.inner.store.len()
    }

    /// Check if the engine holds no keys.
    pub fn is_empty(&self) -> bool {
        self.inner.store.is_empty()
    }

    /// Check if the engine was closed.
    pub fn is_closed(&self) -> bool {
        self.inner.manager.is_closed()
    }

    fn write_one(&self, mutation: Mutation) -> Result<()> {
        self.inner
            .manager
            .write(&self.inner.store, vec![mutation])
            .map(|_| ())
    }
}

impl KvCore for LogEngine {
    fn has(&self, key: &[u8]) -> Result<bool> {
        self.inner.manager.ensure_open()?;
        Ok(self.inner.store.contains(key))
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.inner.manager.ensure_open()?;
        Ok(self.inner.store.get(key).map(|v| v.value))
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.write_one(Mutation::Put {
            key: key.to_vec(),
            value: value.to_vec(),
        })
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        self.write_one(Mutation::Delete { key: key.to_vec() })
    }

    fn write(&self, batch: WriteBatch) -> Result<()> {
        self.inner
            .manager
            .write(&self.inner.store, batch.into_mutations())
            .map(|_| ())
    }

    fn cursor(&self, range: KeyRange) -> Result<Box<dyn Cursor>> {
        self.inner.manager.ensure_open()?;
        Ok(Box::new(SnapshotCursor::new(
            self.inner.store.snapshot(),
            range,
            &self.inner.cursors,
        )))
    }
}

impl Engine for LogEngine {
    fn as_kv(&self) -> &dyn KvCore {
        self
    }

    fn open_transaction(&self) -> Result<Box<dyn EngineTransaction>> {
        Ok(Box::new(LogTransaction::begin(Arc::clone(&self.inner))?))
    }

    fn flush(&self) -> Result<()> {
        self.inner.manager.sync()
    }

    fn close(&self) -> Result<()> {
        self.inner.manager.close()?;
        info!(uri = %self.inner.config, "Engine closed");
        Ok(())
    }

    fn open_cursors(&self) -> usize {
        self.inner.cursors.open_count()
    }
}
