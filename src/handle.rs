//! The storage handle.
//!
//! A [`StorageHandle`] is bound to one engine and is either the root handle
//! or a transaction handle. Every operation works the same way on both;
//! the handle routes it to the engine or to the open transaction.
//!
//! Existence checks and writes are separate engine calls. Two callers may
//! both see a key as absent and both write it; the last write wins.

use crate::batch::{BatchWriter, Expectation, Item};
use crate::encoding::{decode, Encoding, Serializable};
use crate::error::{Error, Result};
use crate::iterator::StorageIterator;
use ledgerstore_core::{Engine, EngineTransaction, KeyRange, KvCore};
use ledgerstore_engine::{Config, LogEngine};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

enum View {
    Root,
    Transaction(Box<dyn EngineTransaction>),
}

/// Handle over an opened engine, or over a transaction on it.
///
/// # Example
///
/// ```
/// use ledgerstore::{Config, StorageHandle};
///
/// let storage = StorageHandle::open(&Config::memory()).unwrap();
/// storage.new("balance:ga", &100u64).unwrap();
///
/// let txn = storage.open_transaction().unwrap();
/// txn.set("balance:ga", &90u64).unwrap();
/// txn.commit().unwrap();
///
/// assert_eq!(storage.get::<u64>("balance:ga").unwrap(), 90);
/// ```
pub struct StorageHandle {
    engine: Arc<dyn Engine>,
    view: View,
}

impl StorageHandle {
    /// Open the engine described by `config`.
    pub fn open(config: &Config) -> Result<Self> {
        let engine = LogEngine::open(config)?;
        Ok(Self::from_engine(Arc::new(engine)))
    }

    /// Wrap an already opened engine in a root handle.
    pub fn from_engine(engine: Arc<dyn Engine>) -> Self {
        StorageHandle {
            engine,
            view: View::Root,
        }
    }

    fn kv(&self) -> &dyn KvCore {
        match &self.view {
            View::Root => self.engine.as_kv(),
            View::Transaction(txn) => txn.as_kv(),
        }
    }

    /// Check if `key` is present.
    pub fn has(&self, key: &str) -> Result<bool> {
        Ok(self.kv().has(key.as_bytes())?)
    }

    /// Read the raw bytes stored at `key`.
    pub fn get_raw(&self, key: &str) -> Result<Vec<u8>> {
        self.kv()
            .get(key.as_bytes())?
            .ok_or_else(|| Error::NotFound(key.to_string()))
    }

    /// Read and decode the JSON value stored at `key`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let bytes = self.get_raw(key)?;
        decode(key, &bytes)
    }

    /// Create `key` with a JSON-encoded value.
    ///
    /// Fails with [`Error::AlreadyExists`] if the key is present.
    ///
    /// The value is always stored as JSON, even when its type also
    /// implements [`Serializable`]. Use
    /// [`new_serializable`](Self::new_serializable) to store a value's
    /// custom encoding.
    pub fn new<V: Serialize + ?Sized>(&self, key: &str, value: &V) -> Result<()> {
        self.create(key, Encoding::Structured(value))
    }

    /// Create `key` with a value that encodes itself.
    pub fn new_serializable<V: Serializable>(&self, key: &str, value: &V) -> Result<()> {
        self.create(key, Encoding::<()>::Custom(value))
    }

    fn create<V: Serialize + ?Sized>(&self, key: &str, encoding: Encoding<'_, V>) -> Result<()> {
        if self.has(key)? {
            return Err(Error::AlreadyExists(key.to_string()));
        }
        let bytes = encoding.encode(key)?;
        self.kv().put(key.as_bytes(), &bytes)?;
        Ok(())
    }

    /// Create every item atomically. Nothing is written if any key exists.
    pub fn news<V: Serialize>(&self, items: &[Item<V>]) -> Result<()> {
        BatchWriter::new(self.kv(), Expectation::Absent).write(items)
    }

    /// Overwrite the value of an existing `key`.
    pub fn set<V: Serialize + ?Sized>(&self, key: &str, value: &V) -> Result<()> {
        if !self.has(key)? {
            return Err(Error::NotFound(key.to_string()));
        }
        let bytes = Encoding::Structured(value).encode(key)?;
        self.kv().put(key.as_bytes(), &bytes)?;
        Ok(())
    }

    /// Overwrite every item atomically. Nothing is written if any key is
    /// missing.
    pub fn sets<V: Serialize>(&self, items: &[Item<V>]) -> Result<()> {
        BatchWriter::new(self.kv(), Expectation::Present).write(items)
    }

    /// Delete an existing `key`.
    pub fn remove(&self, key: &str) -> Result<()> {
        if !self.has(key)? {
            return Err(Error::NotFound(key.to_string()));
        }
        self.kv().delete(key.as_bytes())?;
        Ok(())
    }

    /// Iterate over keys starting with `prefix`; an empty prefix scans
    /// everything.
    ///
    /// Keys come back in ascending byte order, or descending when `reverse`
    /// is set. The iterator pins a snapshot until it is exhausted, released
    /// or dropped.
    pub fn iter(&self, prefix: &str, reverse: bool) -> Result<StorageIterator> {
        let cursor = self.kv().cursor(KeyRange::prefix(prefix.as_bytes()))?;
        Ok(StorageIterator::new(cursor, reverse))
    }

    /// Open a transaction on the same engine.
    ///
    /// Fails with [`Error::NoNestedTransaction`] on a transaction handle.
    pub fn open_transaction(&self) -> Result<StorageHandle> {
        if self.is_transaction() {
            return Err(Error::NoNestedTransaction);
        }
        let txn = self.engine.open_transaction()?;
        Ok(StorageHandle {
            engine: Arc::clone(&self.engine),
            view: View::Transaction(txn),
        })
    }

    /// Apply the transaction's writes atomically.
    pub fn commit(&self) -> Result<()> {
        Ok(self.transaction()?.commit()?)
    }

    /// Abandon the transaction's writes.
    pub fn discard(&self) -> Result<()> {
        Ok(self.transaction()?.discard()?)
    }

    fn transaction(&self) -> Result<&dyn EngineTransaction> {
        match &self.view {
            View::Root => Err(Error::NotATransaction),
            View::Transaction(txn) => Ok(txn.as_ref()),
        }
    }

    /// Close the engine. Every handle sharing it, transactions included,
    /// fails with [`Error::Closed`] afterwards.
    pub fn close(&self) -> Result<()> {
        Ok(self.engine.close()?)
    }

    /// Force buffered WAL writes to disk. A no-op for the memory scheme.
    pub fn flush(&self) -> Result<()> {
        Ok(self.engine.flush()?)
    }

    /// Check if this is a transaction handle.
    pub fn is_transaction(&self) -> bool {
        matches!(self.view, View::Transaction(_))
    }

    /// Number of iterators whose cursor has not been released.
    pub fn open_cursors(&self) -> usize {
        self.engine.open_cursors()
    }
}

impl fmt::Debug for StorageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageHandle")
            .field("transaction", &self.is_transaction())
            .field("open_cursors", &self.open_cursors())
            .finish()
    }
}
