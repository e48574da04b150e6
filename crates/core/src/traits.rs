//! Capability traits for backing engines
//!
//! The storage API never talks to a concrete engine. It only needs:
//! - point operations: `has`, `get`, `put`, `delete`
//! - an atomic batch write
//! - a range cursor
//! - transactional views exposing the same operations
//!
//! Both the root engine ([`Engine`]) and a transactional view
//! ([`EngineTransaction`]) implement [`KvCore`], so callers can route every
//! read and write through either one without knowing which it is.

use crate::error::Result;
use crate::types::{KeyRange, WriteBatch};

/// Point operations, batch writes and cursors over an ordered keyspace.
///
/// Implementations must be safe to share between threads. Individual
/// operations are atomic; sequences of operations are not.
pub trait KvCore: Send + Sync {
    /// Check whether `key` is present.
    fn has(&self, key: &[u8]) -> Result<bool>;

    /// Read the value stored at `key`.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Insert or overwrite `key`.
    fn put(&self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error at this level.
    fn delete(&self, key: &[u8]) -> Result<()>;

    /// Apply every mutation in `batch` atomically: all or none.
    fn write(&self, batch: WriteBatch) -> Result<()>;

    /// Open a cursor over `range`.
    ///
    /// The cursor pins a snapshot of the keyspace until it is released.
    fn cursor(&self, range: KeyRange) -> Result<Box<dyn Cursor>>;
}

/// A root engine instance.
pub trait Engine: KvCore {
    /// This engine as a plain [`KvCore`].
    fn as_kv(&self) -> &dyn KvCore;

    /// Start an isolated transactional view.
    fn open_transaction(&self) -> Result<Box<dyn EngineTransaction>>;

    /// Force buffered writes to stable storage.
    fn flush(&self) -> Result<()>;

    /// Release engine resources. Every later operation fails.
    fn close(&self) -> Result<()>;

    /// Number of cursors that have not been released yet.
    fn open_cursors(&self) -> usize;
}

/// A transactional view over an engine.
///
/// Writes are buffered privately until [`commit`](Self::commit). Reads see
/// the snapshot taken when the transaction opened, overlaid with the
/// transaction's own writes. A transaction ends exactly once; every
/// operation after that fails with
/// [`Error::TransactionNotActive`](crate::Error::TransactionNotActive).
pub trait EngineTransaction: KvCore {
    /// This transaction as a plain [`KvCore`].
    fn as_kv(&self) -> &dyn KvCore;

    /// Apply the buffered writes atomically.
    ///
    /// Fails with [`Error::TransactionConflict`](crate::Error::TransactionConflict)
    /// when another writer changed a key this transaction read or wrote.
    fn commit(&self) -> Result<()>;

    /// Abandon the buffered writes.
    fn discard(&self) -> Result<()>;

    /// Check if the transaction can still be used.
    fn is_active(&self) -> bool;
}

/// A positioned cursor over a snapshot.
///
/// A fresh cursor sits before the first key of its range. `next` moves
/// forward, `prev` moves backward, `last` jumps to the final key. Each
/// movement returns `false` once it runs off the range.
pub trait Cursor: Send {
    /// Advance to the next key in ascending order.
    fn next(&mut self) -> bool;

    /// Step back to the previous key.
    fn prev(&mut self) -> bool;

    /// Jump to the last key of the range.
    fn last(&mut self) -> bool;

    /// Key at the current position.
    fn key(&self) -> Option<&[u8]>;

    /// Value at the current position.
    fn value(&self) -> Option<&[u8]>;

    /// Drop the pinned snapshot. Safe to call more than once.
    fn release(&mut self);

    /// Check if [`release`](Self::release) already ran.
    fn is_released(&self) -> bool;
}
