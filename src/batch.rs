//! Batch create/update.
//!
//! A batch runs in two phases: every key is checked first, then all values
//! are encoded into one [`WriteBatch`] written atomically. A failed check
//! writes nothing. The check and the write are separate engine calls, so a
//! concurrent writer can still slip in between them.

use crate::encoding::Encoding;
use crate::error::{Error, Result};
use ledgerstore_core::{KvCore, WriteBatch};
use serde::{Deserialize, Serialize};

/// One key/value pair of a batch operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item<V = serde_json::Value> {
    /// Key to write
    pub key: String,
    /// Value, encoded as JSON
    pub value: V,
}

impl<V> Item<V> {
    /// Create an item.
    pub fn new(key: impl Into<String>, value: V) -> Self {
        Item {
            key: key.into(),
            value,
        }
    }
}

/// What every key of a batch must satisfy before anything is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Expectation {
    /// Create: keys must not exist
    Absent,
    /// Update: keys must exist
    Present,
}

pub(crate) struct BatchWriter<'a> {
    kv: &'a dyn KvCore,
    expectation: Expectation,
}

impl<'a> BatchWriter<'a> {
    pub(crate) fn new(kv: &'a dyn KvCore, expectation: Expectation) -> Self {
        BatchWriter { kv, expectation }
    }

    pub(crate) fn write<V: Serialize>(&self, items: &[Item<V>]) -> Result<()> {
        if items.is_empty() {
            return Err(Error::EmptyBatch);
        }

        for item in items {
            let exists = self.kv.has(item.key.as_bytes())?;
            match (self.expectation, exists) {
                (Expectation::Absent, true) => return Err(Error::AlreadyExists(item.key.clone())),
                (Expectation::Present, false) => return Err(Error::NotFound(item.key.clone())),
                _ => {}
            }
        }

        let mut batch = WriteBatch::with_capacity(items.len());
        for item in items {
            let bytes = Encoding::Structured(&item.value).encode(&item.key)?;
            batch.put(item.key.as_bytes(), bytes);
        }

        self.kv.write(batch)?;
        Ok(())
    }
}
