//! Pull-based iteration over a key range.
//!
//! A [`StorageIterator`] owns one engine cursor and releases it exactly
//! once: when the range is exhausted, on [`release`](StorageIterator::release),
//! or on drop. Items carry a sequence number local to the iteration, starting
//! at `0` in both directions.

use crate::encoding::decode;
use crate::error::Result;
use ledgerstore_core::Cursor;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::fmt;
use std::iter::FusedIterator;

/// One key/value pair yielded by a [`StorageIterator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterItem {
    /// Position of the item within this iteration, from 0
    pub sequence: u64,
    /// Raw key bytes
    pub key: Vec<u8>,
    /// Raw value bytes
    pub value: Vec<u8>,
}

impl IterItem {
    /// The key as text, replacing invalid UTF-8.
    pub fn key_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.key)
    }

    /// Decode the value as JSON.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        decode(&self.key_str(), &self.value)
    }
}

/// Lazy sequence of [`IterItem`]s over a cursor.
pub struct StorageIterator {
    cursor: Option<Box<dyn Cursor>>,
    reverse: bool,
    // reverse iteration pre-positions on the last key; the first `next`
    // yields it without moving
    positioned: bool,
    sequence: u64,
}

impl StorageIterator {
    pub(crate) fn new(mut cursor: Box<dyn Cursor>, reverse: bool) -> Self {
        let mut positioned = false;
        if reverse {
            positioned = cursor.last();
        }

        let mut iter = StorageIterator {
            cursor: Some(cursor),
            reverse,
            positioned,
            sequence: 0,
        };

        if reverse && !positioned {
            iter.release();
        }
        iter
    }

    /// Release the underlying cursor. Safe to call any number of times.
    pub fn release(&mut self) {
        if let Some(mut cursor) = self.cursor.take() {
            cursor.release();
        }
    }

    /// Check if the cursor was already released.
    pub fn is_released(&self) -> bool {
        self.cursor.is_none()
    }

    fn advance(&mut self) -> bool {
        let Some(cursor) = self.cursor.as_mut() else {
            return false;
        };

        if !self.reverse {
            return cursor.next();
        }
        if self.positioned {
            self.positioned = false;
            return true;
        }
        cursor.prev()
    }
}

impl Iterator for StorageIterator {
    type Item = IterItem;

    fn next(&mut self) -> Option<IterItem> {
        if !self.advance() {
            self.release();
            return None;
        }

        let current = self.cursor.as_ref().and_then(|cursor| {
            cursor
                .key()
                .zip(cursor.value())
                .map(|(k, v)| (k.to_vec(), v.to_vec()))
        });

        match current {
            Some((key, value)) => {
                let item = IterItem {
                    sequence: self.sequence,
                    key,
                    value,
                };
                self.sequence += 1;
                Some(item)
            }
            None => {
                self.release();
                None
            }
        }
    }
}

impl FusedIterator for StorageIterator {}

impl Drop for StorageIterator {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for StorageIterator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageIterator")
            .field("reverse", &self.reverse)
            .field("sequence", &self.sequence)
            .field("released", &self.is_released())
            .finish()
    }
}
