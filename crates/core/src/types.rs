//! Core types for key ranges and write sets
//!
//! Keys and values are opaque byte strings. Ordering is byte-lexicographic,
//! which is exactly the ordering of `Vec<u8>` / `[u8]`.

use serde::{Deserialize, Serialize};
use std::ops::Bound;

/// Monotonic commit version assigned by the engine.
///
/// Every applied write (single put/delete, batch, or committed transaction)
/// receives one version; all keys touched by that write share it. Version `0`
/// means "absent / never written".
pub type Version = u64;

/// A half-open or unbounded range of keys.
///
/// # Examples
///
/// ```
/// use ledgerstore_core::KeyRange;
///
/// let range = KeyRange::prefix(b"user:");
/// assert!(range.contains(b"user:1"));
/// assert!(!range.contains(b"other:1"));
/// assert!(KeyRange::all().contains(b"anything"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRange {
    start: Bound<Vec<u8>>,
    end: Bound<Vec<u8>>,
}

impl KeyRange {
    /// The full keyspace.
    pub fn all() -> Self {
        KeyRange {
            start: Bound::Unbounded,
            end: Bound::Unbounded,
        }
    }

    /// All keys sharing `prefix`.
    ///
    /// An empty prefix yields the full keyspace. The upper bound is the
    /// shortest key greater than every key with the prefix: trailing `0xff`
    /// bytes are dropped and the last remaining byte is incremented. A prefix
    /// made only of `0xff` bytes has no upper bound.
    pub fn prefix(prefix: &[u8]) -> Self {
        if prefix.is_empty() {
            return Self::all();
        }

        let mut limit = prefix.to_vec();
        let end = loop {
            match limit.pop() {
                Some(0xff) => continue,
                Some(byte) => {
                    limit.push(byte + 1);
                    break Bound::Excluded(limit);
                }
                None => break Bound::Unbounded,
            }
        };

        KeyRange {
            start: Bound::Included(prefix.to_vec()),
            end,
        }
    }

    /// Keys in `[start, end)`.
    pub fn between(start: &[u8], end: &[u8]) -> Self {
        KeyRange {
            start: Bound::Included(start.to_vec()),
            end: Bound::Excluded(end.to_vec()),
        }
    }

    /// Borrowed bounds, suitable for `BTreeMap::range`.
    pub fn bounds(&self) -> (Bound<&[u8]>, Bound<&[u8]>) {
        (borrow_bound(&self.start), borrow_bound(&self.end))
    }

    /// Lower bound of the range.
    pub fn start(&self) -> Bound<&[u8]> {
        borrow_bound(&self.start)
    }

    /// Upper bound of the range.
    pub fn end(&self) -> Bound<&[u8]> {
        borrow_bound(&self.end)
    }

    /// Check whether `key` falls inside the range.
    pub fn contains(&self, key: &[u8]) -> bool {
        let above_start = match &self.start {
            Bound::Included(s) => key >= s.as_slice(),
            Bound::Excluded(s) => key > s.as_slice(),
            Bound::Unbounded => true,
        };
        let below_end = match &self.end {
            Bound::Included(e) => key <= e.as_slice(),
            Bound::Excluded(e) => key < e.as_slice(),
            Bound::Unbounded => true,
        };
        above_start && below_end
    }

    /// Check whether the range can contain no key at all.
    pub fn is_empty(&self) -> bool {
        match (&self.start, &self.end) {
            (Bound::Included(s), Bound::Included(e)) => s > e,
            (Bound::Included(s), Bound::Excluded(e))
            | (Bound::Excluded(s), Bound::Included(e))
            | (Bound::Excluded(s), Bound::Excluded(e)) => s >= e,
            _ => false,
        }
    }
}

impl Default for KeyRange {
    fn default() -> Self {
        Self::all()
    }
}

fn borrow_bound(bound: &Bound<Vec<u8>>) -> Bound<&[u8]> {
    match bound {
        Bound::Included(k) => Bound::Included(k.as_slice()),
        Bound::Excluded(k) => Bound::Excluded(k.as_slice()),
        Bound::Unbounded => Bound::Unbounded,
    }
}

/// A single write inside a batch or transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mutation {
    /// Insert or overwrite a key
    Put {
        /// Key being written
        key: Vec<u8>,
        /// Value being written
        value: Vec<u8>,
    },
    /// Remove a key
    Delete {
        /// Key being deleted
        key: Vec<u8>,
    },
}

impl Mutation {
    /// The key this mutation touches.
    pub fn key(&self) -> &[u8] {
        match self {
            Mutation::Put { key, .. } | Mutation::Delete { key } => key,
        }
    }
}

/// An ordered set of mutations applied as one atomic unit.
///
/// Mutations are applied in insertion order, so a later write to the same
/// key wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    mutations: Vec<Mutation>,
}

impl WriteBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty batch with room for `capacity` mutations.
    pub fn with_capacity(capacity: usize) -> Self {
        WriteBatch {
            mutations: Vec::with_capacity(capacity),
        }
    }

    /// Queue a put.
    pub fn put(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.mutations.push(Mutation::Put {
            key: key.into(),
            value: value.into(),
        });
    }

    /// Queue a delete.
    pub fn delete(&mut self, key: impl Into<Vec<u8>>) {
        self.mutations.push(Mutation::Delete { key: key.into() });
    }

    /// Number of queued mutations.
    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    /// Check if no mutation is queued.
    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    /// Iterate over queued mutations in order.
    pub fn iter(&self) -> impl Iterator<Item = &Mutation> {
        self.mutations.iter()
    }

    /// Consume the batch, returning its mutations.
    pub fn into_mutations(self) -> Vec<Mutation> {
        self.mutations
    }
}

impl From<Vec<Mutation>> for WriteBatch {
    fn from(mutations: Vec<Mutation>) -> Self {
        WriteBatch { mutations }
    }
}
