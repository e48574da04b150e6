//! Ordered, versioned in-memory table
//!
//! # Design
//!
//! - `BTreeMap<Vec<u8>, VersionedValue>`: byte-lexicographic order for free
//! - `Arc<Table>` behind a `parking_lot::RwLock`: a snapshot is an `Arc`
//!   clone, O(1) to acquire
//! - Copy-on-write: `apply` uses `Arc::make_mut`, so the table is cloned
//!   only while some snapshot still pins the previous generation
//!
//! The clone copies the whole map. While a long-lived iterator or
//! transaction pins a snapshot, the first write after each new snapshot
//! costs O(n) in the number of keys. Writes that find the table unshared
//! stay O(log n).
//!
//! # Thread Safety
//!
//! Reads take the read lock for the duration of one lookup. Writes take the
//! write lock for one `apply`. The caller is responsible for serializing
//! version allocation across writers.

use ledgerstore_core::{KeyRange, Mutation, Version};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A stored value together with the version that wrote it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedValue {
    /// Raw value bytes
    pub value: Vec<u8>,
    /// Version of the write that produced this value
    pub version: Version,
}

/// The ordered map backing a store or a snapshot.
pub type Table = BTreeMap<Vec<u8>, VersionedValue>;

/// Immutable point-in-time view of a table.
#[derive(Debug, Clone)]
pub struct Snapshot {
    table: Arc<Table>,
    version: Version,
}

impl Snapshot {
    /// Wrap an existing table generation.
    pub fn new(table: Arc<Table>, version: Version) -> Self {
        Snapshot { table, version }
    }

    /// A snapshot containing nothing.
    pub fn empty() -> Self {
        Snapshot::new(Arc::new(Table::new()), 0)
    }

    /// Store version at the time the snapshot was taken.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Look up a key.
    pub fn get(&self, key: &[u8]) -> Option<&VersionedValue> {
        self.table.get(key)
    }

    /// Check if a key is present.
    pub fn contains(&self, key: &[u8]) -> bool {
        self.table.contains_key(key)
    }

    /// Version of the write that produced `key`, or `0` if absent.
    pub fn version_of(&self, key: &[u8]) -> Version {
        self.table.get(key).map(|v| v.version).unwrap_or(0)
    }

    /// Entries inside `range`, in ascending key order.
    pub fn range<'a>(
        &'a self,
        range: &KeyRange,
    ) -> Box<dyn DoubleEndedIterator<Item = (&'a Vec<u8>, &'a VersionedValue)> + 'a> {
        // BTreeMap::range panics on inverted bounds
        if range.is_empty() {
            return Box::new(std::iter::empty());
        }
        Box::new(self.table.range::<[u8], _>(range.bounds()))
    }

    /// Shared handle to the underlying table generation.
    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    /// Number of keys in the snapshot.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Check if the snapshot holds no keys.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[derive(Debug)]
struct State {
    table: Arc<Table>,
    version: Version,
}

/// The live, mutable table of an engine.
///
/// # Example
///
/// ```
/// use ledgerstore_core::Mutation;
/// use ledgerstore_storage::OrderedStore;
///
/// let store = OrderedStore::new();
/// store.apply(&[Mutation::Put { key: b"a".to_vec(), value: b"1".to_vec() }], 1);
///
/// let snapshot = store.snapshot();
/// assert_eq!(snapshot.version(), 1);
/// assert!(snapshot.contains(b"a"));
/// ```
#[derive(Debug)]
pub struct OrderedStore {
    state: RwLock<State>,
}

impl OrderedStore {
    /// Create an empty store at version 0.
    pub fn new() -> Self {
        OrderedStore {
            state: RwLock::new(State {
                table: Arc::new(Table::new()),
                version: 0,
            }),
        }
    }

    /// Version of the most recent applied write.
    pub fn current_version(&self) -> Version {
        self.state.read().version
    }

    /// Look up a key, cloning the stored value.
    pub fn get(&self, key: &[u8]) -> Option<VersionedValue> {
        self.state.read().table.get(key).cloned()
    }

    /// Check if a key is present.
    pub fn contains(&self, key: &[u8]) -> bool {
        self.state.read().table.contains_key(key)
    }

    /// Version of the write that produced `key`, or `0` if absent.
    pub fn version_of(&self, key: &[u8]) -> Version {
        self.state
            .read()
            .table
            .get(key)
            .map(|v| v.version)
            .unwrap_or(0)
    }

    /// Capture the current table generation.
    pub fn snapshot(&self) -> Snapshot {
        let state = self.state.read();
        Snapshot::new(Arc::clone(&state.table), state.version)
    }

    /// Apply mutations in order, stamping every put with `version`.
    ///
    /// The store version only moves forward; replaying an older version
    /// leaves it untouched.
    pub fn apply(&self, mutations: &[Mutation], version: Version) {
        let mut state = self.state.write();
        let table = Arc::make_mut(&mut state.table);

        for mutation in mutations {
            match mutation {
                Mutation::Put { key, value } => {
                    table.insert(
                        key.clone(),
                        VersionedValue {
                            value: value.clone(),
                            version,
                        },
                    );
                }
                Mutation::Delete { key } => {
                    table.remove(key.as_slice());
                }
            }
        }

        if version > state.version {
            state.version = version;
        }
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        self.state.read().table.len()
    }

    /// Check if the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.state.read().table.is_empty()
    }
}

impl Default for OrderedStore {
    fn default() -> Self {
        Self::new()
    }
}
