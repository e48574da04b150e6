//! Positioned cursors over snapshots
//!
//! A [`SnapshotCursor`] pins one table generation for as long as it lives.
//! Every open cursor is counted by a [`CursorTracker`] shared with the
//! engine, and the count drops exactly once per cursor: on the first
//! `release()` or on drop, whichever comes first.

use crate::table::{Snapshot, Table};
use ledgerstore_core::{Cursor, KeyRange};
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Counts cursors that still pin a snapshot.
#[derive(Debug, Clone, Default)]
pub struct CursorTracker {
    open: Arc<AtomicUsize>,
}

impl CursorTracker {
    /// Create a tracker with no open cursors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cursors not yet released.
    pub fn open_count(&self) -> usize {
        self.open.load(Ordering::Acquire)
    }

    fn acquire(&self) -> CursorGuard {
        self.open.fetch_add(1, Ordering::AcqRel);
        CursorGuard {
            open: Arc::clone(&self.open),
        }
    }
}

#[derive(Debug)]
struct CursorGuard {
    open: Arc<AtomicUsize>,
}

impl Drop for CursorGuard {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::AcqRel);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Position {
    BeforeFirst,
    At(Vec<u8>),
    AfterLast,
}

/// Cursor over a [`Snapshot`], restricted to a [`KeyRange`].
///
/// # Example
///
/// ```
/// use ledgerstore_core::{Cursor, KeyRange, Mutation};
/// use ledgerstore_storage::{CursorTracker, OrderedStore, SnapshotCursor};
///
/// let store = OrderedStore::new();
/// store.apply(&[Mutation::Put { key: b"a".to_vec(), value: b"1".to_vec() }], 1);
///
/// let tracker = CursorTracker::new();
/// let mut cursor = SnapshotCursor::new(store.snapshot(), KeyRange::all(), &tracker);
/// assert_eq!(tracker.open_count(), 1);
///
/// assert!(cursor.next());
/// assert_eq!(cursor.key(), Some(&b"a"[..]));
/// assert!(!cursor.next());
///
/// cursor.release();
/// assert_eq!(tracker.open_count(), 0);
/// ```
#[derive(Debug)]
pub struct SnapshotCursor {
    snapshot: Option<Snapshot>,
    range: KeyRange,
    position: Position,
    guard: Option<CursorGuard>,
}

impl SnapshotCursor {
    /// Open a cursor positioned before the first key of `range`.
    pub fn new(snapshot: Snapshot, range: KeyRange, tracker: &CursorTracker) -> Self {
        SnapshotCursor {
            snapshot: Some(snapshot),
            range,
            position: Position::BeforeFirst,
            guard: Some(tracker.acquire()),
        }
    }

    fn table(&self) -> Option<&Table> {
        self.snapshot.as_ref().map(|s| s.table().as_ref())
    }

    fn first_key(&self, lo: Bound<&[u8]>, hi: Bound<&[u8]>) -> Option<Vec<u8>> {
        let table = self.table()?;
        if !valid_bounds(lo, hi) {
            return None;
        }
        table.range::<[u8], _>((lo, hi)).next().map(|(k, _)| k.clone())
    }

    fn last_key(&self, lo: Bound<&[u8]>, hi: Bound<&[u8]>) -> Option<Vec<u8>> {
        let table = self.table()?;
        if !valid_bounds(lo, hi) {
            return None;
        }
        table
            .range::<[u8], _>((lo, hi))
            .next_back()
            .map(|(k, _)| k.clone())
    }

    fn settle(&mut self, found: Option<Vec<u8>>, exhausted: Position) -> bool {
        match found {
            Some(key) => {
                self.position = Position::At(key);
                true
            }
            None => {
                self.position = exhausted;
                false
            }
        }
    }
}

impl Cursor for SnapshotCursor {
    fn next(&mut self) -> bool {
        let found = match &self.position {
            Position::BeforeFirst => self.first_key(self.range.start(), self.range.end()),
            Position::At(key) => self.first_key(Bound::Excluded(key.as_slice()), self.range.end()),
            Position::AfterLast => None,
        };
        self.settle(found, Position::AfterLast)
    }

    fn prev(&mut self) -> bool {
        let found = match &self.position {
            Position::BeforeFirst => None,
            Position::At(key) => self.last_key(self.range.start(), Bound::Excluded(key.as_slice())),
            Position::AfterLast => self.last_key(self.range.start(), self.range.end()),
        };
        self.settle(found, Position::BeforeFirst)
    }

    fn last(&mut self) -> bool {
        let found = self.last_key(self.range.start(), self.range.end());
        self.settle(found, Position::BeforeFirst)
    }

    fn key(&self) -> Option<&[u8]> {
        self.snapshot.as_ref()?;
        match &self.position {
            Position::At(key) => Some(key.as_slice()),
            _ => None,
        }
    }

    fn value(&self) -> Option<&[u8]> {
        let snapshot = self.snapshot.as_ref()?;
        match &self.position {
            Position::At(key) => snapshot.get(key).map(|v| v.value.as_slice()),
            _ => None,
        }
    }

    fn release(&mut self) {
        self.snapshot = None;
        self.position = Position::AfterLast;
        self.guard = None;
    }

    fn is_released(&self) -> bool {
        self.guard.is_none()
    }
}

impl Drop for SnapshotCursor {
    fn drop(&mut self) {
        self.release();
    }
}

// BTreeMap::range panics when start > end, or when both are the same
// excluded key.
fn valid_bounds(lo: Bound<&[u8]>, hi: Bound<&[u8]>) -> bool {
    match (lo, hi) {
        (Bound::Included(s), Bound::Included(e)) => s <= e,
        (Bound::Included(s), Bound::Excluded(e)) | (Bound::Excluded(s), Bound::Included(e)) => {
            s <= e
        }
        (Bound::Excluded(s), Bound::Excluded(e)) => s < e,
        _ => true,
    }
}
