//! Storage layer for ledgerstore
//!
//! This crate implements the in-memory ordered table backing the engine:
//! - OrderedStore: `BTreeMap` behind an `RwLock`, copy-on-write snapshots
//! - Per-key versions for optimistic validation
//! - Snapshot: immutable point-in-time view
//! - SnapshotCursor: positioned cursor over a snapshot, tracked until release

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cursor;
pub mod table;

pub use cursor::{CursorTracker, SnapshotCursor};
pub use table::{OrderedStore, Snapshot, Table, VersionedValue};
