//! Durability layer for ledgerstore
//!
//! This crate implements the write-ahead log used by the `file` scheme:
//! - WalEntry types: Batch, Commit
//! - Entry encoding/decoding with CRC32 checksums
//! - Durability modes: Strict, Batched (default), NoSync
//! - WAL file operations: append, sync, replay on open
//! - Exclusive directory lock held while the log is open

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod encoding;
pub mod entry;
pub mod mode;
pub mod wal;

pub use encoding::{decode_entry, decode_header, encode_entry, FRAME_HEADER_SIZE};
pub use entry::WalEntry;
pub use mode::DurabilityMode;
pub use wal::{ReplayStats, Wal, LOCK_FILENAME, WAL_FILENAME};
