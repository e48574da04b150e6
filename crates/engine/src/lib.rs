//! Engine layer for ledgerstore
//!
//! [`LogEngine`] assembles the lower crates behind the capability traits of
//! `ledgerstore-core`:
//! - `ledgerstore-storage`: the ordered table and snapshot cursors
//! - `ledgerstore-concurrency`: transactions and the serialized write path
//! - `ledgerstore-durability`: the WAL, for the `file` scheme
//!
//! ```
//! use ledgerstore_core::{Engine, KvCore};
//! use ledgerstore_engine::{Config, LogEngine};
//!
//! let engine = LogEngine::open(&Config::memory()).unwrap();
//! engine.put(b"k", b"v").unwrap();
//! assert_eq!(engine.get(b"k").unwrap(), Some(b"v".to_vec()));
//! engine.close().unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod engine;
pub mod transaction;

pub use config::{Config, Scheme};
pub use engine::LogEngine;
pub use ledgerstore_durability::DurabilityMode;
pub use transaction::LogTransaction;
