//! # ledgerstore
//!
//! Transactional key-value storage for ledger nodes, layered over an
//! embedded ordered engine.
//!
//! ## Quick Start
//!
//! ```
//! use ledgerstore::prelude::*;
//!
//! // Open an in-memory store ("file:///path" persists through a WAL)
//! let storage = StorageHandle::open(&"memory://".parse().unwrap()).unwrap();
//!
//! // Create, read, update
//! storage.new("account:ga", &json!({"balance": 100})).unwrap();
//! storage.set("account:ga", &json!({"balance": 90})).unwrap();
//! let account: serde_json::Value = storage.get("account:ga").unwrap();
//! assert_eq!(account["balance"], 90);
//!
//! // Isolated transaction
//! let txn = storage.open_transaction().unwrap();
//! txn.new("account:gb", &json!({"balance": 10})).unwrap();
//! assert!(!storage.has("account:gb").unwrap());
//! txn.commit().unwrap();
//!
//! // Ordered, prefix-filtered iteration
//! let keys: Vec<String> = storage
//!     .iter("account:", true)
//!     .unwrap()
//!     .map(|item| item.key_str().into_owned())
//!     .collect();
//! assert_eq!(keys, vec!["account:gb", "account:ga"]);
//!
//! storage.close().unwrap();
//! ```
//!
//! ## Operations
//!
//! | Operation | Absent key | Present key |
//! |-----------|------------|-------------|
//! | `new` / `news` | writes | `AlreadyExists` |
//! | `set` / `sets` | `NotFound` | writes |
//! | `remove` | `NotFound` | deletes |
//! | `get` / `get_raw` | `NotFound` | value |
//!
//! Batch operations check every key before writing anything, then write
//! all items in one atomic batch.
//!
//! ## Engines
//!
//! [`StorageHandle::open`] uses the bundled [`LogEngine`]. Any type
//! implementing [`Engine`] can be wrapped with
//! [`StorageHandle::from_engine`].

#![warn(missing_docs)]
#![warn(clippy::all)]

mod batch;
mod encoding;
mod error;
mod handle;
mod iterator;

pub mod prelude;

// Re-export main entry points
pub use handle::StorageHandle;
pub use error::{Error, Result};

// Re-export value and iteration types
pub use batch::Item;
pub use encoding::{EncodeError, Encoding, Serializable};
pub use iterator::{IterItem, StorageIterator};

// Re-export engine configuration and capability traits
pub use ledgerstore_core::{Cursor, Engine, EngineTransaction, KeyRange, KvCore, WriteBatch};
pub use ledgerstore_engine::{Config, DurabilityMode, LogEngine, Scheme};
