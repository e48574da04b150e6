//! Convenient imports for ledgerstore.
//!
//! ```
//! use ledgerstore::prelude::*;
//!
//! let storage = StorageHandle::open(&Config::memory()).unwrap();
//! storage.news(&[Item::new("a", json!(1)), Item::new("b", json!(2))]).unwrap();
//! assert_eq!(storage.iter("", false).unwrap().count(), 2);
//! ```

// Main entry point
pub use crate::handle::StorageHandle;

// Configuration
pub use crate::{Config, DurabilityMode, Scheme};

// Error handling
pub use crate::error::{Error, Result};

// Values and iteration
pub use crate::batch::Item;
pub use crate::encoding::{EncodeError, Serializable};
pub use crate::iterator::{IterItem, StorageIterator};

// Re-export serde_json for convenience
pub use serde_json::json;
