//! Value encoding.
//!
//! Values are JSON by default. A type that needs its own wire form
//! implements [`Serializable`] and is stored through
//! [`StorageHandle::new_serializable`](crate::StorageHandle::new_serializable).
//! Keys are never encoded: a string key is stored as its UTF-8 bytes.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Error returned by a custom serializer.
pub type EncodeError = Box<dyn std::error::Error + Send + Sync>;

/// A value with its own byte encoding.
///
/// ```
/// use ledgerstore::{EncodeError, Serializable};
///
/// struct Amount(u64);
///
/// impl Serializable for Amount {
///     fn serialize(&self) -> Result<Vec<u8>, EncodeError> {
///         Ok(self.0.to_be_bytes().to_vec())
///     }
/// }
///
/// assert_eq!(Amount(1).serialize().unwrap(), vec![0, 0, 0, 0, 0, 0, 0, 1]);
/// ```
pub trait Serializable {
    /// Encode `self` into the bytes to store.
    fn serialize(&self) -> std::result::Result<Vec<u8>, EncodeError>;
}

/// How a value becomes bytes.
pub enum Encoding<'a, V: ?Sized = ()> {
    /// The value's own [`Serializable`] implementation
    Custom(&'a dyn Serializable),
    /// Generic JSON via serde
    Structured(&'a V),
}

impl<'a, V: Serialize + ?Sized> Encoding<'a, V> {
    /// Encode the value stored under `key`.
    pub fn encode(&self, key: &str) -> Result<Vec<u8>> {
        match self {
            Encoding::Custom(value) => value.serialize().map_err(|e| Error::Encode {
                key: key.to_string(),
                message: e.to_string(),
            }),
            Encoding::Structured(value) => serde_json::to_vec(value).map_err(|e| Error::Encode {
                key: key.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

/// Decode bytes stored under `key` as JSON.
pub(crate) fn decode<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| Error::Decode {
        key: key.to_string(),
        message: e.to_string(),
    })
}
