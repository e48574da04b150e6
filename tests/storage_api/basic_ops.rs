//! Single-key Operation Tests
//!
//! has, get_raw, get, new, new_serializable, set, remove.

use crate::*;
use ledgerstore::{EncodeError, Error, Serializable};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Account {
    address: String,
    balance: u64,
    sequence: u64,
}

fn account(balance: u64) -> Account {
    Account {
        address: "GA7Q".to_string(),
        balance,
        sequence: 1,
    }
}

/// Stored with a fixed-width big-endian layout instead of JSON
struct Height(u64);

impl Serializable for Height {
    fn serialize(&self) -> Result<Vec<u8>, EncodeError> {
        Ok(self.0.to_be_bytes().to_vec())
    }
}

// =============================================================================
// READ TESTS
// =============================================================================

#[test]
fn test_never_written_key() {
    let storage = memory_storage();

    assert!(!storage.has("k").unwrap());
    assert!(storage.get_raw("k").unwrap_err().is_not_found());
    assert!(matches!(
        storage.get::<u64>("k"),
        Err(Error::NotFound(ref key)) if key == "k"
    ));
}

#[test]
fn test_get_wrong_shape_is_decode_error() {
    let storage = memory_storage();
    storage.new("k", "not an account").unwrap();

    let err = storage.get::<Account>("k").unwrap_err();
    assert!(matches!(err, Error::Decode { ref key, .. } if key == "k"));
}

// =============================================================================
// NEW TESTS
// =============================================================================

#[test]
fn test_new_then_get() {
    let storage = memory_storage();

    storage.new("account:ga", &account(100)).unwrap();

    assert!(storage.has("account:ga").unwrap());
    assert_eq!(storage.get::<Account>("account:ga").unwrap(), account(100));
}

#[test]
fn test_new_twice_is_already_exists() {
    let storage = memory_storage();

    storage.new("k", &json!("v")).unwrap();
    let err = storage.new("k", &json!("v2")).unwrap_err();

    assert!(err.is_already_exists());
    assert_eq!(storage.get::<String>("k").unwrap(), "v");
}

#[test]
fn test_new_serializable_bypasses_json() {
    let storage = memory_storage();

    storage.new_serializable("height", &Height(7)).unwrap();

    assert_eq!(storage.get_raw("height").unwrap(), 7u64.to_be_bytes().to_vec());
    assert!(storage
        .new_serializable("height", &Height(8))
        .unwrap_err()
        .is_already_exists());
}

#[test]
fn test_structured_value_round_trip() {
    let storage = memory_storage();
    let value = json!({"nested": {"list": [1, 2, 3]}, "flag": true, "none": null});

    storage.new("doc", &value).unwrap();

    assert_eq!(storage.get::<serde_json::Value>("doc").unwrap(), value);
}

// =============================================================================
// SET TESTS
// =============================================================================

#[test]
fn test_set_overwrites() {
    let storage = memory_storage();

    storage.new("account:ga", &account(100)).unwrap();
    storage.set("account:ga", &account(90)).unwrap();

    assert_eq!(storage.get::<Account>("account:ga").unwrap().balance, 90);
}

#[test]
fn test_set_absent_key_is_not_found() {
    let storage = memory_storage();

    let err = storage.set("ghost", &1).unwrap_err();

    assert!(err.is_not_found());
    assert!(!storage.has("ghost").unwrap());
}

// =============================================================================
// REMOVE TESTS
// =============================================================================

#[test]
fn test_remove() {
    let storage = memory_storage();

    storage.new("k", &1).unwrap();
    storage.remove("k").unwrap();

    assert!(!storage.has("k").unwrap());
    assert!(storage.remove("k").unwrap_err().is_not_found());
}

#[test]
fn test_remove_then_new_again() {
    let storage = memory_storage();

    storage.new("k", &1).unwrap();
    storage.remove("k").unwrap();
    storage.new("k", &2).unwrap();

    assert_eq!(storage.get::<i32>("k").unwrap(), 2);
}

// =============================================================================
// LIFECYCLE TESTS
// =============================================================================

#[test]
fn test_closed_storage_rejects_operations() {
    let storage = memory_storage();
    storage.new("k", &1).unwrap();

    storage.close().unwrap();

    assert!(storage.has("k").unwrap_err().is_closed());
    assert!(storage.new("j", &1).unwrap_err().is_closed());
    assert!(storage.iter("", false).unwrap_err().is_closed());
    assert!(storage.open_transaction().unwrap_err().is_closed());
    assert!(storage.close().unwrap_err().is_closed());
}

#[test]
fn test_flush_on_memory_is_noop() {
    let storage = memory_storage();
    storage.new("k", &1).unwrap();
    storage.flush().unwrap();
    assert!(storage.has("k").unwrap());
}

#[test]
fn test_invalid_config() {
    let err = StorageHandle::open(&Config::file("")).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}
