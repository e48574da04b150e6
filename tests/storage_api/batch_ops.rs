//! Batch Operation Tests
//!
//! news and sets: check every key first, then write one atomic batch.

use crate::*;
use ledgerstore::{Error, Item};
use serde_json::json;

// =============================================================================
// NEWS TESTS
// =============================================================================

#[test]
fn test_news_empty_is_empty_batch() {
    let storage = memory_storage();
    let items: Vec<Item> = vec![];

    assert!(matches!(storage.news(&items), Err(Error::EmptyBatch)));
}

#[test]
fn test_news_creates_every_item() {
    let storage = memory_storage();

    storage
        .news(&[Item::new("x", json!(1)), Item::new("y", json!(2))])
        .unwrap();

    assert_eq!(storage.get::<i64>("x").unwrap(), 1);
    assert_eq!(storage.get::<i64>("y").unwrap(), 2);
}

#[test]
fn test_news_with_existing_key_writes_nothing() {
    let storage = memory_storage();
    storage
        .news(&[Item::new("x", json!(1)), Item::new("y", json!(2))])
        .unwrap();

    let err = storage
        .news(&[Item::new("x", json!(3)), Item::new("z", json!(4))])
        .unwrap_err();

    assert!(matches!(err, Error::AlreadyExists(ref key) if key == "x"));
    assert_eq!(storage.get::<i64>("x").unwrap(), 1);
    assert!(!storage.has("z").unwrap());
}

#[test]
fn test_news_typed_items() {
    let storage = memory_storage();

    storage
        .news(&[Item::new("name:1", "alice"), Item::new("name:2", "bob")])
        .unwrap();

    assert_eq!(storage.get::<String>("name:2").unwrap(), "bob");
}

// =============================================================================
// SETS TESTS
// =============================================================================

#[test]
fn test_sets_empty_is_empty_batch() {
    let storage = memory_storage();
    let items: Vec<Item<u32>> = vec![];

    assert!(matches!(storage.sets(&items), Err(Error::EmptyBatch)));
}

#[test]
fn test_sets_updates_existing() {
    let storage = memory_storage();
    storage
        .news(&[Item::new("x", json!(1)), Item::new("y", json!(2))])
        .unwrap();

    storage.sets(&[Item::new("x", json!(3))]).unwrap();

    assert_eq!(storage.get::<i64>("x").unwrap(), 3);
    assert_eq!(storage.get::<i64>("y").unwrap(), 2);
}

#[test]
fn test_sets_with_missing_key_writes_nothing() {
    let storage = memory_storage();
    storage.new("x", &1).unwrap();

    let err = storage
        .sets(&[Item::new("x", json!(5)), Item::new("w", json!(1))])
        .unwrap_err();

    assert!(matches!(err, Error::NotFound(ref key) if key == "w"));
    assert_eq!(storage.get::<i64>("x").unwrap(), 1);
    assert!(!storage.has("w").unwrap());
}

// =============================================================================
// BATCHES IN TRANSACTIONS
// =============================================================================

#[test]
fn test_news_inside_transaction_checks_own_writes() {
    let storage = memory_storage();
    let txn = storage.open_transaction().unwrap();

    txn.new("x", &1).unwrap();
    let err = txn
        .news(&[Item::new("x", json!(2)), Item::new("y", json!(3))])
        .unwrap_err();
    assert!(err.is_already_exists());

    txn.news(&[Item::new("y", json!(3))]).unwrap();
    txn.commit().unwrap();

    assert_eq!(storage.get::<i64>("x").unwrap(), 1);
    assert_eq!(storage.get::<i64>("y").unwrap(), 3);
}
