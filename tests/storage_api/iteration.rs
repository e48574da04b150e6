//! Iteration Tests
//!
//! Ordering, prefix filtering, sequence numbers and cursor release.

use crate::*;
use ledgerstore::Item;
use serde_json::json;

fn seeded() -> StorageHandle {
    let storage = memory_storage();
    storage
        .news(&[
            Item::new("user:2", json!("bob")),
            Item::new("other:1", json!("x")),
            Item::new("user:1", json!("alice")),
        ])
        .unwrap();
    storage
}

// =============================================================================
// ORDERING
// =============================================================================

#[test]
fn test_full_forward_iteration() {
    let storage = seeded();

    assert_eq!(
        collect_keys(&storage, "", false),
        vec!["other:1", "user:1", "user:2"]
    );
}

#[test]
fn test_full_reverse_iteration() {
    let storage = seeded();

    assert_eq!(
        collect_keys(&storage, "", true),
        vec!["user:2", "user:1", "other:1"]
    );
}

#[test]
fn test_prefix_iteration() {
    let storage = seeded();

    assert_eq!(collect_keys(&storage, "user:", false), vec!["user:1", "user:2"]);
    assert_eq!(collect_keys(&storage, "user:", true), vec!["user:2", "user:1"]);
}

#[test]
fn test_prefix_with_no_match() {
    let storage = seeded();

    assert!(collect_keys(&storage, "nobody:", false).is_empty());
    assert!(collect_keys(&storage, "nobody:", true).is_empty());
    assert_eq!(storage.open_cursors(), 0);
}

#[test]
fn test_byte_order_not_numeric_order() {
    let storage = memory_storage();
    for i in [1, 2, 10] {
        storage.new(&format!("n:{}", i), &i).unwrap();
    }

    assert_eq!(collect_keys(&storage, "n:", false), vec!["n:1", "n:10", "n:2"]);
}

// =============================================================================
// ITEMS
// =============================================================================

#[test]
fn test_sequence_starts_at_zero_both_ways() {
    let storage = seeded();

    for reverse in [false, true] {
        let seqs: Vec<u64> = storage
            .iter("", reverse)
            .unwrap()
            .map(|item| item.sequence)
            .collect();
        assert_eq!(seqs, vec![0, 1, 2]);
    }
}

#[test]
fn test_item_decode() {
    let storage = seeded();

    let names: Vec<String> = storage
        .iter("user:", false)
        .unwrap()
        .map(|item| item.decode::<String>().unwrap())
        .collect();

    assert_eq!(names, vec!["alice", "bob"]);
}

// =============================================================================
// RELEASE
// =============================================================================

#[test]
fn test_exhaustion_releases_cursor() {
    let storage = seeded();
    let mut iter = storage.iter("", false).unwrap();
    assert_eq!(storage.open_cursors(), 1);

    while iter.next().is_some() {}

    assert!(iter.is_released());
    assert_eq!(storage.open_cursors(), 0);
}

#[test]
fn test_early_release_is_idempotent() {
    let storage = seeded();
    let mut iter = storage.iter("", true).unwrap();

    assert!(iter.next().is_some());
    iter.release();
    iter.release();

    assert_eq!(storage.open_cursors(), 0);
    assert!(iter.next().is_none());
}

#[test]
fn test_abandoned_iterator_released_on_drop() {
    let storage = seeded();
    {
        let mut first = storage.iter("", false).unwrap();
        let mut second = storage.iter("user:", true).unwrap();
        first.next();
        second.next();
        assert_eq!(storage.open_cursors(), 2);
    }
    assert_eq!(storage.open_cursors(), 0);
}

#[test]
fn test_iterator_sees_snapshot_at_open() {
    let storage = seeded();
    let iter = storage.iter("user:", false).unwrap();

    storage.new("user:3", &json!("carol")).unwrap();
    storage.remove("user:1").unwrap();

    let keys: Vec<String> = iter.map(|item| item.key_str().into_owned()).collect();
    assert_eq!(keys, vec!["user:1", "user:2"]);
}
