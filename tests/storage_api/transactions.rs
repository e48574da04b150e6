//! Transaction Tests
//!
//! Isolation, commit/discard lifecycle and conflicts.

use crate::*;
use ledgerstore::{Error, Item};
use serde_json::json;
use std::sync::{Arc, Barrier};
use std::thread;

// =============================================================================
// LIFECYCLE
// =============================================================================

#[test]
fn test_discard_leaves_root_untouched() {
    let storage = memory_storage();
    let txn = storage.open_transaction().unwrap();

    txn.new("z", &json!("9")).unwrap();
    txn.discard().unwrap();

    assert!(!storage.has("z").unwrap());
}

#[test]
fn test_commit_publishes_writes() {
    let storage = memory_storage();
    let txn = storage.open_transaction().unwrap();

    txn.new("z", &json!("9")).unwrap();
    assert!(!storage.has("z").unwrap());
    txn.commit().unwrap();

    assert_eq!(storage.get::<String>("z").unwrap(), "9");
}

#[test]
fn test_nested_transaction_rejected() {
    let storage = memory_storage();
    let txn = storage.open_transaction().unwrap();

    assert!(matches!(
        txn.open_transaction(),
        Err(Error::NoNestedTransaction)
    ));
}

#[test]
fn test_commit_and_discard_need_a_transaction() {
    let storage = memory_storage();

    assert!(matches!(storage.commit(), Err(Error::NotATransaction)));
    assert!(matches!(storage.discard(), Err(Error::NotATransaction)));
}

#[test]
fn test_transaction_ends_exactly_once() {
    let storage = memory_storage();

    let committed = storage.open_transaction().unwrap();
    committed.commit().unwrap();
    assert!(matches!(committed.commit(), Err(Error::TransactionClosed)));
    assert!(matches!(committed.discard(), Err(Error::TransactionClosed)));

    let discarded = storage.open_transaction().unwrap();
    discarded.discard().unwrap();
    assert!(matches!(discarded.discard(), Err(Error::TransactionClosed)));
    assert!(matches!(discarded.new("k", &1), Err(Error::TransactionClosed)));
}

#[test]
fn test_dropped_transaction_is_discarded() {
    let storage = memory_storage();
    {
        let txn = storage.open_transaction().unwrap();
        txn.new("z", &1).unwrap();
    }
    assert!(!storage.has("z").unwrap());
}

#[test]
fn test_close_through_transaction_closes_storage() {
    let storage = memory_storage();
    let txn = storage.open_transaction().unwrap();

    txn.close().unwrap();

    assert!(storage.has("k").unwrap_err().is_closed());
    assert!(txn.commit().unwrap_err().is_closed());
}

// =============================================================================
// ISOLATION
// =============================================================================

#[test]
fn test_transaction_reads_its_own_writes() {
    let storage = memory_storage();
    storage.new("a", &1).unwrap();

    let txn = storage.open_transaction().unwrap();
    txn.set("a", &2).unwrap();
    txn.new("b", &3).unwrap();
    txn.remove("a").unwrap();

    assert!(!txn.has("a").unwrap());
    assert_eq!(txn.get::<i32>("b").unwrap(), 3);
    assert_eq!(storage.get::<i32>("a").unwrap(), 1);
}

#[test]
fn test_transaction_does_not_see_later_root_writes() {
    let storage = memory_storage();
    let txn = storage.open_transaction().unwrap();

    storage.new("late", &1).unwrap();

    assert!(!txn.has("late").unwrap());
}

#[test]
fn test_transaction_iteration_overlays_writes() {
    let storage = memory_storage();
    storage
        .news(&[
            Item::new("user:1", json!("alice")),
            Item::new("user:2", json!("bob")),
        ])
        .unwrap();

    let txn = storage.open_transaction().unwrap();
    txn.remove("user:1").unwrap();
    txn.new("user:3", &json!("carol")).unwrap();

    assert_eq!(collect_keys(&txn, "user:", false), vec!["user:2", "user:3"]);
    assert_eq!(collect_keys(&txn, "user:", true), vec!["user:3", "user:2"]);
    assert_eq!(collect_keys(&storage, "user:", false), vec!["user:1", "user:2"]);
    assert_eq!(storage.open_cursors(), 0);
}

// =============================================================================
// CONFLICTS
// =============================================================================

#[test]
fn test_conflicting_commits() {
    let storage = memory_storage();
    storage.new("balance", &100).unwrap();

    let t1 = storage.open_transaction().unwrap();
    let t2 = storage.open_transaction().unwrap();

    let b1: i32 = t1.get("balance").unwrap();
    let b2: i32 = t2.get("balance").unwrap();
    t1.set("balance", &(b1 - 10)).unwrap();
    t2.set("balance", &(b2 - 20)).unwrap();

    t1.commit().unwrap();
    let err = t2.commit().unwrap_err();

    assert!(err.is_conflict());
    assert!(err.is_retryable());
    assert_eq!(storage.get::<i32>("balance").unwrap(), 90);
}

#[test]
fn test_root_write_conflicts_with_transaction() {
    let storage = memory_storage();
    let txn = storage.open_transaction().unwrap();
    txn.new("k", &"txn").unwrap();

    storage.new("k", &"root").unwrap();

    assert!(txn.commit().unwrap_err().is_conflict());
    assert_eq!(storage.get::<String>("k").unwrap(), "root");
}

#[test]
fn test_disjoint_transactions_both_commit() {
    let storage = memory_storage();
    let t1 = storage.open_transaction().unwrap();
    let t2 = storage.open_transaction().unwrap();

    t1.new("a", &1).unwrap();
    t2.new("b", &2).unwrap();

    t1.commit().unwrap();
    t2.commit().unwrap();

    assert!(storage.has("a").unwrap());
    assert!(storage.has("b").unwrap());
}

#[test]
fn test_concurrent_increments_with_retry() {
    const THREADS: usize = 4;
    const ROUNDS: usize = 25;

    let storage = Arc::new(memory_storage());
    storage.new("counter", &0u64).unwrap();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let storage = Arc::clone(&storage);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..ROUNDS {
                    loop {
                        let txn = storage.open_transaction().unwrap();
                        let n: u64 = txn.get("counter").unwrap();
                        txn.set("counter", &(n + 1)).unwrap();
                        match txn.commit() {
                            Ok(()) => break,
                            Err(e) if e.is_retryable() => continue,
                            Err(e) => panic!("unexpected error: {}", e),
                        }
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(
        storage.get::<u64>("counter").unwrap(),
        (THREADS * ROUNDS) as u64
    );
}
