//! Property Tests
//!
//! Random operation sequences checked against a `BTreeMap` model.

use crate::*;
use ledgerstore::Item;
use proptest::prelude::*;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
enum Op {
    New(String, u32),
    Set(String, u32),
    Remove(String),
    News(Vec<(String, u32)>),
}

fn key() -> impl Strategy<Value = String> {
    prop_oneof![
        "user:[a-c]{1,2}",
        "acct:[a-c]{1,2}",
        "[a-z]{1,3}",
    ]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (key(), any::<u32>()).prop_map(|(k, v)| Op::New(k, v)),
        (key(), any::<u32>()).prop_map(|(k, v)| Op::Set(k, v)),
        key().prop_map(Op::Remove),
        prop::collection::vec((key(), any::<u32>()), 1..4).prop_map(Op::News),
    ]
}

/// Apply `op` to the model with the same existence rules as the store
fn apply_model(model: &mut BTreeMap<String, u32>, op: &Op) -> bool {
    match op {
        Op::New(k, v) => {
            if model.contains_key(k) {
                return false;
            }
            model.insert(k.clone(), *v);
        }
        Op::Set(k, v) => {
            if !model.contains_key(k) {
                return false;
            }
            model.insert(k.clone(), *v);
        }
        Op::Remove(k) => {
            if model.remove(k).is_none() {
                return false;
            }
        }
        Op::News(items) => {
            if items.iter().any(|(k, _)| model.contains_key(k)) {
                return false;
            }
            for (k, v) in items {
                model.insert(k.clone(), *v);
            }
        }
    }
    true
}

fn apply_storage(storage: &StorageHandle, op: &Op) -> bool {
    let result = match op {
        Op::New(k, v) => storage.new(k, v),
        Op::Set(k, v) => storage.set(k, v),
        Op::Remove(k) => storage.remove(k),
        Op::News(items) => {
            let items: Vec<Item<u32>> = items.iter().map(|(k, v)| Item::new(k.clone(), *v)).collect();
            storage.news(&items)
        }
    };
    result.is_ok()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_store_matches_model(ops in prop::collection::vec(op(), 1..40)) {
        let storage = StorageHandle::open(&Config::memory()).unwrap();
        let mut model = BTreeMap::new();

        for op in &ops {
            let expected = apply_model(&mut model, op);
            prop_assert_eq!(apply_storage(&storage, op), expected, "op {:?}", op);
        }

        for (k, v) in &model {
            prop_assert_eq!(storage.get::<u32>(k).unwrap(), *v);
        }

        let forward = collect_keys(&storage, "", false);
        let expected: Vec<String> = model.keys().cloned().collect();
        prop_assert_eq!(&forward, &expected);

        let mut reverse = collect_keys(&storage, "", true);
        reverse.reverse();
        prop_assert_eq!(&reverse, &expected);

        let users = collect_keys(&storage, "user:", false);
        let expected_users: Vec<String> =
            expected.iter().filter(|k| k.starts_with("user:")).cloned().collect();
        prop_assert_eq!(users, expected_users);

        prop_assert_eq!(storage.open_cursors(), 0);
    }

    #[test]
    fn test_discarded_transaction_changes_nothing(ops in prop::collection::vec(op(), 1..20)) {
        let storage = StorageHandle::open(&Config::memory()).unwrap();
        storage.new("seed", &1u32).unwrap();
        let before = collect_keys(&storage, "", false);

        let txn = storage.open_transaction().unwrap();
        for op in &ops {
            apply_storage(&txn, op);
        }
        txn.discard().unwrap();

        prop_assert_eq!(collect_keys(&storage, "", false), before);
    }
}
