//! Property tests for data bags.
//!
//! Invariants tested:
//! - Entries keep insertion order, duplicates included
//! - `get` returns the first value for a key, `get_all` every value
//! - `remove` drops exactly the entries for one key

use interpose_core::{DataBag, Value};
use proptest::prelude::*;

fn arb_keys() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-e]", 0..40)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn keys_keep_insertion_order(keys in arb_keys()) {
        let bag: DataBag = keys
            .iter()
            .enumerate()
            .map(|(i, k)| (k.clone(), i as i64))
            .collect();

        prop_assert_eq!(bag.len(), keys.len());
        let seen: Vec<&str> = bag.keys().collect();
        prop_assert_eq!(seen, keys.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn lookups_agree_with_positions(keys in arb_keys(), needle in "[a-f]") {
        let bag: DataBag = keys
            .iter()
            .enumerate()
            .map(|(i, k)| (k.clone(), i as i64))
            .collect();

        let positions: Vec<i64> = keys
            .iter()
            .enumerate()
            .filter(|(_, k)| **k == needle)
            .map(|(i, _)| i as i64)
            .collect();

        prop_assert_eq!(bag.get(&needle).and_then(Value::as_int), positions.first().copied());
        let all: Vec<i64> = bag.get_all(&needle).filter_map(Value::as_int).collect();
        prop_assert_eq!(&all, &positions);
        prop_assert_eq!(bag.contains_key(&needle), !positions.is_empty());
    }

    #[test]
    fn remove_drops_only_one_key(keys in arb_keys(), victim in "[a-e]") {
        let mut bag: DataBag = keys.iter().map(|k| (k.clone(), true)).collect();
        let removed = bag.remove(&victim);

        let expected: Vec<&str> = keys
            .iter()
            .map(String::as_str)
            .filter(|k| *k != victim)
            .collect();
        prop_assert_eq!(removed.len(), keys.len() - expected.len());
        prop_assert_eq!(bag.keys().collect::<Vec<_>>(), expected);
    }
}
