//! Property-based tests for interpose.
//!
//! Run with: cargo test --test property_tests
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold across bags, bounded clones, statistics and media
//! negotiation.

pub mod bag;
pub mod estimator;
pub mod negotiation;

use interpose_core::{DataBag, Value};
use proptest::prelude::*;

/// Arbitrary values nested up to four levels, without floats so equality is
/// total.
pub fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        "[a-z ]{0,8}".prop_map(Value::Text),
    ];
    leaf.prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Value::List),
            prop::collection::vec(("[a-z]{1,6}", inner), 0..8)
                .prop_map(|entries| Value::Bag(entries.into_iter().collect())),
        ]
    })
}

pub fn arb_bag() -> impl Strategy<Value = DataBag> {
    prop::collection::vec(("[a-z]{1,6}", arb_value()), 0..30)
        .prop_map(|entries| entries.into_iter().collect())
}
