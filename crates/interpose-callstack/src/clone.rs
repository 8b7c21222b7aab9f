//! Depth- and length-bounded copies of data bags.
//!
//! Snapshots are taken on every monitored invocation, so their cost must not
//! depend on how large or deeply nested the payload is. A bounded clone
//! copies at most `max_length` entries per level and stops descending into
//! containers once `max_depth` levels have been copied. The top-level bag is
//! level 1.

use interpose_core::{DataBag, Value};

/// Key of the entry appended to a bag that had more than `max_length`
/// entries.
pub const TRUNCATION_KEY: &str = "...";

/// Text substituted for containers below `max_depth`.
pub const DEPTH_PLACEHOLDER: &str = "<max depth reached>";

/// Bounds applied by [`bounded_clone`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloneLimits {
    /// Number of nesting levels copied, counting the top-level bag.
    pub max_depth: usize,
    /// Entries copied per bag or list.
    pub max_length: usize,
}

impl CloneLimits {
    /// Creates limits.
    pub fn new(max_depth: usize, max_length: usize) -> Self {
        Self {
            max_depth,
            max_length,
        }
    }
}

impl Default for CloneLimits {
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_length: 20,
        }
    }
}

/// Copies `bag` within `limits`.
pub fn bounded_clone(bag: &DataBag, limits: CloneLimits) -> DataBag {
    clone_bag(bag, limits, 1)
}

fn clone_bag(bag: &DataBag, limits: CloneLimits, depth: usize) -> DataBag {
    let kept = bag.len().min(limits.max_length);
    let mut copy = DataBag::with_capacity(kept + 1);
    for (key, value) in bag.iter().take(limits.max_length) {
        copy.insert(key, clone_value(value, limits, depth));
    }
    if bag.len() > limits.max_length {
        copy.insert(TRUNCATION_KEY, truncation_note(bag.len() - kept));
    }
    copy
}

fn clone_list(items: &[Value], limits: CloneLimits, depth: usize) -> Vec<Value> {
    let kept = items.len().min(limits.max_length);
    let mut copy = Vec::with_capacity(kept + 1);
    copy.extend(
        items
            .iter()
            .take(limits.max_length)
            .map(|item| clone_value(item, limits, depth)),
    );
    if items.len() > limits.max_length {
        copy.push(truncation_note(items.len() - kept));
    }
    copy
}

fn clone_value(value: &Value, limits: CloneLimits, depth: usize) -> Value {
    match value {
        Value::Bag(_) | Value::List(_) if depth >= limits.max_depth => {
            Value::Text(DEPTH_PLACEHOLDER.to_string())
        }
        Value::Bag(bag) => Value::Bag(clone_bag(bag, limits, depth + 1)),
        Value::List(items) => Value::List(clone_list(items, limits, depth + 1)),
        scalar => scalar.clone(),
    }
}

fn truncation_note(omitted: usize) -> Value {
    Value::Text(format!("<{omitted} more entries>"))
}
