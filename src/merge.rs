//! Deep merging of configuration and front matter trees.
//!
//! Every layered data source in the crate (built-in defaults vs. the user's
//! config file, site vs. collection vs. file front matter, accumulated
//! layout/partial data) combines through the one merge function here, so the
//! precedence rules stay identical across all of them:
//!
//! - mapping + mapping: merged recursively
//! - sequence + sequence: union, base order first, overlay's new elements
//!   appended, duplicates removed by value equality
//! - anything else: the overlay value replaces the base value
//!
//! Merging a precedence chain `A < B < C` pairwise in either grouping yields
//! the same tree; context assembly depends on that property.

use serde_json::{Map, Value};

/// Object map alias used throughout the crate for front matter and contexts.
pub type Tree = Map<String, Value>;

/// Deep-merge `overlay` over `base` into a new value. Inputs are unchanged.
///
/// Keys present only in `base` are retained; keys only in `overlay` are
/// added; for keys in both, the rules above apply with `overlay` winning.
pub fn merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => Value::Object(merge_trees(base, overlay)),
        (Value::Array(base), Value::Array(overlay)) => {
            let mut out = base.clone();
            for item in overlay {
                if !out.contains(item) {
                    out.push(item.clone());
                }
            }
            Value::Array(out)
        }
        _ => overlay.clone(),
    }
}

/// Deep-merge two object maps. Convenience over [`merge`] for the common
/// case where both sides are known to be mappings.
pub fn merge_trees(base: &Tree, overlay: &Tree) -> Tree {
    let mut out = base.clone();
    for (key, overlay_value) in overlay {
        match out.get_mut(key) {
            Some(base_value) => {
                let merged = merge(base_value, overlay_value);
                *base_value = merged;
            }
            None => {
                out.insert(key.clone(), overlay_value.clone());
            }
        }
    }
    out
}
