//! Tree materialization and deep merging.
//!
//! Service trees and Compose documents are insertion-ordered YAML mappings.
//! Entries are turned into nested mappings with [`materialize`] and combined
//! with [`merge`], which follows one rule everywhere:
//!
//! - sequences concatenate, preserving order and duplicates,
//! - mappings merge key by key, keeping the position of existing keys,
//! - anything else takes the overlay value.

use serde_yaml::{Mapping, Value};

use crate::entry::Entry;

/// Build the nested mapping addressed by `entry.path()` with the entry's
/// value at the leaf.
///
/// An inert entry (empty path) materializes to an empty mapping.
///
/// # Examples
///
/// ```
/// use runcompose_core::{entry::Entry, tree};
///
/// let tree = tree::materialize(&Entry::new("logging/driver", "syslog"));
/// assert_eq!(tree::get_path(&tree, "logging/driver").and_then(|v| v.as_str()), Some("syslog"));
/// ```
pub fn materialize(entry: &Entry) -> Mapping {
    let mut segments = entry.segments().rev();

    let Some(leaf_key) = segments.next() else {
        return Mapping::new();
    };

    let leaf = singleton(leaf_key, entry.value().clone());
    segments.fold(leaf, |inner, key| singleton(key, Value::Mapping(inner)))
}

/// Merge `entry` into `tree`.
pub fn apply(tree: &mut Mapping, entry: &Entry) {
    merge_mapping(tree, materialize(entry));
}

/// Deep merge two values, `overlay` taking precedence at scalar leaves.
pub fn merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Sequence(mut base), Value::Sequence(overlay)) => {
            base.extend(overlay);
            Value::Sequence(base)
        }
        (Value::Mapping(mut base), Value::Mapping(overlay)) => {
            merge_mapping(&mut base, overlay);
            Value::Mapping(base)
        }
        (_, overlay) => overlay,
    }
}

/// Deep merge `overlay` into `base` in place.
///
/// Keys already present in `base` keep their position; new keys are
/// appended in `overlay` order.
pub fn merge_mapping(base: &mut Mapping, overlay: Mapping) {
    for (key, value) in overlay {
        match base.get_mut(&key) {
            Some(existing) => {
                let current = std::mem::replace(existing, Value::Null);
                *existing = merge(current, value);
            }
            None => {
                base.insert(key, value);
            }
        }
    }
}

/// Look up a slash-delimited path in `tree`.
pub fn get_path<'a>(tree: &'a Mapping, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('/').filter(|segment| !segment.is_empty());
    let first = segments.next()?;

    segments.try_fold(tree.get(first)?, |value, segment| {
        value.as_mapping()?.get(segment)
    })
}

/// Create a single-key mapping.
pub fn singleton(key: &str, value: Value) -> Mapping {
    let mut mapping = Mapping::new();
    mapping.insert(Value::from(key), value);
    mapping
}
