//! Dotted-path access into JSON trees.
//!
//! Paths are dot-separated object keys: `"db.pool.size"` addresses
//! `{"db": {"pool": {"size": ..}}}`. Arrays are not indexed.

use serde_json::{Map, Value};

/// Reads the value at `path`.
///
/// Returns `None` if any segment is missing or crosses a non-object value.
///
/// ```
/// use handlr_core::path::pick;
/// use serde_json::json;
///
/// let tree = json!({ "user": { "name": "ada" } });
/// assert_eq!(pick(&tree, "user.name"), Some(&json!("ada")));
/// assert_eq!(pick(&tree, "user.age"), None);
/// ```
#[must_use]
pub fn pick<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, segment| current.as_object()?.get(segment))
}

/// Reads the value at `path` starting from an object map.
#[must_use]
pub fn pick_in<'a>(map: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let (head, rest) = split_first(path);
    let value = map.get(head)?;
    match rest {
        Some(rest) => pick(value, rest),
        None => Some(value),
    }
}

/// Writes `value` at `path`, creating intermediate objects.
///
/// Intermediate values that are not objects are replaced by empty objects.
///
/// ```
/// use handlr_core::path::put;
/// use serde_json::{json, Map};
///
/// let mut tree = Map::new();
/// put(&mut tree, "db.pool.size", json!(8));
/// assert_eq!(serde_json::Value::Object(tree), json!({ "db": { "pool": { "size": 8 } } }));
/// ```
pub fn put(map: &mut Map<String, Value>, path: &str, value: Value) {
    let (head, rest) = split_first(path);
    match rest {
        None => {
            map.insert(head.to_string(), value);
        }
        Some(rest) => {
            let slot = map
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            if let Value::Object(inner) = slot {
                put(inner, rest, value);
            }
        }
    }
}

/// Removes and returns the value at `path`.
pub fn remove(map: &mut Map<String, Value>, path: &str) -> Option<Value> {
    let (head, rest) = split_first(path);
    match rest {
        None => map.remove(head),
        Some(rest) => match map.get_mut(head)? {
            Value::Object(inner) => remove(inner, rest),
            _ => None,
        },
    }
}

fn split_first(path: &str) -> (&str, Option<&str>) {
    match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    }
}
