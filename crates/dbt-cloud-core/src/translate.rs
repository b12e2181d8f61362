//! Flat option keys <-> nested payload translation
//!
//! CLI flags for nested payloads arrive as flat keys joined with `__`
//! (`settings__threads`). [`unflatten`] turns that flat map into the
//! nested object a command is constructed from; [`flatten`] is its exact
//! inverse for trees whose leaves are all scalars.

use serde_json::{Map, Value};

/// Separator between nested path segments in a flat option key.
pub const KEY_SEPARATOR: &str = "__";

/// Build a nested object from `__`-delimited flat keys.
///
/// Each key is split on [`KEY_SEPARATOR`] and rebuilt bottom-up as a chain
/// of single-key objects, then deep-merged into the accumulator. When two
/// keys disagree on a leaf, the later key in the map's iteration order
/// wins (lexicographic for `serde_json::Map`), which keeps the merge
/// deterministic. Empty segments produced by leading or trailing
/// separators are dropped, so `__job_id` addresses the top-level
/// `job_id`.
pub fn unflatten(flat: Map<String, Value>) -> Value {
    let mut root = Value::Object(Map::new());
    for (key, value) in flat {
        let mut nested = value;
        let segments: Vec<&str> = key.split(KEY_SEPARATOR).filter(|s| !s.is_empty()).collect();
        for segment in segments.into_iter().rev() {
            let mut wrapper = Map::new();
            wrapper.insert(segment.to_string(), nested);
            nested = Value::Object(wrapper);
        }
        deep_merge(&mut root, nested);
    }
    root
}

/// Flatten a nested object into `__`-delimited keys.
///
/// The exact inverse of [`unflatten`] for all-scalar-leaf trees; arrays
/// are treated as leaves.
pub fn flatten(nested: &Value) -> Map<String, Value> {
    let mut flat = Map::new();
    flatten_into(nested, "", &mut flat);
    flat
}

fn flatten_into(value: &Value, prefix: &str, out: &mut Map<String, Value>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}{KEY_SEPARATOR}{key}")
                };
                flatten_into(child, &path, out);
            }
        }
        leaf => {
            out.insert(prefix.to_string(), leaf.clone());
        }
    }
}

/// Deep-merge `incoming` into `target`. Objects merge key-wise; anything
/// else replaces the existing value (last writer wins).
fn deep_merge(target: &mut Value, incoming: Value) {
    match (target, incoming) {
        (Value::Object(target_map), Value::Object(incoming_map)) => {
            for (key, value) in incoming_map {
                match target_map.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        target_map.insert(key, value);
                    }
                }
            }
        }
        (target_slot, incoming_value) => *target_slot = incoming_value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flat(entries: &[(&str, Value)]) -> Map<String, Value> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn merges_siblings_under_one_parent() {
        let nested = unflatten(flat(&[("a__b", json!(1)), ("a__c", json!(2))]));
        assert_eq!(nested, json!({"a": {"b": 1, "c": 2}}));
    }

    #[test]
    fn merges_mixed_depths() {
        let nested = unflatten(flat(&[("a__b__c", json!("x")), ("a__d", json!("y"))]));
        assert_eq!(nested, json!({"a": {"b": {"c": "x"}, "d": "y"}}));
    }

    #[test]
    fn translates_flat_and_nested_options_together() {
        let nested = unflatten(flat(&[
            ("project_id", json!(12345)),
            ("settings__threads", json!(4)),
            ("foo__bar__baz", json!("apple")),
            ("foo__baz", json!("orange")),
        ]));
        assert_eq!(
            nested,
            json!({
                "project_id": 12345,
                "settings": {"threads": 4},
                "foo": {"bar": {"baz": "apple"}, "baz": "orange"},
            })
        );
    }

    #[test]
    fn empty_segments_collapse() {
        let nested = unflatten(flat(&[("__job_id", json!(7)), ("cause__", json!("ci"))]));
        assert_eq!(nested, json!({"job_id": 7, "cause": "ci"}));
    }

    #[test]
    fn key_without_separator_is_top_level() {
        let nested = unflatten(flat(&[("name", json!("nightly"))]));
        assert_eq!(nested, json!({"name": "nightly"}));
    }

    #[test]
    fn leaf_conflict_is_last_writer_wins() {
        // Iteration order for serde_json::Map is lexicographic, so
        // "a__b" is applied after "a" and replaces the scalar leaf.
        let mut entries = Map::new();
        entries.insert("a".to_string(), json!("flat"));
        entries.insert("a__b".to_string(), json!(1));
        assert_eq!(unflatten(entries), json!({"a": {"b": 1}}));
    }

    #[test]
    fn flatten_unflatten_round_trip() {
        let original = json!({
            "name": "nightly",
            "settings": {"threads": 4, "target_name": "default"},
            "schedule": {"cron": "0 * * * *", "date": {"type": "every_day"}},
            "generate_docs": false,
        });
        let round_tripped = unflatten(flatten(&original));
        assert_eq!(round_tripped, original);
    }

    #[test]
    fn flatten_produces_delimited_keys() {
        let flat = flatten(&json!({"settings": {"threads": 4}, "state": 1}));
        assert_eq!(flat.get("settings__threads"), Some(&json!(4)));
        assert_eq!(flat.get("state"), Some(&json!(1)));
    }
}
