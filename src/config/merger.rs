//! Layering of configuration documents.
//!
//! Config files are merged key by key before they are deserialized:
//! - a key in a later file replaces the same key in an earlier one
//! - an explicit `null` removes the key, restoring the built-in default
//! - an empty file changes nothing

use serde_yaml::{Mapping, Value};

/// Overlay one document on another.
pub fn overlay(base: &Value, overlay: &Value) -> Value {
    let mut result = as_mapping(base);

    for (key, value) in as_mapping(overlay) {
        if value.is_null() {
            result.remove(&key);
        } else {
            result.insert(key, value);
        }
    }

    Value::Mapping(result)
}

/// Merge documents in order, later ones taking precedence.
pub fn merge_configs(configs: &[Value]) -> Value {
    configs
        .iter()
        .fold(Value::Mapping(Mapping::new()), |acc, config| {
            overlay(&acc, config)
        })
}

fn as_mapping(value: &Value) -> Mapping {
    match value {
        Value::Mapping(map) => map.clone(),
        _ => Mapping::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn later_keys_replace_earlier() {
        let result = overlay(
            &yaml("host: https://a\nmax_retries: 3"),
            &yaml("host: https://b"),
        );
        assert_eq!(result["host"], "https://b");
        assert_eq!(result["max_retries"], 3);
    }

    #[test]
    fn null_removes_inherited_value() {
        let result = overlay(
            &yaml("max_concurrency: 4\ntimeout_seconds: 5"),
            &yaml("max_concurrency: null"),
        );
        assert!(result.get("max_concurrency").is_none());
        assert_eq!(result["timeout_seconds"], 5);
    }

    #[test]
    fn empty_file_changes_nothing() {
        let base = yaml("host: https://a");
        let empty: Value = serde_yaml::from_str("").unwrap();
        assert_eq!(overlay(&base, &empty), base);
    }

    #[test]
    fn merge_configs_merges_multiple_in_order() {
        let configs = vec![yaml("a: 1\nb: 2"), yaml("b: 3\nc: 4"), yaml("c: 5")];

        let result = merge_configs(&configs);

        assert_eq!(result["a"], 1);
        assert_eq!(result["b"], 3);
        assert_eq!(result["c"], 5);
    }

    #[test]
    fn merge_of_nothing_is_empty_mapping() {
        assert_eq!(merge_configs(&[]), Value::Mapping(Mapping::new()));
    }
}
