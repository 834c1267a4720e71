// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Lookups over loosely-shaped JSON.

use serde_json::{Map, Value};

/// Case-insensitive property lookup for document objects.
pub trait JsonObjectExt {
    /// Exact match first, then the first key equal ignoring ASCII case.
    fn get_ignore_case(&self, key: &str) -> Option<&Value>;

    fn str_ignore_case(&self, key: &str) -> Option<&str> {
        self.get_ignore_case(key).and_then(Value::as_str)
    }

    fn f64_ignore_case(&self, key: &str) -> Option<f64> {
        self.get_ignore_case(key).and_then(Value::as_f64)
    }
}

impl JsonObjectExt for Map<String, Value> {
    fn get_ignore_case(&self, key: &str) -> Option<&Value> {
        self.get(key).or_else(|| {
            self.iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v)
        })
    }
}

/// Follows a dotted path through objects and arrays (`"a.items.0.name"`).
///
/// Returns `None` for a blank path or when any segment does not resolve.
pub fn value_at_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.trim().is_empty() {
        return None;
    }

    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// `value` when `path` is absent, otherwise the value the path selects.
pub fn select<'a>(value: &'a Value, path: Option<&str>) -> Option<&'a Value> {
    match path {
        Some(path) => value_at_path(value, path),
        None => Some(value),
    }
}

pub fn to_pretty(value: &Value) -> String {
    format!("{:#}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_ignore_case_prefers_exact_key() {
        let map = json!({"name": "lower", "Name": "exact"});
        let map = map.as_object().unwrap();
        assert_eq!(map.str_ignore_case("Name"), Some("exact"));
        assert_eq!(map.get_ignore_case("missing"), None);

        let only_lower = json!({"name": "lower"});
        let only_lower = only_lower.as_object().unwrap();
        assert_eq!(only_lower.str_ignore_case("NAME"), Some("lower"));
    }

    #[test]
    fn test_value_at_path_walks_objects_and_arrays() {
        let payload = json!({"Parameters": [{"Timestamp": 1}, {"Answer": 42}]});
        assert_eq!(value_at_path(&payload, "Parameters.1.Answer"), Some(&json!(42)));
        assert_eq!(value_at_path(&payload, "Parameters.5"), None);
        assert_eq!(value_at_path(&payload, "Parameters.x"), None);
        assert_eq!(value_at_path(&payload, ""), None);
    }

    #[test]
    fn test_select_without_path_is_identity() {
        let payload = json!({"a": 1});
        assert_eq!(select(&payload, None), Some(&payload));
        assert_eq!(select(&payload, Some("a")), Some(&json!(1)));
    }
}
