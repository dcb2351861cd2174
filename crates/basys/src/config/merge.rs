// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Pure deep-merge over `serde_json::Value`.
//!
//! Configuration resolution always uses [`ArrayMerge::Replace`]: a later
//! array fully overrides an earlier one, never concatenates. This is a
//! deliberate deviation from deep-merge-everything semantics so that a
//! manifest can narrow a default list (e.g. `browsers`) instead of only
//! extending it.

use serde_json::Value;

/// How arrays combine when both sides of a merge carry one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayMerge {
    /// The override array wins wholesale.
    Replace,
    /// Base elements followed by override elements.
    Concat,
}

/// Deep-merges `over` onto `base` and returns the result.
///
/// Objects merge key-by-key recursively; any other pairing resolves to a
/// clone of `over` (including explicit `null`, which overrides). Array
/// behavior is controlled by `arrays`.
pub fn merge(base: &Value, over: &Value, arrays: ArrayMerge) -> Value {
    match (base, over) {
        (Value::Object(base), Value::Object(over)) => {
            let mut merged = base.clone();
            for (key, value) in over {
                let combined = match merged.get(key) {
                    Some(existing) => merge(existing, value, arrays),
                    None => value.clone(),
                };
                merged.insert(key.clone(), combined);
            }
            Value::Object(merged)
        }
        (Value::Array(base), Value::Array(over)) => match arrays {
            ArrayMerge::Replace => Value::Array(over.clone()),
            ArrayMerge::Concat => {
                let mut items = base.clone();
                items.extend(over.iter().cloned());
                Value::Array(items)
            }
        },
        _ => over.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_override() {
        let base = json!({"port": 8080, "host": "localhost"});
        let over = json!({"port": 9000});
        assert_eq!(
            merge(&base, &over, ArrayMerge::Replace),
            json!({"port": 9000, "host": "localhost"})
        );
    }

    #[test]
    fn test_nested_objects_merge() {
        let base = json!({"custom": {"a": 1, "b": 2}});
        let over = json!({"custom": {"b": 3, "c": 4}});
        assert_eq!(
            merge(&base, &over, ArrayMerge::Replace),
            json!({"custom": {"a": 1, "b": 3, "c": 4}})
        );
    }

    #[test]
    fn test_arrays_replace_not_concat() {
        let base = json!({"browsers": ["> 1%", "last 2 versions"]});
        let over = json!({"browsers": ["ie11"]});
        assert_eq!(
            merge(&base, &over, ArrayMerge::Replace),
            json!({"browsers": ["ie11"]})
        );
    }

    #[test]
    fn test_arrays_concat_mode() {
        let base = json!([1, 2]);
        let over = json!([3]);
        assert_eq!(merge(&base, &over, ArrayMerge::Concat), json!([1, 2, 3]));
    }

    #[test]
    fn test_null_overrides() {
        let base = json!({"entry": "main.js"});
        let over = json!({"entry": null});
        assert_eq!(
            merge(&base, &over, ArrayMerge::Replace),
            json!({"entry": null})
        );
    }

    #[test]
    fn test_type_change_overrides() {
        let base = json!({"poll": false});
        let over = json!({"poll": 300});
        assert_eq!(
            merge(&base, &over, ArrayMerge::Replace),
            json!({"poll": 300})
        );
    }
}
