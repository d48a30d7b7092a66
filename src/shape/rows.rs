//! Table row flattening

use serde::Serialize;
use serde_json::Value;

/// One leaf of a flattened payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    /// Dotted path from the root, e.g. `bitcoin.usd`
    pub key: String,
    /// Leaf value (never an object or array)
    pub value: Value,
}

impl Row {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// Leaf rendered for display: strings unquoted, null as empty
    pub fn display_value(&self) -> String {
        match &self.value {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Flatten a payload into one row per leaf, depth-first in key order
///
/// Arrays are walked like objects keyed by index, so `{"a": [{"b": 1}]}`
/// yields the path `a.0.b`. Empty containers produce no rows, and a payload
/// that is not a container produces none at all.
///
/// ```
/// use finboard::shape::flatten_to_rows;
/// use serde_json::json;
///
/// let rows = flatten_to_rows(&json!({"a": 1, "b": {"c": 2, "d": 3}}));
/// let keys: Vec<_> = rows.iter().map(|r| r.key.as_str()).collect();
/// assert_eq!(keys, ["a", "b.c", "b.d"]);
/// ```
pub fn flatten_to_rows(payload: &Value) -> Vec<Row> {
    let mut rows = Vec::new();
    if matches!(payload, Value::Object(_) | Value::Array(_)) {
        traverse(payload, None, &mut rows);
    }
    rows
}

fn traverse(value: &Value, parent: Option<&str>, rows: &mut Vec<Row>) {
    let mut visit = |key: &str, child: &Value| {
        let path = match parent {
            Some(p) => format!("{}.{}", p, key),
            None => key.to_string(),
        };
        match child {
            Value::Object(_) | Value::Array(_) => traverse(child, Some(&path), rows),
            leaf => rows.push(Row::new(path, leaf.clone())),
        }
    };

    match value {
        Value::Object(map) => {
            for (key, child) in map {
                visit(key.as_str(), child);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                visit(&index.to_string(), child);
            }
        }
        _ => {}
    }
}
