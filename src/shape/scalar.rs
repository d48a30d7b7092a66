//! Card value extraction

use serde_json::Value;

/// Find the headline number of a payload
///
/// Top-level entries are scanned in order and the first number wins. When an
/// entry is a container, its own entries are scanned (one level only) before
/// moving on to the next top-level entry.
///
/// ```
/// use finboard::shape::extract_scalar;
/// use serde_json::json;
///
/// assert_eq!(extract_scalar(&json!({"bitcoin": {"usd": 42000}})), Some(42000.0));
/// assert_eq!(extract_scalar(&json!({"a": "text", "b": {"c": "text"}})), None);
/// ```
pub fn extract_scalar(payload: &Value) -> Option<f64> {
    entries(payload).find_map(|value| match value {
        Value::Number(n) => n.as_f64(),
        Value::Object(_) | Value::Array(_) => entries(value).find_map(Value::as_f64),
        _ => None,
    })
}

/// Child values of a container in iteration order; nothing for scalars
fn entries(value: &Value) -> Box<dyn Iterator<Item = &Value> + '_> {
    match value {
        Value::Object(map) => Box::new(map.values()),
        Value::Array(items) => Box::new(items.iter()),
        _ => Box::new(std::iter::empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_number() {
        assert_eq!(
            extract_scalar(&json!({"bitcoin": {"usd": 42000}})),
            Some(42000.0)
        );
    }

    #[test]
    fn test_no_number() {
        assert_eq!(extract_scalar(&json!({"a": "text", "b": {"c": "text"}})), None);
    }

    #[test]
    fn test_top_level_number_first_in_order() {
        let payload = json!({"name": "ETH", "price": 2300.5, "volume": 10});
        assert_eq!(extract_scalar(&payload), Some(2300.5));
    }

    #[test]
    fn test_earlier_nested_beats_later_top_level() {
        let payload = json!({"quote": {"label": "x", "last": 7}, "count": 1});
        assert_eq!(extract_scalar(&payload), Some(7.0));
    }

    #[test]
    fn test_only_one_level_deep() {
        let payload = json!({"data": {"inner": {"value": 5}}});
        assert_eq!(extract_scalar(&payload), None);
    }

    #[test]
    fn test_arrays_and_nulls() {
        assert_eq!(extract_scalar(&json!({"prices": [3, 4]})), Some(3.0));
        assert_eq!(extract_scalar(&json!({"a": null, "b": 2})), Some(2.0));
        assert_eq!(extract_scalar(&json!([1.5, 2])), Some(1.5));
    }

    #[test]
    fn test_non_container_payload() {
        assert_eq!(extract_scalar(&json!(42)), None);
        assert_eq!(extract_scalar(&json!("42")), None);
        assert_eq!(extract_scalar(&Value::Null), None);
    }
}
