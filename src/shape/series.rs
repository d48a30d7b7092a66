//! Chart series extraction

use chrono::DateTime;
use serde::Serialize;
use serde_json::Value;

/// Display format for point labels
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One point of a line chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    /// Formatted date label (UTC)
    pub time: String,
    /// Unix timestamp in milliseconds, as received
    pub timestamp: i64,
    pub value: f64,
}

/// Read `payload.prices` as `[timestampMillis, value]` pairs
///
/// Points keep the upstream order; nothing is sorted, resampled or filled.
/// If `prices` is missing, or any entry is not a pair of numbers with a
/// representable timestamp, the whole series is empty.
///
/// ```
/// use finboard::shape::extract_series;
/// use serde_json::json;
///
/// let series = extract_series(&json!({"prices": [[1700000000000_i64, 50000], [1700003600000_i64, 50500]]}));
/// assert_eq!(series.len(), 2);
/// assert!(extract_series(&json!({})).is_empty());
/// ```
pub fn extract_series(payload: &Value) -> Vec<SeriesPoint> {
    let Some(Value::Array(prices)) = payload.get("prices") else {
        return Vec::new();
    };

    prices
        .iter()
        .map(parse_point)
        .collect::<Option<Vec<_>>>()
        .unwrap_or_default()
}

fn parse_point(entry: &Value) -> Option<SeriesPoint> {
    let [ts, value] = entry.as_array()?.as_slice() else {
        return None;
    };

    let timestamp = match ts.as_i64() {
        Some(t) => t,
        None => ts.as_f64().filter(|f| f.is_finite())? as i64,
    };
    let value = value.as_f64()?;
    let time = DateTime::from_timestamp_millis(timestamp)?
        .format(DATE_FORMAT)
        .to_string();

    Some(SeriesPoint {
        time,
        timestamp,
        value,
    })
}
