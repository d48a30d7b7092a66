//! Shape Inferencer
//!
//! Pure functions that turn an arbitrary JSON payload into something a
//! widget can display:
//!
//! - **scalar**: the first number found, for cards
//! - **rows**: dotted-path/leaf pairs, for tables
//! - **series**: `(date, value)` points from `prices`, for charts
//!
//! Objects are iterated in the order the upstream API sent their keys
//! (`serde_json` is built with `preserve_order`).

mod rows;
mod scalar;
mod series;

pub use rows::{flatten_to_rows, Row};
pub use scalar::extract_scalar;
pub use series::{extract_series, SeriesPoint, DATE_FORMAT};

use crate::storage::WidgetType;
use serde::Serialize;
use serde_json::Value;

/// A payload projected for one widget type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Projection {
    Card(Option<f64>),
    Table(Vec<Row>),
    Chart(Vec<SeriesPoint>),
}

impl Projection {
    /// Whether there is anything to draw
    pub fn is_empty(&self) -> bool {
        match self {
            Projection::Card(value) => value.is_none(),
            Projection::Table(rows) => rows.is_empty(),
            Projection::Chart(points) => points.is_empty(),
        }
    }
}

/// Project a payload for the given widget type
pub fn project(widget_type: WidgetType, payload: &Value) -> Projection {
    match widget_type {
        WidgetType::Card => Projection::Card(extract_scalar(payload)),
        WidgetType::Table => Projection::Table(flatten_to_rows(payload)),
        WidgetType::Chart => Projection::Chart(extract_series(payload)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_project_by_type() {
        let payload = json!({
            "bitcoin": {"usd": 42000},
            "prices": [[1700000000000_i64, 50000]]
        });

        assert_eq!(
            project(WidgetType::Card, &payload),
            Projection::Card(Some(42000.0))
        );

        match project(WidgetType::Table, &payload) {
            Projection::Table(rows) => {
                assert_eq!(rows[0].key, "bitcoin.usd");
                assert_eq!(rows[1].key, "prices.0.0");
                assert_eq!(rows.len(), 3);
            }
            other => panic!("unexpected projection: {:?}", other),
        }

        match project(WidgetType::Chart, &payload) {
            Projection::Chart(points) => assert_eq!(points.len(), 1),
            other => panic!("unexpected projection: {:?}", other),
        }
    }

    #[test]
    fn test_is_empty() {
        let payload = json!({"status": "ok"});
        assert!(project(WidgetType::Card, &payload).is_empty());
        assert!(!project(WidgetType::Table, &payload).is_empty());
        assert!(project(WidgetType::Chart, &payload).is_empty());
    }
}
