//! Plain-text rendering of widget views for the terminal front ends.

use crate::dashboard::WidgetView;
use crate::fetcher::FetchStatus;
use crate::shape::{Projection, Row, SeriesPoint};
use std::fmt::Write;

const SPARK: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Chart points listed below the sparkline
const CHART_TAIL: usize = 5;

/// Render one widget as a block of text
pub fn render_view(view: &WidgetView) -> String {
    let mut out = String::new();
    let widget = &view.widget;

    let _ = writeln!(
        out,
        "{} [{}] every {}s  ({})",
        widget.title, widget.widget_type, widget.api_config.refresh_interval, widget.id
    );

    match view.result.status {
        FetchStatus::Idle => out.push_str("  waiting for first fetch\n"),
        FetchStatus::Loading if view.result.payload.is_none() => out.push_str("  loading…\n"),
        _ => {}
    }
    if let Some(message) = &view.result.error_message {
        let _ = writeln!(out, "  error: {}", message);
    }

    match &view.projection {
        Some(projection) if projection.is_empty() => out.push_str("  (no data)\n"),
        Some(Projection::Card(value)) => {
            let _ = writeln!(out, "  {}", format_number(*value));
        }
        Some(Projection::Table(rows)) => out.push_str(&render_rows(rows)),
        Some(Projection::Chart(points)) => out.push_str(&render_series(points)),
        None => {}
    }

    if let Some(label) = view.result.last_updated_label() {
        let _ = writeln!(out, "  last updated {}", label);
    }
    out
}

/// Card value, or an em dash when the payload had no number
pub fn format_number(value: Option<f64>) -> String {
    match value {
        Some(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", v as i64),
        Some(v) => format!("{}", v),
        None => "—".to_string(),
    }
}

fn render_rows(rows: &[Row]) -> String {
    let width = rows.iter().map(|r| r.key.chars().count()).max().unwrap_or(0);
    let mut out = String::new();
    for row in rows {
        let _ = writeln!(out, "  {:<width$} | {}", row.key, row.display_value(), width = width);
    }
    out
}

fn render_series(points: &[SeriesPoint]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  {}", sparkline(points));

    let min = points.iter().map(|p| p.value).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p.value).fold(f64::NEG_INFINITY, f64::max);
    let _ = writeln!(
        out,
        "  {} points, min={}, max={}",
        points.len(),
        format_number(Some(min)),
        format_number(Some(max))
    );

    for point in points.iter().skip(points.len().saturating_sub(CHART_TAIL)) {
        let _ = writeln!(out, "  {}  {}", point.time, format_number(Some(point.value)));
    }
    out
}

/// One block character per point, scaled between the series min and max
pub fn sparkline(points: &[SeriesPoint]) -> String {
    let min = points.iter().map(|p| p.value).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p.value).fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    points
        .iter()
        .map(|p| {
            if span <= 0.0 || !span.is_finite() {
                SPARK[SPARK.len() / 2]
            } else {
                let idx = ((p.value - min) / span * (SPARK.len() - 1) as f64).round() as usize;
                SPARK[idx.min(SPARK.len() - 1)]
            }
        })
        .collect()
}
