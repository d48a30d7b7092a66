//! Core data types for the Finboard widget store
//!
//! This module defines the fundamental types persisted by the storage layer:
//! - `Widget`: A user-defined binding between a display type and a JSON API
//! - `WidgetType`: How the widget's payload is rendered
//! - `ApiConfig`: Where the data comes from and how often it is refreshed
//! - `WidgetId`: Opaque, time-ordered identifier

use chrono::Utc;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Refresh cadence used when a widget does not specify one (seconds)
pub const DEFAULT_REFRESH_SECS: u64 = 10;

/// Opaque widget identifier
///
/// Generated ids are a millisecond timestamp followed by a short random
/// suffix, so they sort in creation order and never collide within one
/// process even when created in the same millisecond.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(String);

impl WidgetId {
    /// Generate a fresh id
    pub fn generate() -> Self {
        let millis = Utc::now().timestamp_millis();
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!("{}-{}", millis, &suffix[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WidgetId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for WidgetId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for WidgetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a widget renders its payload
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WidgetType {
    /// A single headline number
    Card,
    /// Flattened key/value rows
    Table,
    /// A time/value line chart
    Chart,
}

impl WidgetType {
    /// Get all widget types for iteration
    pub fn all() -> &'static [WidgetType] {
        &[WidgetType::Card, WidgetType::Table, WidgetType::Chart]
    }
}

impl std::fmt::Display for WidgetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WidgetType::Card => write!(f, "card"),
            WidgetType::Table => write!(f, "table"),
            WidgetType::Chart => write!(f, "chart"),
        }
    }
}

impl std::str::FromStr for WidgetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "card" => Ok(WidgetType::Card),
            "table" => Ok(WidgetType::Table),
            "chart" => Ok(WidgetType::Chart),
            other => Err(format!(
                "Unknown widget type: {}. Use: card, table, chart",
                other
            )),
        }
    }
}

/// Data source configuration for a widget
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    /// Absolute HTTP(S) endpoint returning JSON
    pub url: String,
    /// Poll cadence in seconds
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,
}

fn default_refresh_interval() -> u64 {
    DEFAULT_REFRESH_SECS
}

impl ApiConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            refresh_interval: DEFAULT_REFRESH_SECS,
        }
    }

    /// Builder: set refresh interval in seconds
    pub fn refresh_interval(mut self, secs: u64) -> Self {
        self.refresh_interval = secs;
        self
    }

    /// Refresh interval as a `Duration`
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.refresh_interval)
    }
}

/// A dashboard widget
///
/// Widgets are immutable once created: to change the type or data source,
/// remove the widget and create a new one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    pub id: WidgetId,
    pub title: String,
    #[serde(rename = "type")]
    pub widget_type: WidgetType,
    pub api_config: ApiConfig,
}

impl Widget {
    /// Create a new widget with a freshly generated id
    pub fn new(title: impl Into<String>, widget_type: WidgetType, api_config: ApiConfig) -> Self {
        Self {
            id: WidgetId::generate(),
            title: title.into(),
            widget_type,
            api_config,
        }
    }

    /// Builder: use a caller-supplied id
    pub fn with_id(mut self, id: impl Into<WidgetId>) -> Self {
        self.id = id.into();
        self
    }

    /// Check the widget's own invariants (uniqueness is the repository's job)
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.as_str().trim().is_empty() {
            return Err(ValidationError::MissingId);
        }
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        if self.api_config.url.trim().is_empty() {
            return Err(ValidationError::MissingUrl);
        }
        let url = Url::parse(self.api_config.url.trim())
            .map_err(|e| ValidationError::InvalidUrl(format!("{}: {}", self.api_config.url, e)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ValidationError::InvalidUrl(format!(
                "{}: scheme must be http or https",
                self.api_config.url
            )));
        }
        if self.api_config.refresh_interval == 0 {
            return Err(ValidationError::InvalidRefreshInterval);
        }
        Ok(())
    }
}

/// Reasons a widget definition is refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Widget id is empty")]
    MissingId,

    #[error("Widget title is required")]
    MissingTitle,

    #[error("API URL is required")]
    MissingUrl,

    #[error("Invalid API URL {0}")]
    InvalidUrl(String),

    #[error("Refresh interval must be at least 1 second")]
    InvalidRefreshInterval,

    #[error("Widget id already exists: {0}")]
    DuplicateId(WidgetId),
}

/// Dashboard color theme
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// The other theme
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("Unknown theme: {}. Use: light, dark", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn widget(title: &str, url: &str) -> Widget {
        Widget::new(title, WidgetType::Card, ApiConfig::new(url))
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let ids: HashSet<WidgetId> = (0..1000).map(|_| WidgetId::generate()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_serialized_shape() {
        let w = Widget::new(
            "BTC Price",
            WidgetType::Chart,
            ApiConfig::new("https://api.example.com/btc").refresh_interval(30),
        )
        .with_id("1700000000000");

        let json = serde_json::to_value(&w).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "1700000000000",
                "title": "BTC Price",
                "type": "chart",
                "apiConfig": {
                    "url": "https://api.example.com/btc",
                    "refreshInterval": 30
                }
            })
        );
    }

    #[test]
    fn test_missing_refresh_interval_defaults() {
        let w: Widget = serde_json::from_str(
            r#"{"id":"1","title":"T","type":"table","apiConfig":{"url":"https://x.io"}}"#,
        )
        .unwrap();
        assert_eq!(w.api_config.refresh_interval, DEFAULT_REFRESH_SECS);
        assert_eq!(w.widget_type, WidgetType::Table);
    }

    #[test]
    fn test_validation() {
        assert!(widget("BTC", "https://api.example.com").validate().is_ok());
        assert_eq!(
            widget("", "https://x").validate(),
            Err(ValidationError::MissingTitle)
        );
        assert_eq!(
            widget("   ", "https://x").validate(),
            Err(ValidationError::MissingTitle)
        );
        assert_eq!(widget("X", "").validate(), Err(ValidationError::MissingUrl));
        assert!(matches!(
            widget("X", "ftp://files.example.com").validate(),
            Err(ValidationError::InvalidUrl(_))
        ));
        assert!(matches!(
            widget("X", "not a url").validate(),
            Err(ValidationError::InvalidUrl(_))
        ));

        let zero = Widget::new(
            "X",
            WidgetType::Card,
            ApiConfig::new("https://x").refresh_interval(0),
        );
        assert_eq!(zero.validate(), Err(ValidationError::InvalidRefreshInterval));
    }

    #[test]
    fn test_widget_type_parse() {
        assert_eq!("Card".parse::<WidgetType>().unwrap(), WidgetType::Card);
        assert_eq!("chart".parse::<WidgetType>().unwrap(), WidgetType::Chart);
        assert!("pie".parse::<WidgetType>().is_err());
        for t in WidgetType::all() {
            assert_eq!(t.to_string().parse::<WidgetType>().unwrap(), *t);
        }
    }

    #[test]
    fn test_theme_toggle() {
        assert_eq!(Theme::default(), Theme::Light);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("blue".parse::<Theme>().is_err());
    }
}
