//! Fetch Result
//!
//! The transient, per-widget view of the last retrieval attempts. It is never
//! persisted and is dropped together with the widget's fetcher.

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use serde_json::Value;

/// Where a widget's data currently stands
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    /// No attempt has started yet
    Idle,
    Loading,
    Success,
    Error,
}

impl std::fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchStatus::Idle => write!(f, "idle"),
            FetchStatus::Loading => write!(f, "loading"),
            FetchStatus::Success => write!(f, "success"),
            FetchStatus::Error => write!(f, "error"),
        }
    }
}

/// State of one widget's data
///
/// A failed attempt records its message but keeps the payload of the last
/// success, so the last good render stays on screen.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FetchResult {
    pub status: FetchStatus,
    /// Payload of the most recent successful attempt
    pub payload: Option<Value>,
    /// Message of the most recent attempt, if it failed
    pub error_message: Option<String>,
    /// When the payload was last replaced
    pub last_updated: Option<DateTime<Utc>>,
    /// Attempts currently awaiting a response
    #[serde(skip)]
    pub in_flight: usize,
    /// Outcome of the last applied attempt, shown once nothing is in flight
    #[serde(skip)]
    pub settled: FetchStatus,
}

impl Default for FetchResult {
    fn default() -> Self {
        Self {
            status: FetchStatus::Idle,
            payload: None,
            error_message: None,
            last_updated: None,
            in_flight: 0,
            settled: FetchStatus::Idle,
        }
    }
}

impl FetchResult {
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    /// An attempt started
    pub(crate) fn begin(&mut self) {
        self.in_flight += 1;
        self.status = FetchStatus::Loading;
        self.error_message = None;
    }

    /// An attempt finished without being applied (superseded or cancelled)
    pub(crate) fn settle(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    pub(crate) fn succeed(&mut self, payload: Value, at: DateTime<Utc>) {
        self.payload = Some(payload);
        self.error_message = None;
        self.last_updated = Some(at);
        self.settled = FetchStatus::Success;
        self.status = FetchStatus::Success;
    }

    pub(crate) fn fail(&mut self, message: String) {
        self.error_message = Some(message);
        self.settled = FetchStatus::Error;
        self.status = FetchStatus::Error;
    }

    /// `Loading` while any attempt runs, otherwise the last applied outcome
    pub(crate) fn refresh_status(&mut self) {
        self.status = if self.is_loading() {
            FetchStatus::Loading
        } else {
            self.settled
        };
    }

    /// Last update in local time, e.g. `14:03:27`
    pub fn last_updated_label(&self) -> Option<String> {
        self.last_updated
            .map(|t| t.with_timezone(&Local).format("%H:%M:%S").to_string())
    }
}
