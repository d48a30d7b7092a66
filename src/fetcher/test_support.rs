//! Scripted data source for fetcher tests

use crate::fetcher::client::{FetchError, JsonSource};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

type Scripted = (Option<Duration>, Result<Value, FetchError>);

/// Returns canned responses per URL and records when each call started
#[derive(Default)]
pub(crate) struct ScriptedSource {
    responses: Mutex<HashMap<String, Scripted>>,
    calls: Mutex<HashMap<String, Vec<Instant>>>,
    delay: Option<Duration>,
}

impl ScriptedSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Delay every response that has no delay of its own
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn respond(&self, url: &str, result: Result<Value, FetchError>) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), (None, result));
    }

    pub(crate) fn respond_after(
        &self,
        url: &str,
        delay: Duration,
        result: Result<Value, FetchError>,
    ) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), (Some(delay), result));
    }

    pub(crate) fn calls(&self, url: &str) -> usize {
        self.call_times(url).len()
    }

    pub(crate) fn call_times(&self, url: &str) -> Vec<Instant> {
        self.calls
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl JsonSource for ScriptedSource {
    async fn fetch(&self, url: &str) -> Result<Value, FetchError> {
        let n = {
            let mut calls = self.calls.lock().unwrap();
            let times = calls.entry(url.to_string()).or_default();
            times.push(Instant::now());
            times.len()
        };

        let scripted = self.responses.lock().unwrap().get(url).cloned();
        let (delay, result) = match scripted {
            Some((delay, result)) => (delay.or(self.delay), result),
            None => (self.delay, Ok(json!({ "url": url, "call": n }))),
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result
    }
}
