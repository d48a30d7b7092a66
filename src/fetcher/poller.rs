//! Widget Fetcher
//!
//! One polling unit per active widget. A fetcher fetches immediately when
//! spawned, then every `refresh_interval` seconds, and on demand through
//! [`WidgetFetcher::refresh`]. Each attempt runs as its own task so a slow
//! upstream never delays the schedule.
//!
//! # Ordering
//!
//! Attempts may overlap. Every attempt takes a sequence number when it
//! starts; a completion older than one already applied is dropped, so the
//! state always reflects the newest attempt that has finished.
//!
//! # Cancellation
//!
//! Dropping or shutting down a fetcher cancels its token: the timer loop
//! exits, in-flight requests are abandoned, and no result is applied after
//! cancellation.

use crate::fetcher::client::{FetchError, JsonSource};
use crate::fetcher::state::FetchResult;
use crate::storage::{ApiConfig, Widget, WidgetId};
use chrono::Utc;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Why an attempt was started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Scheduled,
    Manual,
}

/// Handle to a running per-widget polling loop
pub struct WidgetFetcher {
    widget_id: WidgetId,
    api_config: ApiConfig,
    state: watch::Receiver<FetchResult>,
    refresh_tx: mpsc::UnboundedSender<()>,
    cancel: CancellationToken,
    tasks: TaskTracker,
    handle: JoinHandle<()>,
}

/// State shared between the loop and its attempt tasks
struct Shared {
    widget_id: WidgetId,
    url: String,
    source: Arc<dyn JsonSource>,
    state: watch::Sender<FetchResult>,
    cancel: CancellationToken,
    tasks: TaskTracker,
    issued: AtomicU64,
    applied: AtomicU64,
}

impl WidgetFetcher {
    /// Start polling for a widget
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(widget: &Widget, source: Arc<dyn JsonSource>) -> Self {
        let (state_tx, state_rx) = watch::channel(FetchResult::default());
        let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let tasks = TaskTracker::new();

        let shared = Arc::new(Shared {
            widget_id: widget.id.clone(),
            url: widget.api_config.url.clone(),
            source,
            state: state_tx,
            cancel: cancel.clone(),
            tasks: tasks.clone(),
            issued: AtomicU64::new(0),
            applied: AtomicU64::new(0),
        });

        // interval() panics on a zero period
        let period = widget.api_config.interval().max(std::time::Duration::from_secs(1));
        let handle = tokio::spawn(run(shared, period, refresh_rx));

        tracing::debug!(
            widget_id = %widget.id,
            interval_secs = period.as_secs(),
            "Fetcher started"
        );

        Self {
            widget_id: widget.id.clone(),
            api_config: widget.api_config.clone(),
            state: state_rx,
            refresh_tx,
            cancel,
            tasks,
            handle,
        }
    }

    pub fn widget_id(&self) -> &WidgetId {
        &self.widget_id
    }

    /// Data source configuration this fetcher was started with
    pub fn api_config(&self) -> &ApiConfig {
        &self.api_config
    }

    /// Fetch now, outside the schedule
    ///
    /// Returns `false` if the fetcher has already stopped.
    pub fn refresh(&self) -> bool {
        self.refresh_tx.send(()).is_ok()
    }

    /// Current state
    pub fn snapshot(&self) -> FetchResult {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<FetchResult> {
        self.state.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled() && !self.handle.is_finished()
    }

    /// Cancel the loop and wait for it and any in-flight attempts to finish
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Err(e) = (&mut self.handle).await {
            tracing::error!(widget_id = %self.widget_id, "Fetcher loop failed: {}", e);
        }
        self.tasks.close();
        self.tasks.wait().await;
        tracing::debug!(widget_id = %self.widget_id, "Fetcher stopped");
    }
}

impl Drop for WidgetFetcher {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run(
    shared: Arc<Shared>,
    period: std::time::Duration,
    mut refresh_rx: mpsc::UnboundedReceiver<()>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = shared.cancel.cancelled() => break,
            _ = ticker.tick() => shared.launch(Trigger::Scheduled),
            Some(()) = refresh_rx.recv() => shared.launch(Trigger::Manual),
        }
    }

    shared.tasks.close();
}

impl Shared {
    fn launch(self: &Arc<Self>, trigger: Trigger) {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(FetchResult::begin);

        tracing::debug!(widget_id = %self.widget_id, seq, ?trigger, "Fetching");

        let shared = Arc::clone(self);
        self.tasks.spawn(async move {
            let outcome = tokio::select! {
                _ = shared.cancel.cancelled() => None,
                result = shared.source.fetch(&shared.url) => Some(result),
            };
            if let Some(result) = outcome {
                shared.complete(seq, result);
            }
        });
    }

    fn complete(&self, seq: u64, result: Result<Value, FetchError>) {
        if self.cancel.is_cancelled() {
            tracing::debug!(widget_id = %self.widget_id, seq, "Discarding result for stopped fetcher");
            return;
        }

        self.state.send_modify(|state| {
            state.settle();

            if seq < self.applied.load(Ordering::SeqCst) {
                tracing::debug!(widget_id = %self.widget_id, seq, "Discarding superseded result");
                state.refresh_status();
                return;
            }
            self.applied.store(seq, Ordering::SeqCst);

            match result {
                Ok(payload) => state.succeed(payload, Utc::now()),
                Err(e) => {
                    tracing::warn!(widget_id = %self.widget_id, url = %self.url, "Fetch failed: {}", e);
                    state.fail(e.to_string());
                }
            }
            state.refresh_status();
        });
    }
}
