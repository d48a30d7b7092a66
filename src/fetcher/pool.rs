//! Fetcher Pool
//!
//! Keeps exactly one running [`WidgetFetcher`] per active widget and aligns
//! that set with the widget collection.

use crate::fetcher::client::JsonSource;
use crate::fetcher::poller::WidgetFetcher;
use crate::fetcher::state::FetchResult;
use crate::storage::{Widget, WidgetId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::watch;

/// Owns the per-widget fetchers
pub struct FetcherPool {
    source: Arc<dyn JsonSource>,
    fetchers: HashMap<WidgetId, WidgetFetcher>,
}

/// What a [`FetcherPool::sync`] call changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub started: usize,
    pub restarted: usize,
    pub stopped: usize,
}

impl FetcherPool {
    /// Create an empty pool fetching through `source`
    pub fn new(source: Arc<dyn JsonSource>) -> Self {
        Self {
            source,
            fetchers: HashMap::new(),
        }
    }

    /// Start polling for a widget
    ///
    /// If a fetcher already runs for this id with the same data source
    /// configuration, nothing happens and `false` is returned. If the
    /// configuration differs, the old loop is cancelled and a new one started.
    pub fn start(&mut self, widget: &Widget) -> bool {
        if let Some(existing) = self.fetchers.get(&widget.id) {
            if existing.api_config() == &widget.api_config && existing.is_running() {
                return false;
            }
            tracing::info!(widget_id = %widget.id, "Data source changed, restarting fetcher");
        }

        let fetcher = WidgetFetcher::spawn(widget, Arc::clone(&self.source));
        // Replacing drops (and cancels) any previous fetcher
        self.fetchers.insert(widget.id.clone(), fetcher);
        true
    }

    /// Stop polling for a widget; `false` if none was running
    pub fn stop(&mut self, id: &WidgetId) -> bool {
        match self.fetchers.remove(id) {
            Some(fetcher) => {
                drop(fetcher);
                tracing::debug!(widget_id = %id, "Fetcher removed");
                true
            }
            None => false,
        }
    }

    /// Start missing fetchers, restart changed ones, stop orphans
    pub fn sync(&mut self, widgets: &[Widget]) -> SyncReport {
        let mut report = SyncReport::default();
        let active: HashSet<&WidgetId> = widgets.iter().map(|w| &w.id).collect();

        let orphans: Vec<WidgetId> = self
            .fetchers
            .keys()
            .filter(|id| !active.contains(id))
            .cloned()
            .collect();
        for id in orphans {
            self.stop(&id);
            report.stopped += 1;
        }

        for widget in widgets {
            let existed = self.fetchers.contains_key(&widget.id);
            if self.start(widget) {
                if existed {
                    report.restarted += 1;
                } else {
                    report.started += 1;
                }
            }
        }

        report
    }

    /// Trigger an out-of-band fetch
    pub fn refresh(&self, id: &WidgetId) -> bool {
        self.fetchers
            .get(id)
            .map(WidgetFetcher::refresh)
            .unwrap_or(false)
    }

    /// Trigger an out-of-band fetch for every widget
    pub fn refresh_all(&self) {
        for fetcher in self.fetchers.values() {
            fetcher.refresh();
        }
    }

    /// Current state of a widget's data
    pub fn result(&self, id: &WidgetId) -> Option<FetchResult> {
        self.fetchers.get(id).map(WidgetFetcher::snapshot)
    }

    /// Change notifications for a widget's data
    pub fn subscribe(&self, id: &WidgetId) -> Option<watch::Receiver<FetchResult>> {
        self.fetchers.get(id).map(WidgetFetcher::subscribe)
    }

    pub fn contains(&self, id: &WidgetId) -> bool {
        self.fetchers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.fetchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fetchers.is_empty()
    }

    /// Stop every fetcher and wait for in-flight attempts to wind down
    pub async fn shutdown(&mut self) {
        let count = self.fetchers.len();
        for (_, fetcher) in self.fetchers.drain() {
            fetcher.shutdown().await;
        }
        tracing::info!("Stopped {} fetchers", count);
    }
}
