//! Dashboard Runtime
//!
//! The single entry point for front ends. A `Dashboard` owns the widget
//! repository and the fetcher pool and keeps them aligned: adding a widget
//! persists it and starts its fetcher, removing one persists the removal and
//! cancels its fetcher.
//!
//! Front ends hold a `Dashboard` (usually behind an `Arc`) and never touch the
//! repository or its snapshot directly.

use crate::fetcher::{
    probe, FetchError, FetchResult, FetcherPool, JsonSource, SyncReport,
};
use crate::shape::{project, Projection};
use crate::storage::{
    KeyValueStore, RepositoryError, StorageError, Widget, WidgetId, WidgetRepository,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{watch, RwLock};

/// Errors surfaced by the dashboard runtime
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Widget not found: {0}")]
    WidgetNotFound(WidgetId),
}

/// Result type alias for dashboard operations
pub type DashboardResult<T> = Result<T, DashboardError>;

/// Everything a front end needs to draw one widget
#[derive(Debug, Clone, Serialize)]
pub struct WidgetView {
    pub widget: Widget,
    pub result: FetchResult,
    /// The last good payload projected for the widget's type
    pub projection: Option<Projection>,
}

impl WidgetView {
    fn new(widget: Widget, result: FetchResult) -> Self {
        let projection = result
            .payload
            .as_ref()
            .map(|payload| project(widget.widget_type, payload));
        Self {
            widget,
            result,
            projection,
        }
    }
}

/// Widget repository plus one running fetcher per widget
pub struct Dashboard<S> {
    repository: Arc<RwLock<WidgetRepository<S>>>,
    pool: Arc<RwLock<FetcherPool>>,
    source: Arc<dyn JsonSource>,
}

impl<S: KeyValueStore> Dashboard<S> {
    /// Load the persisted widgets and start polling each of them
    ///
    /// Must be called from within a tokio runtime.
    pub async fn open(store: S, source: Arc<dyn JsonSource>) -> DashboardResult<Self> {
        let repository = WidgetRepository::open(store)?;
        let mut pool = FetcherPool::new(Arc::clone(&source));
        let report = pool.sync(repository.widgets());

        tracing::info!(
            widgets = repository.len(),
            fetchers = report.started,
            "Dashboard opened"
        );

        Ok(Self {
            repository: Arc::new(RwLock::new(repository)),
            pool: Arc::new(RwLock::new(pool)),
            source,
        })
    }

    /// All widgets in creation order
    pub async fn widgets(&self) -> Vec<Widget> {
        self.repository.read().await.widgets().to_vec()
    }

    pub async fn widget(&self, id: &WidgetId) -> Option<Widget> {
        self.repository.read().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.repository.read().await.len()
    }

    /// Persist a new widget and start fetching its data
    pub async fn add_widget(&self, widget: Widget) -> DashboardResult<WidgetId> {
        let mut repository = self.repository.write().await;
        repository.add(widget.clone())?;
        self.pool.write().await.start(&widget);

        tracing::info!(
            widget_id = %widget.id,
            title = %widget.title,
            widget_type = %widget.widget_type,
            "Widget created"
        );
        Ok(widget.id)
    }

    /// Remove a widget and stop its fetcher
    ///
    /// Removing an unknown id is not an error and returns `None`.
    pub async fn remove_widget(&self, id: &WidgetId) -> DashboardResult<Option<Widget>> {
        let mut repository = self.repository.write().await;
        let removed = repository.remove(id)?;
        self.pool.write().await.stop(id);

        if removed.is_some() {
            tracing::info!(widget_id = %id, "Widget deleted");
        }
        Ok(removed)
    }

    /// Fetch a widget's data now, outside its schedule
    pub async fn refresh(&self, id: &WidgetId) -> DashboardResult<()> {
        if self.pool.read().await.refresh(id) {
            Ok(())
        } else {
            Err(DashboardError::WidgetNotFound(id.clone()))
        }
    }

    pub async fn refresh_all(&self) {
        self.pool.read().await.refresh_all();
    }

    /// Current state of a widget's data
    pub async fn fetch_result(&self, id: &WidgetId) -> Option<FetchResult> {
        self.pool.read().await.result(id)
    }

    /// Change notifications for a widget's data
    pub async fn subscribe(&self, id: &WidgetId) -> Option<watch::Receiver<FetchResult>> {
        self.pool.read().await.subscribe(id)
    }

    /// Render-ready view of one widget
    pub async fn view(&self, id: &WidgetId) -> Option<WidgetView> {
        let widget = self.widget(id).await?;
        let result = self.fetch_result(id).await.unwrap_or_default();
        Some(WidgetView::new(widget, result))
    }

    /// Render-ready views of all widgets, in creation order
    pub async fn views(&self) -> Vec<WidgetView> {
        let repository = self.repository.read().await;
        let pool = self.pool.read().await;
        repository
            .widgets()
            .iter()
            .map(|w| WidgetView::new(w.clone(), pool.result(&w.id).unwrap_or_default()))
            .collect()
    }

    /// Re-read the persisted snapshot and align fetchers with it
    ///
    /// Picks up widgets added or removed by another process sharing the
    /// same data directory.
    pub async fn reload(&self) -> DashboardResult<SyncReport> {
        let mut repository = self.repository.write().await;
        repository.load()?;
        let report = self.pool.write().await.sync(repository.widgets());

        if report != SyncReport::default() {
            tracing::info!(
                started = report.started,
                restarted = report.restarted,
                stopped = report.stopped,
                "Dashboard reloaded"
            );
        }
        Ok(report)
    }

    /// Try a URL through the dashboard's source without creating a widget
    pub async fn probe(&self, url: &str) -> Result<Value, FetchError> {
        probe(self.source.as_ref(), url).await
    }

    /// Stop all fetchers
    pub async fn shutdown(&self) {
        self.pool.write().await.shutdown().await;
        tracing::info!("Dashboard shut down");
    }
}
