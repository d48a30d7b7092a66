//! # Finboard
//!
//! A widget dashboard: each widget is bound to an external HTTP JSON API and
//! renders the live data as a card, a table or a line chart, refreshing on
//! its own timer.
//!
//! ## Features
//!
//! - **Durable widget store**: whole-collection snapshots written atomically
//! - **Per-widget polling**: cancellable timer loops with manual refresh
//! - **Shape inference**: scalar, flattened rows and time series from any JSON
//! - **Retain on error**: a failed fetch keeps the last good payload on screen
//!
//! ## Modules
//!
//! - [`storage`]: Widget model, key/value store, repository, theme
//! - [`fetcher`]: Data sources and per-widget polling
//! - [`shape`]: JSON-to-display projections
//! - [`dashboard`]: Runtime composing all of the above
//! - [`render`]: Plain-text widget rendering for terminal front ends
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use finboard::fetcher::{HttpSource, HttpSourceConfig};
//! use finboard::storage::{ApiConfig, FileStore, Widget, WidgetType};
//! use finboard::Dashboard;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = FileStore::open("./finboard_data")?;
//!     let source = Arc::new(HttpSource::new(HttpSourceConfig::default())?);
//!     let dashboard = Dashboard::open(store, source).await?;
//!
//!     let id = dashboard
//!         .add_widget(Widget::new(
//!             "BTC Price",
//!             WidgetType::Card,
//!             ApiConfig::new("https://api.coingecko.com/api/v3/simple/price?ids=bitcoin&vs_currencies=usd"),
//!         ))
//!         .await?;
//!
//!     tokio::time::sleep(std::time::Duration::from_secs(2)).await;
//!     if let Some(view) = dashboard.view(&id).await {
//!         println!("{:?}", view.projection);
//!     }
//!
//!     dashboard.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dashboard;
pub mod fetcher;
pub mod logging;
pub mod render;
pub mod shape;
pub mod storage;

// Re-export top-level types for convenience
pub use storage::{
    ApiConfig, FileStore, KeyValueStore, MemoryStore, RepositoryError, StorageError, Theme,
    ThemeStore, ValidationError, Widget, WidgetId, WidgetRepository, WidgetType,
};

pub use fetcher::{
    FetchError, FetchResult, FetchStatus, FetcherPool, HttpSource, HttpSourceConfig, JsonSource,
    WidgetFetcher,
};

pub use shape::{extract_scalar, extract_series, flatten_to_rows, project, Projection, Row, SeriesPoint};

pub use dashboard::{Dashboard, DashboardError, DashboardResult, WidgetView};

pub use config::{Config, ConfigError, FetchConfig, LoggingConfig};
