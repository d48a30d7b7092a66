//! Finboard Storage
//!
//! This module provides the durable local state of the dashboard:
//!
//! - **types**: Core data structures (Widget, WidgetType, ApiConfig, Theme)
//! - **kv**: Key/value store abstraction with file and in-memory backends
//! - **repository**: The authoritative widget collection
//! - **theme**: Light/dark preference
//! - **error**: Error types
//!
//! # Example
//!
//! ```rust,no_run
//! use finboard::storage::{ApiConfig, FileStore, Widget, WidgetRepository, WidgetType};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = FileStore::open("./finboard_data")?;
//!     let mut repo = WidgetRepository::open(store)?;
//!
//!     repo.add(Widget::new(
//!         "BTC Price",
//!         WidgetType::Card,
//!         ApiConfig::new("https://api.coingecko.com/api/v3/simple/price?ids=bitcoin&vs_currencies=usd"),
//!     ))?;
//!
//!     println!("{} widgets", repo.len());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod kv;
pub mod repository;
pub mod theme;
pub mod types;

// Re-export commonly used types
pub use error::{RepositoryError, RepositoryResult, StorageError, StorageResult};
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use repository::{WidgetRepository, WIDGETS_KEY};
pub use theme::{ThemeStore, THEME_KEY};
pub use types::{
    ApiConfig, Theme, ValidationError, Widget, WidgetId, WidgetType, DEFAULT_REFRESH_SECS,
};
