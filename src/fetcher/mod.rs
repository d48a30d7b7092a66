//! Data Fetching
//!
//! This module keeps each widget's data fresh:
//!
//! - **client**: `JsonSource` trait and the `reqwest`-backed `HttpSource`
//! - **state**: the per-widget `FetchResult`
//! - **poller**: `WidgetFetcher`, one cancellable polling loop per widget
//! - **pool**: `FetcherPool`, the set of running fetchers
//!
//! # Architecture
//!
//! ```text
//! FetcherPool ── WidgetFetcher (timer loop) ── attempt task ── JsonSource
//!                      │                                           │
//!                      └──────── watch<FetchResult> ◄──────────────┘
//! ```
//!
//! Fetchers share nothing but the source, so a failing or removed widget
//! never affects another.

pub mod client;
pub mod pool;
pub mod poller;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use client::{probe, FetchError, HttpSource, HttpSourceConfig, JsonSource};
pub use pool::{FetcherPool, SyncReport};
pub use poller::WidgetFetcher;
pub use state::{FetchResult, FetchStatus};
