//! Finboard live dashboard
//!
//! Opens the widget collection, polls every widget on its own schedule and
//! prints a widget whenever its data changes. Widgets added or removed with
//! `finboard-cli` are picked up on the next reload tick. Press Enter to
//! refresh every widget immediately.

use anyhow::Context;
use clap::Parser;
use finboard::render::render_view;
use finboard::{logging, Config, Dashboard, FileStore, HttpSource, ThemeStore, WidgetId};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Parser)]
#[command(name = "finboard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Live dashboard of JSON API widgets")]
struct Args {
    /// Config file (default: search standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// How often to re-read the widget collection (seconds)
    #[arg(long, default_value = "5")]
    reload_secs: u64,
}

type Store = FileStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::load_default(args.config.as_deref())?;
    logging::init(&config.logging).context("Failed to initialize logging")?;

    tracing::info!("Finboard v{}", env!("CARGO_PKG_VERSION"));

    let data_dir = config.storage.data_path();
    tracing::info!("Data directory: {:?}", data_dir);

    let store = FileStore::open(&data_dir)?;
    let theme = ThemeStore::new(store.clone()).load()?;
    tracing::info!("Theme: {}", theme);

    let source = Arc::new(HttpSource::new(config.fetch.http_source_config())?);
    let dashboard = Arc::new(Dashboard::open(store, source).await?);

    if dashboard.len().await == 0 {
        println!("No widgets yet. Add one with:");
        println!("  finboard-cli add --title \"BTC Price\" --type card --url <json-api-url>");
    }

    let (changed_tx, mut changed_rx) = mpsc::unbounded_channel::<WidgetId>();
    let mut watchers: HashMap<WidgetId, JoinHandle<()>> = HashMap::new();
    watch_all(&dashboard, &mut watchers, &changed_tx).await;

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    let mut reload = tokio::time::interval(Duration::from_secs(args.reload_secs.max(1)));
    reload.tick().await;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down...");
                break;
            }
            _ = reload.tick() => {
                if let Err(e) = dashboard.reload().await {
                    tracing::error!("Reload failed: {}", e);
                }
                watch_all(&dashboard, &mut watchers, &changed_tx).await;
            }
            line = input.next_line(), if stdin_open => {
                match line {
                    Ok(Some(_)) => {
                        tracing::info!("Refreshing all widgets");
                        dashboard.refresh_all().await;
                    }
                    Ok(None) => stdin_open = false,
                    Err(e) => {
                        tracing::warn!("Stopped reading stdin: {}", e);
                        stdin_open = false;
                    }
                }
            }
            Some(id) = changed_rx.recv() => {
                if let Some(view) = dashboard.view(&id).await {
                    if !view.result.is_loading() {
                        println!("{}", render_view(&view));
                    }
                }
            }
        }
    }

    for (_, handle) in watchers.drain() {
        handle.abort();
    }
    dashboard.shutdown().await;

    tracing::info!("Finboard shutdown complete");
    Ok(())
}

/// Forward change notifications of every widget into `tx`
///
/// A watcher ends when its fetcher goes away (removal or restart), so this
/// also replaces finished watchers and drops those of removed widgets.
async fn watch_all(
    dashboard: &Arc<Dashboard<Store>>,
    watchers: &mut HashMap<WidgetId, JoinHandle<()>>,
    tx: &mpsc::UnboundedSender<WidgetId>,
) {
    let widgets = dashboard.widgets().await;
    watchers.retain(|id, handle| {
        let keep = !handle.is_finished() && widgets.iter().any(|w| &w.id == id);
        if !keep {
            handle.abort();
        }
        keep
    });

    for widget in widgets {
        if watchers.contains_key(&widget.id) {
            continue;
        }
        let Some(mut rx) = dashboard.subscribe(&widget.id).await else {
            continue;
        };

        let tx = tx.clone();
        let id = widget.id.clone();
        let handle = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                if tx.send(id.clone()).is_err() {
                    break;
                }
            }
        });
        watchers.insert(widget.id, handle);
    }
}
