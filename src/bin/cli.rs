//! Finboard CLI
//!
//! Command-line interface for managing the widget collection:
//! - Add, list and remove widgets
//! - Test an API before creating a widget
//! - Show a widget's current data
//! - Switch the theme

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use finboard::fetcher::probe;
use finboard::render::render_view;
use finboard::shape::flatten_to_rows;
use finboard::{
    logging, ApiConfig, Config, Dashboard, FileStore, HttpSource, Theme, ThemeStore, Widget,
    WidgetId, WidgetRepository, WidgetType,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "finboard-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Manage Finboard widgets")]
#[command(long_about = "Finboard binds dashboard widgets to JSON APIs.\nCreate cards, tables and charts that refresh on their own schedule.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List all widgets
    List,

    /// Create a widget
    Add {
        /// Widget name, e.g. "BTC Price"
        #[arg(short, long)]
        title: String,
        /// Display type (card, table, chart)
        #[arg(short = 'T', long = "type", default_value = "card")]
        widget_type: WidgetType,
        /// JSON API endpoint
        #[arg(short, long)]
        url: String,
        /// Refresh interval in seconds (default: fetch.default_refresh_secs)
        #[arg(short, long)]
        refresh: Option<u64>,
        /// Test the API before creating the widget
        #[arg(long)]
        probe: bool,
    },

    /// Delete a widget
    Remove {
        /// Widget id (see `list`)
        id: String,
    },

    /// Fetch a URL once and show what each widget type would display
    Probe {
        url: String,
    },

    /// Fetch a widget's data once and render it
    Show {
        /// Widget id (see `list`)
        id: String,
    },

    /// Show, toggle or set the theme
    Theme {
        /// "toggle", "light" or "dark" (omit to show the current theme)
        action: Option<String>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load_default(cli.config.as_deref())?;
    logging::init(&config.logging).context("Failed to initialize logging")?;

    let open_store = || -> anyhow::Result<FileStore> {
        let dir = config.storage.data_path();
        FileStore::open(&dir).with_context(|| format!("Cannot open data directory {:?}", dir))
    };

    match cli.command {
        Commands::List => {
            let repo = WidgetRepository::open(open_store()?)?;

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(repo.widgets())?);
            } else if repo.is_empty() {
                println!("No widgets defined yet.");
                println!();
                println!("Create your first widget with:");
                println!("  finboard-cli add --title \"BTC Price\" --type card --url <json-api-url>");
            } else {
                println!("{:<24} {:<20} {:<6} {:>7}  {}", "ID", "Title", "Type", "Refresh", "URL");
                println!("{}", "-".repeat(90));

                for w in repo.widgets() {
                    println!(
                        "{:<24} {:<20} {:<6} {:>6}s  {}",
                        w.id, w.title, w.widget_type, w.api_config.refresh_interval, w.api_config.url
                    );
                }
            }
        }

        Commands::Add {
            title,
            widget_type,
            url,
            refresh,
            probe: should_probe,
        } => {
            if should_probe {
                let source = HttpSource::new(config.fetch.http_source_config())?;
                match probe(&source, &url).await {
                    Ok(_) => println!("API responded with valid JSON"),
                    Err(e) => bail!("API test failed: {}", e),
                }
            }

            let refresh = refresh.unwrap_or(config.fetch.default_refresh_secs);
            let widget = Widget::new(title, widget_type, ApiConfig::new(url).refresh_interval(refresh));
            let id = widget.id.clone();

            let mut repo = WidgetRepository::open(open_store()?)?;
            repo.add(widget)?;
            println!("Created widget {}", id);
        }

        Commands::Remove { id } => {
            let mut repo = WidgetRepository::open(open_store()?)?;
            match repo.remove(&WidgetId::from(id.as_str()))? {
                Some(w) => println!("Deleted widget {} ({})", w.id, w.title),
                None => println!("No widget with id {}", id),
            }
        }

        Commands::Probe { url } => {
            let source = HttpSource::new(config.fetch.http_source_config())?;
            let payload = match probe(&source, &url).await {
                Ok(payload) => payload,
                Err(e) => bail!("API test failed: {}", e),
            };

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("API responded with valid JSON");
                println!();
                for widget_type in WidgetType::all() {
                    let projection = finboard::project(*widget_type, &payload);
                    println!("As {}: {}", widget_type, describe(&projection));
                }
                println!();
                println!("Fields:");
                for row in flatten_to_rows(&payload).iter().take(20) {
                    println!("  {} = {}", row.key, row.display_value());
                }
            }
        }

        Commands::Show { id } => {
            let id = WidgetId::from(id.as_str());
            let source = Arc::new(HttpSource::new(config.fetch.http_source_config())?);
            let dashboard = Dashboard::open(open_store()?, source).await?;

            let Some(mut rx) = dashboard.subscribe(&id).await else {
                dashboard.shutdown().await;
                bail!("No widget with id {}", id);
            };

            let wait = Duration::from_secs(config.fetch.request_timeout_secs.max(1) + 1);
            let settled = tokio::time::timeout(wait, async {
                loop {
                    {
                        let state = rx.borrow_and_update();
                        if !state.is_loading() && state.status != finboard::FetchStatus::Idle {
                            break;
                        }
                    }
                    if rx.changed().await.is_err() {
                        break;
                    }
                }
            })
            .await;

            if settled.is_err() {
                eprintln!("Timed out waiting for data");
            }

            if let Some(view) = dashboard.view(&id).await {
                if cli.format == "json" {
                    println!("{}", serde_json::to_string_pretty(&view)?);
                } else {
                    print!("{}", render_view(&view));
                }
            }
            dashboard.shutdown().await;
        }

        Commands::Theme { action } => {
            let themes = ThemeStore::new(open_store()?);
            let theme = match action.as_deref() {
                None => themes.load()?,
                Some("toggle") => themes.toggle()?,
                Some(name) => {
                    let theme: Theme = name.parse().map_err(anyhow::Error::msg)?;
                    themes.set(theme)?;
                    theme
                }
            };
            println!("Theme: {}", theme);
        }

        Commands::Config { output } => {
            let content = finboard::config::generate_default_config();

            match output {
                Some(path) => {
                    // Create parent directory if needed
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &content)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", content);
                }
            }
        }
    }

    Ok(())
}

fn describe(projection: &finboard::Projection) -> String {
    match projection {
        finboard::Projection::Card(Some(v)) => finboard::render::format_number(Some(*v)),
        finboard::Projection::Card(None) => "no numeric value found".to_string(),
        finboard::Projection::Table(rows) => format!("{} rows", rows.len()),
        finboard::Projection::Chart(points) if points.is_empty() => {
            "no `prices` series found".to_string()
        }
        finboard::Projection::Chart(points) => format!("{} points", points.len()),
    }
}
