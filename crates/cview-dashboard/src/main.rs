use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cview_dashboard::console;
use cview_dashboard::orchestrator::{Aggregator, RefreshOutcome};
use cview_dashboard::web_server::WebServer;
use cview_dashboard::DashboardConfig;
use cview_fetch::HttpClusterApi;

/// Cluster summary dashboard.
#[derive(Parser, Debug)]
#[command(name = "cview", version, about = "Cluster status summary: console, JSON API and snapshots")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, overrides the configured endpoint
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Log file used by the console
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Interactive terminal console (default)
    Console,

    /// Serve the summary as JSON over HTTP
    Serve {
        /// Listen address, overrides `bind_addr`
        #[arg(long)]
        bind: Option<String>,
    },

    /// Run one refresh cycle and print the summary as JSON
    Snapshot,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.clone().unwrap_or(Command::Console);

    let config = DashboardConfig::load(cli.config.as_deref(), cli.endpoint.clone())?;

    // The console owns the terminal, so its logs go to a file.
    let log_file = match command {
        Command::Console => Some(cli.log_file.clone().unwrap_or_else(default_log_file)),
        _ => cli.log_file.clone(),
    };
    init_tracing(&config.log_level, log_file.as_deref())?;

    tracing::info!(
        endpoint = %config.api.endpoint,
        config = ?config.source(),
        "Configuration loaded"
    );

    let api = HttpClusterApi::new(config.api.clone())?;
    let aggregator = Arc::new(Aggregator::new(Arc::new(api), config.fetch_timeout()));

    match command {
        Command::Console => console::run_console(aggregator, config.api.endpoint.clone()).await,
        Command::Serve { bind } => {
            let bind_addr = bind.unwrap_or_else(|| config.bind_addr.clone());
            tokio::spawn({
                let aggregator = Arc::clone(&aggregator);
                async move {
                    aggregator.refresh().await;
                }
            });
            WebServer::new(bind_addr, aggregator).run().await
        }
        Command::Snapshot => snapshot(&aggregator).await,
    }
}

async fn snapshot(aggregator: &Aggregator) -> anyhow::Result<()> {
    let failed_sources = match aggregator.refresh().await {
        RefreshOutcome::Completed { failed_sources } => failed_sources,
        RefreshOutcome::AlreadyRunning => anyhow::bail!("A refresh cycle is already running"),
    };

    let view = aggregator.view().await;
    println!("{}", serde_json::to_string_pretty(&view)?);

    if failed_sources > 0 {
        anyhow::bail!("{failed_sources} summary source(s) could not be loaded");
    }
    Ok(())
}

fn default_log_file() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("cview")
        .join("cview.log")
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(level: &str, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}
