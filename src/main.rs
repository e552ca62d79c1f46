//! Projekt Susi forms service.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────────┐
//!                    │                     FORMS SERVICE                     │
//!                    │                                                       │
//!  POST /api/contact │  ┌────────┐   ┌──────────┐   ┌──────────┐            │
//!  ──────────────────┼─▶│  http  │──▶│  forms   │──▶│ security │            │
//!  POST /api/news... │  │ server │   │ sanitize │   │  client  │            │
//!                    │  └────────┘   │ validate │   │  + rate  │            │
//!                    │       ▲       └──────────┘   │  limiter │            │
//!                    │       │                      └────┬─────┘            │
//!                    │  ┌────┴─────┐                     ▼                  │
//!  JSON response     │  │ boundary │◀──────────────  ┌────────┐             │
//!  ◀─────────────────┼──│ response │                 │  sink  │             │
//!                    │  └──────────┘                 └────────┘             │
//!                    │                                                       │
//!                    │  config (TOML + hot reload) · observability · signals │
//!                    └──────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use susi_forms::config::{load_config, watcher::ConfigWatcher, FormsConfig};
use susi_forms::observability::{logging, metrics};
use susi_forms::{HttpServer, Shutdown};

#[derive(Parser, Debug)]
#[command(name = "susi-forms")]
#[command(about = "Form submission backend for the Projekt Susi website")]
struct Args {
    /// Path to a TOML config file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let file_config = match &args.config {
        Some(path) => load_config(path)?,
        None => FormsConfig::default(),
    };
    let mut config = file_config.clone();
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability);

    tracing::info!("susi-forms v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_requests = config.rate_limit.max_requests,
        window_secs = config.rate_limit.window_secs,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Keep the watcher alive for the lifetime of the server.
    let (config_updates, _watcher) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path, file_config);
            (updates, Some(watcher.run()?))
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (updates, None)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let server = HttpServer::new(config);
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
