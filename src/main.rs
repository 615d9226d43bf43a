//! Hit counter service.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────┐
//!                     │                   HIT COUNTER                    │
//!                     │                                                  │
//!   Client Request    │  ┌─────────┐   ┌──────────┐   ┌──────────────┐   │
//!   ──────────────────┼─▶│  http   │──▶│ adapter  │──▶│   dispatch   │   │
//!                     │  │ server  │   │ profile  │   │ get/hit/...  │   │
//!                     │  └─────────┘   └──────────┘   └──────┬───────┘   │
//!                     │                                      │           │
//!                     │                                      ▼           │
//!                     │                               ┌──────────────┐   │
//!                     │                               │   counter    │   │
//!                     │                               │   service    │   │
//!                     │                               └──────┬───────┘   │
//!                     │                                      │           │
//!                     │                                      ▼           │    Remote JSON
//!   Client Response   │  ┌─────────┐                  ┌──────────────┐   │    document
//!   ◀─────────────────┼──│response │◀─────────────────│ store client │◀──┼──▶ store
//!                     │  └─────────┘                  └──────────────┘   │
//!                     │                                                  │
//!                     │  config · observability · resilience · lifecycle │
//!                     └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use hit_counter::config::{load_config, watcher::ConfigWatcher};
use hit_counter::observability::{logging, metrics};
use hit_counter::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "hit-counter")]
#[command(about = "Per-key hit counter backed by a remote JSON document store", long_about = None)]
struct Args {
    /// TOML configuration file. Watched for changes when given.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    logging::init_logging(&config.observability);

    tracing::info!("hit-counter v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        adapter = ?config.adapter.kind,
        store_backend = ?config.store.backend,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    // Keep the watcher alive for the lifetime of the server
    let (_watcher, config_updates) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path, config.clone());
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config)?;
    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
