//! Switchyard gateway binary.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌────────────────────────────────────────────────────┐
//!                    │                     GATEWAY                        │
//!                    │                                                    │
//!   Client Request   │  ┌────────┐   ┌──────────┐   ┌──────────────────┐ │
//!   ─────────────────┼─▶│  http  │──▶│  rules   │──▶│    dispatch      │ │
//!                    │  │ server │   │ matcher  │   │                  │ │
//!                    │  └────────┘   └────┬─────┘   └────────┬─────────┘ │
//!                    │                    │                  │           │
//!                    │             ┌──────▼─────┐    ┌───────▼────────┐  │
//!                    │             │ rule store │    │    handlers    │  │
//!                    │             │  adapter   │    │ registry/cache │  │
//!                    │             └──────┬─────┘    └───────┬────────┘  │
//!                    │                    │                  │           │
//!                    └────────────────────┼──────────────────┼───────────┘
//!                                         ▼                  ▼
//!                                   rule collection     code store
//!                                      (remote document store)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use switchyard::config::load_config;
use switchyard::lifecycle::Shutdown;
use switchyard::observability::{logging, metrics};
use switchyard::store::{DocumentStore, HttpDocStore};
use switchyard::GatewayServer;

#[derive(Parser)]
#[command(name = "switchyard")]
#[command(about = "Dynamic HTTP handler dispatch gateway", long_about = None)]
struct Args {
    /// Path to the bootstrap configuration file.
    #[arg(short, long, default_value = "switchyard.toml")]
    config: PathBuf,

    /// Override the configured bind address.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // The bootstrap config is the trusted rule source; refuse to serve
    // without it.
    let mut config = match load_config(&args.config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!(
                "failed to load configuration from {}: {err}",
                args.config.display()
            );
            std::process::exit(1);
        }
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability.log_level);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "switchyard starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        rule_source = ?config.dispatch.source,
        bootstrap_rules = config.rules.len(),
        store = %config.store.base_url,
        "configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "failed to parse metrics address"
            );
        }
    }

    let store: Arc<dyn DocumentStore> = Arc::new(HttpDocStore::new(&config.store)?);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "listening for connections");

    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown signal received");
            shutdown.trigger();
        }
    });

    let server = GatewayServer::new(config, store);
    server.run(listener, shutdown_rx).await?;

    tracing::info!("shutdown complete");
    Ok(())
}
