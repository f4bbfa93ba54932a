//! Dynamic upstream server
//!
//! Lists and mutates the peers of running upstream groups over HTTP.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────────────┐
//!                         │                  DYNAMIC UPSTREAM                    │
//!                         │                                                      │
//!     GET /dynamic?...    │  ┌─────────┐    ┌───────────┐    ┌──────────────┐    │
//!     ────────────────────┼─▶│  http   │───▶│   admin   │───▶│   dynamic    │    │
//!                         │  │ server  │    │ handlers  │    │ decode/apply │    │
//!                         │  └─────────┘    └───────────┘    └──────┬───────┘    │
//!                         │                                         │            │
//!                         │                                         ▼            │
//!                         │                                 ┌──────────────┐     │
//!                         │                                 │   upstream   │     │
//!                         │                                 │ group + zone │     │
//!                         │                                 └──────┬───────┘     │
//!     text listing        │                                        │             │
//!     ◀───────────────────┼──────────── listing (snapshot) ◀───────┘             │
//!                         │                                                      │
//!                         │  ┌────────────────────────────────────────────────┐  │
//!                         │  │             Cross-Cutting Concerns             │  │
//!                         │  │  ┌─────────┐ ┌──────────────┐ ┌─────────────┐  │  │
//!                         │  │  │ config  │ │observability │ │  lifecycle  │  │  │
//!                         │  │  └─────────┘ └──────────────┘ └─────────────┘  │  │
//!                         │  └────────────────────────────────────────────────┘  │
//!                         └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use dynamic_upstream::config::load_config;
use dynamic_upstream::http::AdminServer;
use dynamic_upstream::lifecycle::{bootstrap, shutdown_signal, Shutdown, StartupError};
use dynamic_upstream::observability::{logging, metrics};
use dynamic_upstream::upstream::SystemResolver;

#[derive(Parser)]
#[command(name = "dynamic-upstream")]
#[command(about = "Runtime management of upstream server groups", long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(&args.config).map_err(StartupError::from)?;

    logging::init(&config.observability);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %args.config.display(),
        "dynamic-upstream starting"
    );

    tracing::info!(
        bind_address = %config.listener.bind_address,
        admin_path = %config.admin.path,
        upstreams = config.upstreams.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr);
    }

    let engine = bootstrap(&config, Arc::new(SystemResolver))?;

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = AdminServer::new(&config, engine);
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    shutdown_signal().await;
    shutdown.trigger();
    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
