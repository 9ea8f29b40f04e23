//! lb-sync
//!
//! Keeps a load balancer's forwarding configuration in step with the
//! worker nodes of a cluster.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────┐   nodes    ┌───────────┐  model   ┌──────────┐  text   ┌────────────┐
//!   │  discovery   │──────────▶│ reconcile │────────▶│  render  │───────▶│ supervisor │
//!   │ registry or  │            │ plan/diff │ (if new) │handlebars│         │launch/reload│
//!   │ static file  │            └───────────┘          └──────────┘         └─────┬──────┘
//!   └──────────────┘                 ▲  every interval                             │
//!                                    │                                             ▼
//!                              lifecycle (signals, shutdown)                 load balancer
//!                                                                              process
//! ```

use clap::Parser;
use tokio::sync::broadcast;

use lb_sync::cli::Cli;
use lb_sync::lifecycle::signals::shutdown_on_signal;
use lb_sync::lifecycle::startup::build_reconciler;
use lb_sync::lifecycle::Shutdown;
use lb_sync::observability::{logging, metrics};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.into_config()?;

    logging::init_logging(&config.observability.log_level);

    tracing::info!("lb-sync v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        interval_secs = config.interval_secs,
        node_pattern = %config.node_pattern,
        mappings = config.port_mappings.len(),
        debug = config.debug,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Validated already
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let reconciler = build_reconciler(&config).await?;

    let shutdown = Shutdown::new();
    let loop_shutdown: broadcast::Receiver<()> = shutdown.subscribe();
    let mut handle = tokio::spawn(reconciler.run(loop_shutdown));

    tokio::select! {
        result = shutdown_on_signal(&shutdown) => {
            // Without signal handlers the loop simply runs until killed
            if let Err(e) = result {
                tracing::error!(error = %e, "Unable to listen for shutdown signals");
            }
            handle.await?;
        }
        result = &mut handle => {
            result?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
