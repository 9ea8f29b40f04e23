//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for SIGINT or SIGTERM
//! - Translate the first one into a shutdown broadcast

use tokio::signal::unix::{signal, SignalKind};

use crate::lifecycle::Shutdown;

/// Resolve once SIGINT or SIGTERM arrives, then trigger shutdown.
pub async fn shutdown_on_signal(shutdown: &Shutdown) -> std::io::Result<()> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => tracing::info!("Received SIGTERM, shutting down..."),
        _ = sigint.recv() => tracing::info!("Received SIGINT, shutting down..."),
    }

    shutdown.trigger();
    Ok(())
}
