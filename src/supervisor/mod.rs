//! Load-balancer process supervision.
//!
//! # Data Flow
//! ```text
//! apply(config_text):
//!     config_file.rs writes the file (temp file + rename)
//!     → NOT_STARTED: process.rs spawns the executable → RUNNING(pid)
//!     → RUNNING:     process.rs signals pid to reload
//!
//! debug mode:
//!     print.rs writes the text to stdout instead
//! ```
//!
//! # Design Decisions
//! - The config file is complete on disk before any spawn or signal
//! - At most one child is alive; a second spawn only happens after the
//!   first one is known to be gone
//! - A failed spawn leaves the state at NOT_STARTED so the next apply
//!   starts over
//! - Reload completion is not awaited; the child adopts the config on its
//!   own schedule

use std::path::PathBuf;
use std::str::FromStr;

use async_trait::async_trait;
use nix::errno::Errno;
use nix::sys::signal::Signal;
use thiserror::Error;

pub mod config_file;
pub mod print;
pub mod process;

pub use print::PrintSupervisor;
pub use process::ProcessSupervisor;

/// Lifecycle state of the managed process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    NotStarted,
    Running,
}

/// What an apply did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// A new process was spawned.
    Launched { pid: u32 },
    /// The running process was signalled to reload.
    Reloaded { pid: u32 },
    /// The configuration was printed (debug mode).
    Printed,
}

/// Makes a rendered configuration take effect.
#[async_trait]
pub trait Supervisor: Send {
    /// Write `config_text` and launch or reload the load balancer.
    async fn apply(&mut self, config_text: &str) -> Result<ApplyOutcome, SupervisorError>;

    fn state(&self) -> SupervisorState;

    /// Called once when the daemon exits.
    async fn shutdown(&mut self) -> Result<(), SupervisorError> {
        Ok(())
    }
}

/// Errors raised while applying a configuration.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("could not write config file {}: {source}", .path.display())]
    WriteConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not start {executable}: {source}")]
    Spawn {
        executable: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{executable} exited before its pid could be recorded")]
    MissingPid { executable: String },

    #[error("load balancer process {pid} has exited ({status})")]
    Exited { pid: u32, status: String },

    #[error("could not send {signal:?} to process {pid}: {source}")]
    Signal {
        pid: u32,
        signal: Signal,
        #[source]
        source: Errno,
    },

    #[error("could not stop process {pid}: {reason}")]
    Stop { pid: u32, reason: String },

    #[error("unknown reload signal '{0}'")]
    UnknownSignal(String),

    #[error("could not print configuration: {0}")]
    Output(#[source] std::io::Error),
}

/// Parse a signal name such as `SIGUSR2`, `usr2` or `HUP`.
pub fn parse_signal(name: &str) -> Option<Signal> {
    let upper = name.trim().to_ascii_uppercase();
    let full = if upper.starts_with("SIG") {
        upper
    } else {
        format!("SIG{}", upper)
    };
    Signal::from_str(&full).ok()
}
