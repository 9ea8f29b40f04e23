//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → node source → renderer → supervisor → Reconciler
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     Broadcast → loop exits at its next sleep → supervisor shutdown hook
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Shutdown never interrupts a cycle in progress
//! - The load balancer outlives the daemon unless `stop_on_exit` is set

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
