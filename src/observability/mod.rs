//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events on stderr)
//!     → metrics.rs (counters and gauges)
//!
//! Consumers:
//!     → Log aggregation (stderr of the daemon)
//!     → Metrics endpoint (Prometheus scrape, opt-in)
//! ```
//!
//! # Design Decisions
//! - Logs go to stderr so debug mode can own stdout
//! - Metrics are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
