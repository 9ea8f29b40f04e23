//! Reconciliation subsystem.
//!
//! # Data Flow
//! ```text
//! every interval:
//!     NodeSource::fetch
//!     → plan.rs (build model, compare with last applied; pure)
//!     → unchanged: done
//!     → changed:   ConfigRenderer::render → Supervisor::apply
//!                  → success: model becomes last applied
//!                  → failure: last applied untouched, retried next cycle
//! ```
//!
//! # Design Decisions
//! - The last applied model is owned by the loop, never global
//! - Every cycle error is caught at the cycle boundary and logged with
//!   the step that failed; nothing inside a cycle can stop the loop
//! - Cycles are strictly sequential; shutdown is only observed while sleeping

use thiserror::Error;

use crate::discovery::RegistryError;
use crate::render::TemplateError;
use crate::supervisor::{ApplyOutcome, SupervisorError};

pub mod plan;
pub mod runner;

pub use plan::{plan_cycle, CyclePlan};
pub use runner::Reconciler;

/// Result of a cycle that completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Desired state equals the last applied state.
    Unchanged,
    /// A new configuration was rendered and applied.
    Applied(ApplyOutcome),
}

/// A failed cycle, tagged with the step that failed.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("fetch failed: {0}")]
    Fetch(#[source] RegistryError),

    #[error("render failed: {0}")]
    Render(#[source] TemplateError),

    #[error("apply failed: {0}")]
    Apply(#[source] SupervisorError),
}

impl CycleError {
    /// Name of the failed step, used in logs and metrics.
    pub fn step(&self) -> &'static str {
        match self {
            CycleError::Fetch(_) => "fetch",
            CycleError::Render(_) => "render",
            CycleError::Apply(_) => "apply",
        }
    }
}
