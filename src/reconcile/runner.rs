//! The reconciliation loop.
//!
//! # Responsibilities
//! - Run fetch → plan → render → apply on a fixed interval
//! - Own the last applied model
//! - Report every cycle result (logs, metrics) without propagating errors
//! - Hand the supervisor its shutdown hook when the loop stops

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::discovery::NodeSource;
use crate::model::{ConfigModel, PortMapping};
use crate::observability::metrics;
use crate::reconcile::plan::{plan_cycle, CyclePlan};
use crate::reconcile::{CycleError, CycleOutcome};
use crate::render::ConfigRenderer;
use crate::supervisor::{Supervisor, SupervisorState};

/// Drives the load balancer towards the current cluster membership.
pub struct Reconciler {
    source: Box<dyn NodeSource>,
    renderer: Box<dyn ConfigRenderer>,
    supervisor: Box<dyn Supervisor>,
    mappings: Vec<PortMapping>,
    interval: Duration,
    last_applied: Option<ConfigModel>,
}

impl Reconciler {
    pub fn new(
        source: Box<dyn NodeSource>,
        renderer: Box<dyn ConfigRenderer>,
        supervisor: Box<dyn Supervisor>,
        mappings: Vec<PortMapping>,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            renderer,
            supervisor,
            mappings,
            interval,
            last_applied: None,
        }
    }

    /// The model most recently applied successfully.
    pub fn last_applied(&self) -> Option<&ConfigModel> {
        self.last_applied.as_ref()
    }

    pub fn supervisor_state(&self) -> SupervisorState {
        self.supervisor.state()
    }

    /// Execute one cycle. `last_applied` only changes on a successful apply.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome, CycleError> {
        let backends = self.source.fetch().await.map_err(CycleError::Fetch)?;
        metrics::record_backends(backends.len());

        let model = match plan_cycle(self.last_applied.as_ref(), backends, &self.mappings) {
            CyclePlan::Unchanged => return Ok(CycleOutcome::Unchanged),
            CyclePlan::Apply(model) => model,
        };

        let text = self.renderer.render(&model).map_err(CycleError::Render)?;
        let outcome = self
            .supervisor
            .apply(&text)
            .await
            .map_err(CycleError::Apply)?;

        self.last_applied = Some(model);
        Ok(CycleOutcome::Applied(outcome))
    }

    fn report(&self, result: &Result<CycleOutcome, CycleError>) {
        match result {
            Ok(CycleOutcome::Unchanged) => {
                metrics::record_cycle("unchanged");
                tracing::debug!("Backends unchanged, nothing to apply");
            }
            Ok(CycleOutcome::Applied(outcome)) => {
                metrics::record_cycle("applied");
                let backends = self.last_applied.as_ref().map_or(0, ConfigModel::backend_count);
                tracing::info!(backends, outcome = ?outcome, "Configuration applied");
            }
            Err(e) => {
                metrics::record_cycle("failed");
                metrics::record_cycle_error(e.step());
                tracing::error!(
                    step = e.step(),
                    error = %e,
                    "Reconciliation cycle failed, keeping last applied configuration"
                );
            }
        }
    }

    /// Run cycles until shutdown is signalled, then let the supervisor
    /// clean up.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            mappings = self.mappings.len(),
            "Reconciliation loop starting"
        );

        loop {
            {
                let result = self.run_cycle().await;
                self.report(&result);
            }

            tokio::select! {
                _ = time::sleep(self.interval) => {}
                _ = shutdown.recv() => {
                    tracing::info!("Reconciliation loop received shutdown signal, exiting loop");
                    break;
                }
            }
        }

        if let Err(e) = self.supervisor.shutdown().await {
            tracing::error!(error = %e, "Supervisor shutdown failed");
        }
    }
}
