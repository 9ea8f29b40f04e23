//! The unit of change detection.

use serde::Serialize;

use crate::model::{BackendDescriptor, PortMapping};

/// Desired load-balancer configuration.
///
/// Two models are equal exactly when they would render to the same
/// configuration, so the reconciliation loop compares these instead of
/// rendered text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigModel {
    pub backends: Vec<BackendDescriptor>,
    pub mappings: Vec<PortMapping>,
}

impl ConfigModel {
    /// Aggregate fetched backends and the static mappings.
    ///
    /// Backends are sorted by name then address; mappings keep their order.
    pub fn build(mut backends: Vec<BackendDescriptor>, mappings: &[PortMapping]) -> Self {
        backends.sort();
        Self {
            backends,
            mappings: mappings.to_vec(),
        }
    }

    pub fn backend_count(&self) -> usize {
        self.backends.len()
    }
}
