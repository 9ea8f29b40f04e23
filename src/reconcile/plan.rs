//! Change detection for one cycle.

use crate::model::{BackendDescriptor, ConfigModel, PortMapping};

/// What a cycle has to do after fetching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CyclePlan {
    /// Nothing changed; no render, no apply.
    Unchanged,
    /// Render and apply this model. It only becomes the last applied model
    /// once the apply succeeds.
    Apply(ConfigModel),
}

/// Decide whether freshly fetched backends require an update.
pub fn plan_cycle(
    last_applied: Option<&ConfigModel>,
    backends: Vec<BackendDescriptor>,
    mappings: &[PortMapping],
) -> CyclePlan {
    let model = ConfigModel::build(backends, mappings);
    match last_applied {
        Some(last) if *last == model => CyclePlan::Unchanged,
        _ => CyclePlan::Apply(model),
    }
}
