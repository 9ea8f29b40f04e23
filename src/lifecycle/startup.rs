//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn a validated `SyncConfig` into a ready `Reconciler`
//! - Pick the node source (static file or registry) and the supervisor
//!   (process or print)
//! - Run the one-off proxy node presence check
//!
//! # Design Decisions
//! - Fail fast: unusable credentials, templates or signals abort startup
//! - An unreachable registry does not; that is a per-cycle error

use std::time::Duration;

use thiserror::Error;

use crate::config::SyncConfig;
use crate::discovery::registry::node_exists;
use crate::discovery::{
    Credentials, KubernetesRegistry, NamePattern, NodeRegistry, NodeSource, RegistryError,
    RegistryNodeSource, StaticNodeSource,
};
use crate::reconcile::Reconciler;
use crate::render::{ConfigRenderer, HandlebarsRenderer, TemplateError};
use crate::supervisor::{PrintSupervisor, ProcessSupervisor, Supervisor, SupervisorError};

/// Errors that prevent the daemon from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid node pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Supervisor(#[from] SupervisorError),
}

/// Wire every component described by `config`.
pub async fn build_reconciler(config: &SyncConfig) -> Result<Reconciler, StartupError> {
    let source = build_source(config).await?;
    let renderer = build_renderer(config)?;
    let supervisor = build_supervisor(config)?;

    Ok(Reconciler::new(
        source,
        renderer,
        supervisor,
        config.port_mappings.clone(),
        Duration::from_secs(config.interval_secs),
    ))
}

pub async fn build_source(config: &SyncConfig) -> Result<Box<dyn NodeSource>, StartupError> {
    if let Some(path) = &config.static_nodes_file {
        tracing::info!(path = %path.display(), "Using static node list, registry bypassed");
        return Ok(Box::new(StaticNodeSource::new(path.clone())));
    }

    let credentials = Credentials::resolve(&config.registry)?;
    let registry = KubernetesRegistry::new(credentials, &config.registry)?;

    if let Some(proxy_node) = &config.proxy_node {
        check_proxy_node(&registry, proxy_node).await;
    }

    let pattern = NamePattern::new(&config.node_pattern)?;
    Ok(Box::new(RegistryNodeSource::new(
        registry,
        pattern,
        config.registry.address_type.clone(),
    )))
}

pub fn build_renderer(config: &SyncConfig) -> Result<Box<dyn ConfigRenderer>, StartupError> {
    let renderer = match &config.template_file {
        Some(path) => {
            tracing::info!(path = %path.display(), "Using custom template");
            HandlebarsRenderer::from_file(path)?
        }
        None => HandlebarsRenderer::builtin()?,
    };
    Ok(Box::new(renderer))
}

pub fn build_supervisor(config: &SyncConfig) -> Result<Box<dyn Supervisor>, StartupError> {
    if config.debug {
        tracing::info!("Debug mode: rendered configurations are printed, nothing is launched");
        return Ok(Box::new(PrintSupervisor::stdout()));
    }
    Ok(Box::new(ProcessSupervisor::new(&config.process)?))
}

/// Warn if the node meant to host the load balancer is not registered.
pub async fn check_proxy_node<R: NodeRegistry + ?Sized>(registry: &R, name: &str) {
    match node_exists(registry, name).await {
        Ok(true) => tracing::debug!(proxy_node = %name, "Proxy node found"),
        Ok(false) => tracing::warn!(proxy_node = %name, "Proxy node currently not found"),
        Err(e) => tracing::warn!(proxy_node = %name, error = %e, "Could not check for proxy node"),
    }
}
