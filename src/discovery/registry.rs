//! Registry-backed node source.
//!
//! # Responsibilities
//! - Define the registry query interface (`list_nodes`)
//! - Filter nodes by name pattern
//! - Pick each node's first address of the configured type
//! - Drop nodes without a usable address, with a diagnostic

use async_trait::async_trait;
use regex::Regex;

use crate::discovery::{NodeSource, RegistryError};
use crate::model::BackendDescriptor;

/// One address entry of a registry node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeAddress {
    /// Address type, e.g. `InternalIP`, `ExternalIP`, `Hostname`.
    pub kind: String,
    pub address: String,
}

impl NodeAddress {
    pub fn new(kind: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            address: address.into(),
        }
    }
}

/// A node as listed by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryNode {
    pub name: String,
    pub addresses: Vec<NodeAddress>,
}

/// The cluster-node registry.
#[async_trait]
pub trait NodeRegistry: Send + Sync {
    /// List every node, in the registry's enumeration order.
    async fn list_nodes(&self) -> Result<Vec<RegistryNode>, RegistryError>;
}

/// Node-name predicate. Matches at the start of the name, not anywhere in it.
#[derive(Debug, Clone)]
pub struct NamePattern {
    regex: Option<Regex>,
}

impl NamePattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{})", pattern))?;
        Ok(Self { regex: Some(regex) })
    }

    /// Pattern that accepts every node.
    pub fn any() -> Self {
        Self { regex: None }
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.as_ref().map_or(true, |r| r.is_match(name))
    }
}

/// `NodeSource` over any `NodeRegistry`.
pub struct RegistryNodeSource<R> {
    registry: R,
    pattern: NamePattern,
    address_type: String,
}

impl<R: NodeRegistry> RegistryNodeSource<R> {
    pub fn new(registry: R, pattern: NamePattern, address_type: impl Into<String>) -> Self {
        Self {
            registry,
            pattern,
            address_type: address_type.into(),
        }
    }

    /// Turn one registry node into a backend, if it has a usable address.
    fn to_backend(&self, node: &RegistryNode) -> Option<BackendDescriptor> {
        let Some(entry) = node
            .addresses
            .iter()
            .find(|a| a.kind == self.address_type)
        else {
            tracing::warn!(
                node = %node.name,
                address_type = %self.address_type,
                "No address of the requested type found for node, skipping"
            );
            return None;
        };

        let backend = BackendDescriptor::new(node.name.clone(), entry.address.clone());
        if backend.is_none() {
            tracing::warn!(
                node = %node.name,
                address = %entry.address,
                "Node name or address is not usable in a config file, skipping"
            );
        }
        backend
    }
}

#[async_trait]
impl<R: NodeRegistry> NodeSource for RegistryNodeSource<R> {
    async fn fetch(&self) -> Result<Vec<BackendDescriptor>, RegistryError> {
        let nodes = self.registry.list_nodes().await?;
        let total = nodes.len();

        let backends: Vec<_> = nodes
            .iter()
            .filter(|node| self.pattern.matches(&node.name))
            .filter_map(|node| self.to_backend(node))
            .collect();

        tracing::debug!(nodes = total, backends = backends.len(), "Fetched nodes from registry");
        Ok(backends)
    }
}

/// Returns true if the registry lists a node with this exact name.
pub async fn node_exists<R: NodeRegistry + ?Sized>(
    registry: &R,
    name: &str,
) -> Result<bool, RegistryError> {
    Ok(registry.list_nodes().await?.iter().any(|n| n.name == name))
}
