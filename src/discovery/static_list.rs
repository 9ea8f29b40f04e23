//! Offline node list.
//!
//! Reads backends from a TOML file instead of the registry:
//!
//! ```toml
//! [[nodes]]
//! name = "node1"
//! address = "10.0.0.1"
//! ```
//!
//! The file is re-read on every fetch, so editing it drives reloads the same
//! way registry membership changes do.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;

use crate::discovery::{NodeSource, RegistryError};
use crate::model::BackendDescriptor;

#[derive(Debug, Deserialize)]
struct NodeListFile {
    #[serde(default)]
    nodes: Vec<StaticNode>,
}

#[derive(Debug, Deserialize)]
struct StaticNode {
    name: String,
    address: String,
}

/// `NodeSource` backed by a local file.
#[derive(Debug, Clone)]
pub struct StaticNodeSource {
    path: PathBuf,
}

impl StaticNodeSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl NodeSource for StaticNodeSource {
    async fn fetch(&self) -> Result<Vec<BackendDescriptor>, RegistryError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| RegistryError::Io {
                path: self.path.clone(),
                source,
            })?;

        let file: NodeListFile = toml::from_str(&content).map_err(|e| RegistryError::Parse {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        Ok(file
            .nodes
            .into_iter()
            .filter_map(|node| {
                let backend = BackendDescriptor::new(node.name.clone(), node.address.clone());
                if backend.is_none() {
                    tracing::warn!(
                        node = %node.name,
                        address = %node.address,
                        "Invalid name or address in static node list, skipping"
                    );
                }
                backend
            })
            .collect())
    }
}
