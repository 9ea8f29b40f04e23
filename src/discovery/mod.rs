//! Backend discovery subsystem.
//!
//! # Data Flow
//! ```text
//! Registry mode:
//!     kubernetes.rs (GET /api/v1/nodes)
//!     → registry.rs (name pattern filter, address extraction)
//!     → Vec<BackendDescriptor> in registry order
//!
//! Offline mode:
//!     static_list.rs (TOML node list, re-read every cycle)
//!     → Vec<BackendDescriptor> in file order
//! ```
//!
//! # Design Decisions
//! - One malformed node never fails a fetch; it is skipped with a warning
//! - Only an unreachable or unreadable source is a `RegistryError`
//! - Sources are read-only; nothing here caches between cycles

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::BackendDescriptor;

pub mod kubernetes;
pub mod registry;
pub mod static_list;

pub use kubernetes::{Credentials, KubernetesRegistry};
pub use registry::{NamePattern, NodeAddress, NodeRegistry, RegistryNode, RegistryNodeSource};
pub use static_list::StaticNodeSource;

/// Produces the current list of backends.
#[async_trait]
pub trait NodeSource: Send + Sync {
    /// Fetch every viable backend. Fails only if the source as a whole is
    /// unavailable.
    async fn fetch(&self) -> Result<Vec<BackendDescriptor>, RegistryError>;
}

/// Errors that can occur while fetching backends.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The request never produced a response.
    #[error("registry request to {url} failed: {source}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The registry answered with a non-success status.
    #[error("registry returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// The response body was not a node list.
    #[error("could not decode registry response: {0}")]
    Decode(String),

    /// Credentials are missing or unusable.
    #[error("invalid registry credentials: {0}")]
    Credentials(String),

    /// The registry cannot be located at all.
    #[error("registry unavailable: {0}")]
    Unavailable(String),

    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },
}
