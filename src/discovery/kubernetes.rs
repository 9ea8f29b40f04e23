//! Kubernetes API node registry.
//!
//! # Responsibilities
//! - Resolve API server location and credentials (file or in-cluster)
//! - List nodes over HTTPS with bearer-token auth
//! - Tolerate individual malformed node objects
//!
//! # Design Decisions
//! - Token files are re-read on every request so rotated service-account
//!   tokens are picked up without a restart
//! - Wire types are all-optional; shape problems surface per node, not per list

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::config::RegistryConfig;
use crate::discovery::registry::{NodeAddress, NodeRegistry, RegistryNode};
use crate::discovery::RegistryError;

const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";

/// Where the bearer token comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    None,
    Inline(String),
    File(PathBuf),
}

/// API server location and credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub server: String,
    pub token: TokenSource,
    pub ca_file: Option<PathBuf>,
    pub insecure_skip_tls_verify: bool,
}

/// On-disk credentials file.
#[derive(Debug, Deserialize)]
struct CredentialsFile {
    server: String,
    token: Option<String>,
    token_file: Option<PathBuf>,
    ca_file: Option<PathBuf>,
    #[serde(default)]
    insecure_skip_tls_verify: bool,
}

impl Credentials {
    /// Plain credentials with an inline token.
    pub fn new(server: impl Into<String>, token: Option<String>) -> Self {
        Self {
            server: server.into(),
            token: token.map_or(TokenSource::None, TokenSource::Inline),
            ca_file: None,
            insecure_skip_tls_verify: false,
        }
    }

    /// Read a TOML credentials file.
    pub fn from_file(path: &Path) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: CredentialsFile = toml::from_str(&content).map_err(|e| RegistryError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let token = match (file.token, file.token_file) {
            (Some(_), Some(_)) => {
                return Err(RegistryError::Credentials(
                    "only one of token and token_file may be set".into(),
                ))
            }
            (Some(token), None) => TokenSource::Inline(token),
            (None, Some(path)) => TokenSource::File(path),
            (None, None) => TokenSource::None,
        };

        Ok(Self {
            server: file.server,
            token,
            ca_file: file.ca_file,
            insecure_skip_tls_verify: file.insecure_skip_tls_verify,
        })
    }

    /// The pod's own service account.
    pub fn in_cluster() -> Result<Self, RegistryError> {
        let host = std::env::var("KUBERNETES_SERVICE_HOST").map_err(|_| {
            RegistryError::Unavailable(
                "KUBERNETES_SERVICE_HOST is not set; not running in a cluster and no credentials file given"
                    .into(),
            )
        })?;
        let port = std::env::var("KUBERNETES_SERVICE_PORT").unwrap_or_else(|_| "443".to_string());

        // IPv6 service hosts need brackets in a URL
        let host = if host.contains(':') {
            format!("[{}]", host)
        } else {
            host
        };

        let dir = Path::new(SERVICE_ACCOUNT_DIR);
        Ok(Self {
            server: format!("https://{}:{}", host, port),
            token: TokenSource::File(dir.join("token")),
            ca_file: Some(dir.join("ca.crt")),
            insecure_skip_tls_verify: false,
        })
    }

    /// Credentials file if given, in-cluster identity otherwise.
    pub fn resolve(config: &RegistryConfig) -> Result<Self, RegistryError> {
        match &config.credentials_file {
            Some(path) => Self::from_file(path),
            None => Self::in_cluster(),
        }
    }
}

/// Registry client for the Kubernetes node API.
#[derive(Debug, Clone)]
pub struct KubernetesRegistry {
    client: reqwest::Client,
    nodes_url: Url,
    token: TokenSource,
}

impl KubernetesRegistry {
    pub fn new(credentials: Credentials, config: &RegistryConfig) -> Result<Self, RegistryError> {
        let nodes_url = nodes_url(&credentials.server, config.label_selector.as_deref())?;

        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(credentials.insecure_skip_tls_verify);

        if let Some(ca_file) = &credentials.ca_file {
            let pem = std::fs::read(ca_file).map_err(|source| RegistryError::Io {
                path: ca_file.clone(),
                source,
            })?;
            let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                RegistryError::Credentials(format!("bad CA certificate {}: {}", ca_file.display(), e))
            })?;
            builder = builder.add_root_certificate(cert);
        }

        let client = builder
            .build()
            .map_err(|e| RegistryError::Credentials(format!("cannot build HTTP client: {}", e)))?;

        tracing::info!(url = %nodes_url, "Registry client initialized");

        Ok(Self {
            client,
            nodes_url,
            token: credentials.token,
        })
    }

    async fn bearer_token(&self) -> Result<Option<String>, RegistryError> {
        match &self.token {
            TokenSource::None => Ok(None),
            TokenSource::Inline(token) => Ok(Some(token.clone())),
            TokenSource::File(path) => tokio::fs::read_to_string(path)
                .await
                .map(|t| Some(t.trim().to_string()))
                .map_err(|source| RegistryError::Io {
                    path: path.clone(),
                    source,
                }),
        }
    }
}

fn nodes_url(server: &str, label_selector: Option<&str>) -> Result<Url, RegistryError> {
    let mut base = Url::parse(server)
        .map_err(|e| RegistryError::Credentials(format!("invalid server URL '{}': {}", server, e)))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    let mut url = base
        .join("api/v1/nodes")
        .map_err(|e| RegistryError::Credentials(format!("invalid server URL '{}': {}", server, e)))?;
    if let Some(selector) = label_selector {
        url.query_pairs_mut().append_pair("labelSelector", selector);
    }
    Ok(url)
}

#[derive(Debug, Deserialize)]
struct NodeList {
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct WireNode {
    metadata: Option<WireMetadata>,
    status: Option<WireStatus>,
}

#[derive(Debug, Deserialize)]
struct WireMetadata {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireStatus {
    addresses: Option<Vec<WireAddress>>,
}

#[derive(Debug, Deserialize)]
struct WireAddress {
    #[serde(rename = "type")]
    kind: Option<String>,
    address: Option<String>,
}

/// Convert one list item, or `None` if it cannot identify a node.
fn decode_node(index: usize, item: serde_json::Value) -> Option<RegistryNode> {
    let wire: WireNode = match serde_json::from_value(item) {
        Ok(wire) => wire,
        Err(e) => {
            tracing::warn!(index, error = %e, "Malformed node object in registry response, skipping");
            return None;
        }
    };

    let Some(name) = wire.metadata.and_then(|m| m.name) else {
        tracing::warn!(index, "Node object has no name, skipping");
        return None;
    };

    let addresses = wire
        .status
        .and_then(|s| s.addresses)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|a| match (a.kind, a.address) {
            (Some(kind), Some(address)) => Some(NodeAddress { kind, address }),
            _ => None,
        })
        .collect();

    Some(RegistryNode { name, addresses })
}

#[async_trait]
impl NodeRegistry for KubernetesRegistry {
    async fn list_nodes(&self) -> Result<Vec<RegistryNode>, RegistryError> {
        let mut request = self.client.get(self.nodes_url.clone());
        if let Some(token) = self.bearer_token().await? {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|source| RegistryError::Connect {
            url: self.nodes_url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::Status {
                url: self.nodes_url.to_string(),
                status: status.as_u16(),
            });
        }

        let list: NodeList = response
            .json()
            .await
            .map_err(|e| RegistryError::Decode(e.to_string()))?;

        Ok(list
            .items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| decode_node(index, item))
            .collect())
    }
}
