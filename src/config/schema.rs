//! Configuration schema definitions.
//!
//! This module defines the complete settings structure for the sync daemon.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::model::PortMapping;

/// Placeholder in `process.args` replaced by the generated config path.
pub const CONFIG_PATH_PLACEHOLDER: &str = "{config}";

/// Root configuration for the sync daemon.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Seconds to sleep between reconciliation cycles.
    pub interval_secs: u64,

    /// Regex matched against the start of each node name.
    pub node_pattern: String,

    /// Listen → target port pairs forwarded to every backend.
    pub port_mappings: Vec<PortMapping>,

    /// Node expected to host the load balancer (presence is only checked).
    pub proxy_node: Option<String>,

    /// Render and print instead of launching or reloading anything.
    pub debug: bool,

    /// Offline node list used instead of the registry.
    pub static_nodes_file: Option<PathBuf>,

    /// Handlebars template overriding the built-in HAProxy template.
    pub template_file: Option<PathBuf>,

    /// Node registry access.
    pub registry: RegistryConfig,

    /// Managed load-balancer process.
    pub process: ProcessConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            node_pattern: ".*".to_string(),
            port_mappings: Vec::new(),
            proxy_node: None,
            debug: false,
            static_nodes_file: None,
            template_file: None,
            registry: RegistryConfig::default(),
            process: ProcessConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Registry (cluster API) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Credentials file; the in-cluster service account is used when unset.
    pub credentials_file: Option<PathBuf>,

    /// Address type selected from each node's address list.
    pub address_type: String,

    /// Optional label selector forwarded to the node list query.
    pub label_selector: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            credentials_file: None,
            address_type: "InternalIP".to_string(),
            label_selector: None,
            timeout_secs: 10,
        }
    }
}

/// Load-balancer process configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProcessConfig {
    /// Load-balancer executable.
    pub executable: String,

    /// Arguments; `{config}` is replaced by `config_path`.
    pub args: Vec<String>,

    /// Where the generated configuration is written.
    pub config_path: PathBuf,

    /// Signal that makes the running process re-read its configuration.
    pub reload_signal: String,

    /// Terminate the child when the daemon shuts down.
    pub stop_on_exit: bool,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            executable: "haproxy".to_string(),
            args: vec![
                "-W".to_string(),
                "-db".to_string(),
                "-f".to_string(),
                CONFIG_PATH_PLACEHOLDER.to_string(),
            ],
            config_path: PathBuf::from("/etc/haproxy/haproxy.cfg"),
            reload_signal: "SIGUSR2".to_string(),
            stop_on_exit: false,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_file_uses_defaults() {
        let config: SyncConfig = toml::from_str(
            r#"
            [[port_mappings]]
            listen_port = 80
            target_port = 30000
            "#,
        )
        .unwrap();

        assert_eq!(config.interval_secs, 30);
        assert_eq!(config.node_pattern, ".*");
        assert_eq!(config.port_mappings, vec![PortMapping::new(80, 30000)]);
        assert_eq!(config.process.executable, "haproxy");
        assert_eq!(config.process.reload_signal, "SIGUSR2");
        assert_eq!(config.registry.address_type, "InternalIP");
        assert!(!config.debug);
    }

    #[test]
    fn test_nested_sections_override() {
        let config: SyncConfig = toml::from_str(
            r#"
            interval_secs = 5
            node_pattern = "^node"

            [process]
            executable = "/usr/sbin/haproxy"
            config_path = "/tmp/lb.cfg"

            [registry]
            label_selector = "role=worker"
            "#,
        )
        .unwrap();

        assert_eq!(config.interval_secs, 5);
        assert_eq!(config.process.executable, "/usr/sbin/haproxy");
        assert_eq!(config.process.config_path, PathBuf::from("/tmp/lb.cfg"));
        // Untouched fields in a present section keep their defaults
        assert_eq!(config.process.reload_signal, "SIGUSR2");
        assert_eq!(config.registry.label_selector.as_deref(), Some("role=worker"));
    }
}
