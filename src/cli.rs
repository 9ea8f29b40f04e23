//! Command-line surface.
//!
//! Every flag overrides the matching setting from the optional `--config`
//! file; anything left unset keeps its file or built-in default.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{read_config, validate_config, ConfigError, SyncConfig};
use crate::model::PortMapping;

#[derive(Debug, Parser)]
#[command(name = "lb-sync", version)]
#[command(about = "Keep a load balancer's backends in sync with cluster nodes", long_about = None)]
pub struct Cli {
    /// Port mappings forwarded to every backend node
    #[arg(value_name = "LISTEN:TARGET")]
    pub mappings: Vec<PortMapping>,

    /// TOML settings file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Seconds between reconciliation cycles [default: 30]
    #[arg(short, long, value_name = "SECS")]
    pub interval: Option<u64>,

    /// Regex matched against the start of node names [default: all nodes]
    #[arg(short = 'p', long = "pattern", value_name = "REGEX")]
    pub node_pattern: Option<String>,

    /// Load-balancer executable [default: haproxy]
    #[arg(long, value_name = "PATH")]
    pub lb_executable: Option<String>,

    /// Where the generated load-balancer config is written
    #[arg(long, value_name = "PATH")]
    pub lb_config: Option<PathBuf>,

    /// Registry credentials file [default: in-cluster service account]
    #[arg(long = "credentials", value_name = "FILE")]
    pub credentials_file: Option<PathBuf>,

    /// Static node list used instead of the registry
    #[arg(long = "nodes-file", value_name = "FILE")]
    pub static_nodes_file: Option<PathBuf>,

    /// Handlebars template for the load-balancer config
    #[arg(long = "template", value_name = "FILE")]
    pub template_file: Option<PathBuf>,

    /// Node expected to run the load balancer; only checked at startup
    #[arg(long, value_name = "NAME")]
    pub proxy_node: Option<String>,

    /// Print rendered configs instead of launching the load balancer
    #[arg(long)]
    pub debug: bool,

    /// Log level when RUST_LOG is unset
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl Cli {
    /// Merge flags over the settings file (if any) and validate the result.
    pub fn into_config(self) -> Result<SyncConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => SyncConfig::default(),
        };
        self.apply_overrides(&mut config);
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }

    fn apply_overrides(self, config: &mut SyncConfig) {
        if !self.mappings.is_empty() {
            config.port_mappings = self.mappings;
        }
        if let Some(interval) = self.interval {
            config.interval_secs = interval;
        }
        if let Some(pattern) = self.node_pattern {
            config.node_pattern = pattern;
        }
        if let Some(executable) = self.lb_executable {
            config.process.executable = executable;
        }
        if let Some(path) = self.lb_config {
            config.process.config_path = path;
        }
        if let Some(path) = self.credentials_file {
            config.registry.credentials_file = Some(path);
        }
        if let Some(path) = self.static_nodes_file {
            config.static_nodes_file = Some(path);
        }
        if let Some(path) = self.template_file {
            config.template_file = Some(path);
        }
        if let Some(node) = self.proxy_node {
            config.proxy_node = Some(node);
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
        config.debug |= self.debug;
    }
}
