//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (interval > 0, ports valid)
//! - Detect conflicting port mappings
//! - Check that patterns and signal names resolve
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SyncConfig → Result<(), Vec<ValidationError>>
//! - Runs after command-line overrides are merged, before anything starts

use std::collections::HashSet;
use std::net::SocketAddr;

use regex::Regex;
use thiserror::Error;

use crate::config::schema::SyncConfig;
use crate::supervisor::parse_signal;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("interval_secs must be greater than zero")]
    ZeroInterval,

    #[error("at least one port mapping is required")]
    NoPortMappings,

    #[error("port mapping {listen}:{target} uses port 0")]
    ZeroPort { listen: u16, target: u16 },

    #[error("listen port {0} is mapped more than once")]
    DuplicateListenPort(u16),

    #[error("node_pattern '{pattern}' is not a valid regex: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("process.executable must not be empty")]
    EmptyExecutable,

    #[error("process.config_path must not be empty")]
    EmptyConfigPath,

    #[error("process.reload_signal '{0}' is not a known signal")]
    UnknownSignal(String),

    #[error("registry.timeout_secs must be greater than zero")]
    ZeroRegistryTimeout,

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a fully merged configuration.
pub fn validate_config(config: &SyncConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.interval_secs == 0 {
        errors.push(ValidationError::ZeroInterval);
    }

    if config.port_mappings.is_empty() {
        errors.push(ValidationError::NoPortMappings);
    }

    let mut seen = HashSet::new();
    for mapping in &config.port_mappings {
        if mapping.listen_port == 0 || mapping.target_port == 0 {
            errors.push(ValidationError::ZeroPort {
                listen: mapping.listen_port,
                target: mapping.target_port,
            });
        }
        if !seen.insert(mapping.listen_port) {
            errors.push(ValidationError::DuplicateListenPort(mapping.listen_port));
        }
    }

    if let Err(e) = Regex::new(&config.node_pattern) {
        errors.push(ValidationError::InvalidPattern {
            pattern: config.node_pattern.clone(),
            reason: e.to_string(),
        });
    }

    // Debug mode never touches the process, so its settings are irrelevant
    if !config.debug {
        if config.process.executable.trim().is_empty() {
            errors.push(ValidationError::EmptyExecutable);
        }
        if config.process.config_path.as_os_str().is_empty() {
            errors.push(ValidationError::EmptyConfigPath);
        }
        if parse_signal(&config.process.reload_signal).is_none() {
            errors.push(ValidationError::UnknownSignal(
                config.process.reload_signal.clone(),
            ));
        }
    }

    if config.static_nodes_file.is_none() && config.registry.timeout_secs == 0 {
        errors.push(ValidationError::ZeroRegistryTimeout);
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PortMapping;

    fn valid() -> SyncConfig {
        SyncConfig {
            port_mappings: vec![PortMapping::new(80, 30000)],
            ..SyncConfig::default()
        }
    }

    #[test]
    fn test_defaults_with_mapping_are_valid() {
        assert_eq!(validate_config(&valid()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = valid();
        config.interval_secs = 0;
        config.node_pattern = "(".into();
        config.process.reload_signal = "SIGNOPE".into();
        config.port_mappings.push(PortMapping::new(80, 30001));

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::ZeroInterval));
        assert!(errors.contains(&ValidationError::DuplicateListenPort(80)));
        assert!(errors.contains(&ValidationError::UnknownSignal("SIGNOPE".into())));
        assert!(matches!(errors[1], ValidationError::DuplicateListenPort(80)));
    }

    #[test]
    fn test_zero_port_rejected() {
        let mut config = valid();
        config.port_mappings = vec![PortMapping::new(0, 30000)];
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::ZeroPort {
                listen: 0,
                target: 30000
            }])
        );
    }

    #[test]
    fn test_debug_mode_ignores_process_settings() {
        let mut config = valid();
        config.debug = true;
        config.process.executable = String::new();
        config.process.reload_signal = "bogus".into();
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_short_signal_names_accepted() {
        let mut config = valid();
        config.process.reload_signal = "hup".into();
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = valid();
        config.observability.metrics_address = "not-an-addr".into();
        assert_eq!(validate_config(&config), Ok(()));

        config.observability.metrics_enabled = true;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::InvalidMetricsAddress(
                "not-an-addr".into()
            )])
        );
    }
}
