//! Static listen → target port mappings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Forward connections arriving on `listen_port` to `target_port` on every backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortMapping {
    pub listen_port: u16,
    pub target_port: u16,
}

impl PortMapping {
    pub fn new(listen_port: u16, target_port: u16) -> Self {
        Self {
            listen_port,
            target_port,
        }
    }
}

/// Error parsing a `listen:target` pair.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingParseError {
    #[error("expected LISTEN:TARGET, got '{0}'")]
    Format(String),

    #[error("invalid port '{0}': must be 1-65535")]
    Port(String),
}

impl FromStr for PortMapping {
    type Err = MappingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (listen, target) = s
            .split_once(':')
            .ok_or_else(|| MappingParseError::Format(s.to_string()))?;
        Ok(Self::new(parse_port(listen)?, parse_port(target)?))
    }
}

fn parse_port(raw: &str) -> Result<u16, MappingParseError> {
    match raw.trim().parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(MappingParseError::Port(raw.to_string())),
    }
}

impl fmt::Display for PortMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.listen_port, self.target_port)
    }
}
