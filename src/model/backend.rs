//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single cluster node eligible to receive traffic
//! - Guarantee the name and address are usable before the descriptor exists

use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// A single backend node, as seen in one poll cycle.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BackendDescriptor {
    /// Node name as reported by the registry.
    pub name: String,
    /// Reachable IP address or host name.
    pub address: String,
}

impl BackendDescriptor {
    /// Create a descriptor, returning `None` if the name is not a plain
    /// node name or the address is not a valid IP address or host name.
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Option<Self> {
        let name = name.into();
        let address = address.into();
        if !is_valid_name(&name) || !is_valid_address(&address) {
            return None;
        }
        Some(Self { name, address })
    }
}

impl fmt::Display for BackendDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.address)
    }
}

/// Returns true for a name that is safe to place in a config file as a
/// single token: ASCII letters, digits, `-`, `_` and `.`.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 253
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Returns true for an IPv4/IPv6 literal or an RFC 1123 host name.
pub fn is_valid_address(address: &str) -> bool {
    if address.is_empty() {
        return false;
    }
    if address.parse::<IpAddr>().is_ok() {
        return true;
    }
    is_valid_hostname(address)
}

fn is_valid_hostname(host: &str) -> bool {
    let host = host.strip_suffix('.').unwrap_or(host);
    if host.is_empty() || host.len() > 253 {
        return false;
    }
    // A dotted string of digits is a malformed IPv4 address, not a host name
    if host.split('.').all(|label| label.chars().all(|c| c.is_ascii_digit())) {
        return false;
    }
    host.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}
