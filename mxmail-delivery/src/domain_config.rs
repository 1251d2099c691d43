//! Per-domain delivery configuration
//!
//! Allows routing a recipient domain to a fixed server instead of its MX
//! records, typically a local SMTP server during testing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dns::MailServer;

/// Configuration for a specific domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DomainConfig {
    /// Override MX server lookup with a specific host:port
    ///
    /// Use for testing to route messages to a local SMTP server:
    /// ```ron
    /// domains: {
    ///     "test.example.com": (
    ///         mx_override: Some("localhost:1025"),
    ///     ),
    /// }
    /// ```
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub mx_override: Option<String>,
}

impl DomainConfig {
    /// Get the MX override server address if configured
    #[must_use]
    pub fn mx_override_address(&self) -> Option<&str> {
        self.mx_override.as_deref()
    }
}

/// Registry of per-domain configurations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct DomainConfigRegistry {
    domains: HashMap<String, DomainConfig>,
}

impl DomainConfigRegistry {
    /// Create a new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            domains: HashMap::new(),
        }
    }

    /// Get configuration for a specific domain
    ///
    /// Domain names compare case-insensitively. Returns `None` if no
    /// configuration exists, in which case default behavior applies.
    #[must_use]
    pub fn get(&self, domain: &str) -> Option<&DomainConfig> {
        self.domains.get(domain).or_else(|| {
            self.domains
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(domain))
                .map(|(_, config)| config)
        })
    }

    /// Add or update configuration for a domain
    pub fn insert(&mut self, domain: String, config: DomainConfig) {
        self.domains.insert(domain, config);
    }

    /// The override server for `domain`, if one is configured.
    ///
    /// `default_port` applies when the override names no port.
    #[must_use]
    pub fn mx_override(&self, domain: &str, default_port: u16) -> Option<MailServer> {
        self.get(domain)
            .and_then(DomainConfig::mx_override_address)
            .map(|value| parse_mx_override(value, default_port))
    }
}

/// Parse an MX override string into a `MailServer`
///
/// Accepts `host`, `host:port`, `[ipv6]`, `[ipv6]:port` and bare IPv6
/// literals. An unparseable port falls back to `default_port`.
fn parse_mx_override(value: &str, default_port: u16) -> MailServer {
    let (host, port) = if let Some(rest) = value.strip_prefix('[') {
        match rest.split_once(']') {
            Some((host, tail)) => (host, tail.strip_prefix(':')),
            None => (rest, None),
        }
    } else {
        match value.rsplit_once(':') {
            Some((host, port)) if !host.contains(':') => (host, Some(port)),
            _ => (value, None),
        }
    };

    let port = port.map_or(default_port, |port| {
        port.parse().unwrap_or_else(|_| {
            warn!("Invalid port in MX override '{value}', using {default_port}");
            default_port
        })
    });

    MailServer::new(host.to_string(), 0, port)
}
