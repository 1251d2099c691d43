//! DNS resolution for mail delivery.
//!
//! Looks up the MX records of a recipient domain and turns them into an
//! ordered list of candidate servers, most preferred first. There is no
//! A/AAAA fallback and no caching: every delivery resolves afresh.

use std::{future::Future, time::Duration};

use hickory_resolver::{
    TokioResolver, config::ResolverOpts, name_server::TokioConnectionProvider,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Upper bound on the number of candidate servers tried for one delivery.
pub const MAX_MAIL_SERVERS: usize = 50;

/// Well-known SMTP port.
pub const DEFAULT_SMTP_PORT: u16 = 25;

/// Errors that can occur during DNS resolution.
#[derive(Debug, Error)]
pub enum DnsError {
    /// The domain exists but publishes no usable MX records.
    #[error("No mail servers found for domain: {0}")]
    NoMailServers(String),

    /// DNS query failed due to network or resolver issues.
    #[error("DNS lookup failed: {0}")]
    LookupFailed(#[from] hickory_resolver::ResolveError),

    /// Domain does not exist (NXDOMAIN).
    #[error("Domain does not exist: {0}")]
    DomainNotFound(String),
}

/// Configuration for DNS resolver.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DnsConfig {
    /// DNS query timeout in seconds (default: 5)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_timeout_secs() -> u64 {
    5
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Represents a mail server target with its priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailServer {
    /// The hostname or IP address of the mail server.
    pub host: String,
    /// MX preference (lower value = higher priority).
    pub priority: u16,
    /// Port number (default: 25).
    pub port: u16,
}

impl MailServer {
    /// Creates a new mail server entry.
    #[must_use]
    pub const fn new(host: String, priority: u16, port: u16) -> Self {
        Self {
            host,
            priority,
            port,
        }
    }

    /// Returns the full address as `host:port`, bracketing IPv6 literals.
    #[must_use]
    pub fn address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

/// One MX answer as received from DNS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MxRecord {
    pub preference: u16,
    pub exchange: String,
}

impl MxRecord {
    #[must_use]
    pub fn new(preference: u16, exchange: impl Into<String>) -> Self {
        Self {
            preference,
            exchange: exchange.into(),
        }
    }
}

/// Turn raw MX answers into the ordered candidate list.
///
/// Exchanges that are empty once the root dot is removed are skipped (this
/// covers the RFC 7505 null MX). The sort is stable, so records sharing a
/// preference keep their answer order. At most [`MAX_MAIL_SERVERS`] are kept.
pub fn order_mail_servers(
    records: impl IntoIterator<Item = MxRecord>,
    port: u16,
) -> Vec<MailServer> {
    let mut servers: Vec<MailServer> = records
        .into_iter()
        .filter_map(|record| {
            let host = record.exchange.trim_end_matches('.');
            if host.is_empty() {
                debug!(
                    "Skipping MX record with empty exchange (preference {})",
                    record.preference
                );
                None
            } else {
                Some(MailServer::new(host.to_string(), record.preference, port))
            }
        })
        .collect();

    servers.sort_by_key(|server| server.priority);
    servers.truncate(MAX_MAIL_SERVERS);
    servers
}

/// Source of candidate servers for a recipient domain.
pub trait ResolveMailServers {
    /// Resolve `domain` to its candidate servers, most preferred first, each
    /// addressed on `port`.
    ///
    /// # Errors
    ///
    /// Returns `DnsError` if the domain has no usable mail servers or the
    /// lookup itself fails.
    fn resolve_mail_servers(
        &self,
        domain: &str,
        port: u16,
    ) -> impl Future<Output = Result<Vec<MailServer>, DnsError>> + Send;
}

/// MX resolver backed by the system DNS configuration.
#[derive(Debug)]
pub struct DnsResolver {
    resolver: TokioResolver,
}

impl DnsResolver {
    /// Creates a new DNS resolver with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the system DNS configuration cannot be loaded.
    pub fn new() -> Result<Self, DnsError> {
        Self::with_dns_config(&DnsConfig::default())
    }

    /// Creates a new DNS resolver with custom DNS configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the resolver cannot be initialized.
    pub fn with_dns_config(dns_config: &DnsConfig) -> Result<Self, DnsError> {
        let mut opts = ResolverOpts::default();
        opts.timeout = Duration::from_secs(dns_config.timeout_secs);

        let resolver = TokioResolver::builder(TokioConnectionProvider::default())?
            .with_options(opts)
            .build();

        Ok(Self { resolver })
    }
}

impl ResolveMailServers for DnsResolver {
    async fn resolve_mail_servers(
        &self,
        domain: &str,
        port: u16,
    ) -> Result<Vec<MailServer>, DnsError> {
        debug!("Resolving mail servers for domain: {domain}");

        let lookup = match self.resolver.mx_lookup(domain).await {
            Ok(lookup) => lookup,
            Err(err) if err.is_nx_domain() => {
                return Err(DnsError::DomainNotFound(domain.to_string()));
            }
            Err(err) if err.is_no_records_found() => {
                return Err(DnsError::NoMailServers(domain.to_string()));
            }
            Err(err) => {
                warn!("MX lookup failed for {domain}: {err}");
                return Err(DnsError::LookupFailed(err));
            }
        };

        let records = lookup.iter().map(|mx| {
            let record = MxRecord::new(mx.preference(), mx.exchange().to_utf8());
            debug!(
                "Found MX record: {} (priority: {})",
                record.exchange, record.preference
            );
            record
        });

        let servers = order_mail_servers(records, port);
        if servers.is_empty() {
            return Err(DnsError::NoMailServers(domain.to_string()));
        }

        debug!("Resolved {} MX record(s) for {domain}", servers.len());
        Ok(servers)
    }
}
