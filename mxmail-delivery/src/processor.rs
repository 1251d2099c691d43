//! Delivery orchestration
//!
//! Takes one message from file to accepting server: parse the envelope,
//! obtain the candidate servers, then run one SMTP session per candidate in
//! preference order until one accepts.

use std::path::Path;

use mxmail_common::{config::SmtpTimeouts, internal, tracing};
use mxmail_smtp::{SmtpSession, Transaction};
use serde::Deserialize;

use crate::{
    dns::{DEFAULT_SMTP_PORT, DnsConfig, DnsError, DnsResolver, MailServer, ResolveMailServers},
    domain_config::DomainConfigRegistry,
    error::DeliveryError,
    message::MessageSource,
};

const fn default_port() -> u16 {
    DEFAULT_SMTP_PORT
}

/// Outbound SMTP settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SmtpConfig {
    /// Port used for servers found through DNS (default: 25)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Fixed `HELO` argument
    ///
    /// Default: the domain of the sender address
    #[serde(default)]
    pub helo: Option<String>,

    /// Per-stage timeouts
    #[serde(default)]
    pub timeouts: SmtpTimeouts,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            helo: None,
            timeouts: SmtpTimeouts::default(),
        }
    }
}

/// Outcome of a successful delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    /// The server that accepted the message
    pub server: MailServer,
    /// Number of servers tried, the accepting one included
    pub attempts: usize,
}

/// Delivers messages directly to the recipient domain's mail servers.
///
/// Deliveries are sequential: one message, and one server attempt, at a time.
#[derive(Debug)]
pub struct DeliveryProcessor<R = DnsResolver> {
    smtp: SmtpConfig,
    domains: DomainConfigRegistry,
    resolver: R,
}

impl DeliveryProcessor<DnsResolver> {
    /// Creates a processor resolving through the system DNS configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the resolver cannot be initialized.
    pub fn with_dns(
        smtp: SmtpConfig,
        dns: &DnsConfig,
        domains: DomainConfigRegistry,
    ) -> Result<Self, DnsError> {
        Ok(Self::new(smtp, domains, DnsResolver::with_dns_config(dns)?))
    }
}

impl<R: ResolveMailServers> DeliveryProcessor<R> {
    #[must_use]
    pub const fn new(smtp: SmtpConfig, domains: DomainConfigRegistry, resolver: R) -> Self {
        Self {
            smtp,
            domains,
            resolver,
        }
    }

    #[must_use]
    pub const fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Read the message file at `path` and deliver it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, or for any reason
    /// [`DeliveryProcessor::deliver`] fails.
    pub async fn send_message(&self, path: &Path) -> Result<DeliveryReport, DeliveryError> {
        let source = MessageSource::open(path)
            .await
            .map_err(|source| DeliveryError::Source {
                path: path.to_path_buf(),
                source,
            })?;

        internal!(
            level = DEBUG,
            "Loaded {} ({} bytes)",
            path.display(),
            source.len()
        );

        self.deliver(&source).await
    }

    /// Deliver an already loaded message.
    ///
    /// Servers are tried in order, each over a fresh connection and with the
    /// message replayed from its first line. The first acceptance ends the
    /// delivery.
    ///
    /// # Errors
    ///
    /// Returns an error if the envelope is malformed, no servers can be found,
    /// the content cannot be transmitted, or every server fails.
    pub async fn deliver(&self, source: &MessageSource) -> Result<DeliveryReport, DeliveryError> {
        let envelope = source.envelope()?;
        let domain = envelope.recipient_domain();

        let transaction = Transaction {
            helo_domain: self.smtp.helo.as_deref().unwrap_or(envelope.sender_domain()),
            sender: envelope.sender(),
            recipient: envelope.recipient(),
        };
        SmtpSession::validate(&transaction, source.lines()).map_err(DeliveryError::Encoding)?;

        let servers = self.mail_servers(domain).await?;

        for (attempt, server) in servers.iter().enumerate() {
            let address = server.address();
            internal!(
                level = INFO,
                "Trying server {address} (priority {})",
                server.priority
            );

            let session = SmtpSession::new(&address, &self.smtp.timeouts);
            match session.deliver(&transaction, source.lines()).await {
                Ok(()) => {
                    internal!(level = INFO, "Message accepted by {address}");
                    return Ok(DeliveryReport {
                        server: server.clone(),
                        attempts: attempt + 1,
                    });
                }
                Err(err) if !err.is_transport() && !err.is_protocol() => {
                    return Err(DeliveryError::Encoding(err));
                }
                Err(err) => {
                    tracing::warn!(server = %address, "Delivery attempt failed: {err}");
                }
            }
        }

        Err(DeliveryError::AllServersFailed {
            domain: domain.to_string(),
            attempts: servers.len(),
        })
    }

    /// Candidate servers for `domain`: the configured override if there is
    /// one, otherwise the resolver's answer.
    async fn mail_servers(&self, domain: &str) -> Result<Vec<MailServer>, DnsError> {
        if let Some(server) = self.domains.mx_override(domain, self.smtp.port) {
            internal!(
                level = DEBUG,
                "Using MX override {} for {domain}",
                server.address()
            );
            return Ok(vec![server]);
        }

        let servers = self.resolver.resolve_mail_servers(domain, self.smtp.port).await?;
        if servers.is_empty() {
            return Err(DnsError::NoMailServers(domain.to_string()));
        }

        Ok(servers)
    }
}
