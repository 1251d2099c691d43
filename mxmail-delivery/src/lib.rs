//! Direct-to-MX delivery of single messages
//!
//! This crate provides functionality to:
//! - Read a message file and extract its envelope
//! - Resolve the recipient domain's MX records into ordered candidate servers
//! - Try each candidate in turn until one accepts the message

mod dns;
mod domain_config;
mod error;
mod message;
mod processor;

// Re-export DNS types
pub use dns::{
    DEFAULT_SMTP_PORT, DnsConfig, DnsError, DnsResolver, MAX_MAIL_SERVERS, MailServer, MxRecord,
    ResolveMailServers, order_mail_servers,
};
// Re-export domain configuration types
pub use domain_config::{DomainConfig, DomainConfigRegistry};
// Re-export error types
pub use error::DeliveryError;
pub use message::{Envelope, FormatError, MessageSource};
pub use mxmail_common::config::SmtpTimeouts;
pub use processor::{DeliveryProcessor, DeliveryReport, SmtpConfig};
