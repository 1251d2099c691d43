//! Typed error handling for delivery operations.
//!
//! Each variant of [`DeliveryError`] ends the delivery of one message. Failures
//! of individual servers are not errors at this level: they are logged and the
//! next candidate is tried.

use std::{io, path::PathBuf};

use mxmail_smtp::ClientError;
use thiserror::Error;

use crate::{DnsError, FormatError};

/// Top-level delivery error type.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The message file could not be read.
    #[error("Failed to read message '{}': {source}", path.display())]
    Source {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The message does not carry a usable envelope.
    #[error("Malformed message: {0}")]
    Format(#[from] FormatError),

    /// No candidate servers could be found for the recipient domain.
    #[error("Resolution failed: {0}")]
    Resolution(#[from] DnsError),

    /// The message cannot be expressed on the wire, whichever server is used.
    #[error("Message cannot be transmitted: {0}")]
    Encoding(#[source] ClientError),

    /// Every candidate server was tried and none accepted the message.
    #[error("All {attempts} mail server(s) for {domain} failed")]
    AllServersFailed { domain: String, attempts: usize },
}
