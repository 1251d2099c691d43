//! Message sources and the envelope carried inside them.
//!
//! A message file is plain text. The first two bracketed tokens in document
//! order name the sender and the recipient:
//!
//! ```text
//! From: Alice <alice@example.org>
//! To: Bob <bob@example.com>
//! Subject: hello
//! ```
//!
//! The whole file, address lines included, is the DATA payload.

use std::{io, path::Path};

use thiserror::Error;

/// Why a message source does not yield a usable envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("Expected a sender and a recipient address, found {found} bracketed address(es)")]
    MissingAddresses { found: usize },

    #[error("Invalid sender address: <{0}>")]
    InvalidSender(String),

    #[error("Invalid recipient address: <{0}>")]
    InvalidRecipient(String),
}

/// Sender and recipient of one delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    sender: String,
    recipient: String,
}

impl Envelope {
    /// Build an envelope from two `local@domain` addresses.
    ///
    /// # Errors
    ///
    /// Returns `FormatError::InvalidSender` or `FormatError::InvalidRecipient`
    /// if either address lacks a local part or a domain.
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>) -> Result<Self, FormatError> {
        let sender = sender.into();
        let recipient = recipient.into();

        if domain_of(&sender).is_none() {
            return Err(FormatError::InvalidSender(sender));
        }
        if domain_of(&recipient).is_none() {
            return Err(FormatError::InvalidRecipient(recipient));
        }

        Ok(Self { sender, recipient })
    }

    #[must_use]
    pub fn sender(&self) -> &str {
        &self.sender
    }

    #[must_use]
    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    /// The part of the sender after the final `@`, used as the HELO argument.
    #[must_use]
    pub fn sender_domain(&self) -> &str {
        domain_of(&self.sender).unwrap_or_default()
    }

    /// The part of the recipient after the final `@`, used for MX resolution.
    #[must_use]
    pub fn recipient_domain(&self) -> &str {
        domain_of(&self.recipient).unwrap_or_default()
    }
}

/// The domain of a `local@domain` address, if it has that shape.
fn domain_of(address: &str) -> Option<&str> {
    if address.chars().any(char::is_whitespace) {
        return None;
    }

    match address.rsplit_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Some(domain),
        _ => None,
    }
}

/// Bracketed tokens in document order.
///
/// A `<` starts a token only if a `>` follows it on the same line; the token
/// is everything strictly between the two. Scanning resumes after the `>`.
fn bracketed_tokens(line: &[u8]) -> impl Iterator<Item = &[u8]> {
    let mut rest = line;
    std::iter::from_fn(move || {
        let open = rest.iter().position(|&b| b == b'<')?;
        let after = &rest[open + 1..];
        let close = after.iter().position(|&b| b == b'>')?;
        rest = &after[close + 1..];
        Some(&after[..close])
    })
}

/// The complete content of one message, loaded once and replayable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSource {
    content: Vec<u8>,
}

impl MessageSource {
    /// Read a message file into memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub async fn open(path: &Path) -> io::Result<Self> {
        tokio::fs::read(path).await.map(Self::from_bytes)
    }

    #[must_use]
    pub fn from_bytes(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Size of the content in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.content.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// The content as lines without their terminators.
    ///
    /// Every call starts again from the first line. A terminator at the very
    /// end of the content does not produce a trailing empty line.
    pub fn lines(&self) -> impl Iterator<Item = &[u8]> {
        let content = self
            .content
            .strip_suffix(b"\n")
            .unwrap_or(&self.content);

        (!self.content.is_empty())
            .then(|| {
                content
                    .split(|&b| b == b'\n')
                    .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
            })
            .into_iter()
            .flatten()
    }

    /// Extract the envelope: the first bracketed token is the sender and the
    /// next one the recipient.
    ///
    /// # Errors
    ///
    /// Returns `FormatError` if fewer than two bracketed tokens exist or either
    /// address is not of the form `local@domain`.
    pub fn envelope(&self) -> Result<Envelope, FormatError> {
        let mut tokens = self.lines().flat_map(bracketed_tokens);

        let sender = tokens.next();
        let recipient = tokens.next();

        match (sender, recipient) {
            (Some(sender), Some(recipient)) => Envelope::new(
                String::from_utf8_lossy(sender),
                String::from_utf8_lossy(recipient),
            ),
            (found, _) => Err(FormatError::MissingAddresses {
                found: usize::from(found.is_some()),
            }),
        }
    }
}
