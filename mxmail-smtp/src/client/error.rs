//! Error types for the SMTP client.

use std::io;

use thiserror::Error;

use super::stage::Stage;

/// Errors that can occur during an SMTP session.
///
/// Every variant aborts the session it occurred in. The orchestrating caller
/// treats all of them as "this server failed" and moves to the next one.
#[derive(Error, Debug)]
pub enum ClientError {
    /// IO error occurred during network operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Connection was closed unexpectedly.
    #[error("Connection closed unexpectedly")]
    ConnectionClosed,

    /// A stage did not complete within its configured timeout.
    #[error("{stage} timed out after {secs}s")]
    Timeout { stage: Stage, secs: u64 },

    /// Failed to parse an SMTP response from the server.
    #[error("Failed to parse SMTP response: {0}")]
    ParseError(String),

    /// The server replied with a code other than the one the stage requires.
    #[error("Unexpected reply to {stage}: expected {expected}, got {code} {message}")]
    UnexpectedResponse {
        stage: Stage,
        expected: u16,
        code: u16,
        message: String,
    },

    /// An outbound line does not fit within the line length limit.
    #[error("Line of {length} bytes exceeds the {limit} byte limit")]
    LineTooLong { length: usize, limit: usize },

    /// UTF-8 decoding error.
    #[error("UTF-8 error: {0}")]
    Utf8Error(#[from] std::str::Utf8Error),
}

impl ClientError {
    /// Returns `true` for connection, send, receive and timeout failures.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::ConnectionClosed | Self::Timeout { .. }
        )
    }

    /// Returns `true` for unexpected, missing or malformed replies.
    #[must_use]
    pub const fn is_protocol(&self) -> bool {
        matches!(
            self,
            Self::ParseError(_) | Self::UnexpectedResponse { .. } | Self::Utf8Error(_)
        )
    }
}

/// Specialized `Result` type for SMTP client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
