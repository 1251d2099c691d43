//! Construction of outbound protocol lines.
//!
//! One function per command, each producing a complete CRLF-terminated line.
//! Every line must fit in [`MAX_LINE_LENGTH`] bytes, terminator included;
//! longer lines are rejected rather than truncated.

use super::error::{ClientError, Result};

/// Largest outbound line, CRLF included.
pub const MAX_LINE_LENGTH: usize = 4096;

pub const DATA: &str = "DATA\r\n";
pub const QUIT: &str = "QUIT\r\n";
pub const END_OF_DATA: &str = ".\r\n";

const fn check_length(length: usize) -> Result<()> {
    if length > MAX_LINE_LENGTH {
        Err(ClientError::LineTooLong {
            length,
            limit: MAX_LINE_LENGTH,
        })
    } else {
        Ok(())
    }
}

fn bounded(line: String) -> Result<String> {
    check_length(line.len())?;
    Ok(line)
}

/// `HELO <domain>`
///
/// # Errors
///
/// Returns `ClientError::LineTooLong` if the line exceeds [`MAX_LINE_LENGTH`].
pub fn helo(domain: &str) -> Result<String> {
    bounded(format!("HELO {domain}\r\n"))
}

/// `MAIL FROM:<sender>`
///
/// # Errors
///
/// Returns `ClientError::LineTooLong` if the line exceeds [`MAX_LINE_LENGTH`].
pub fn mail_from(sender: &str) -> Result<String> {
    bounded(format!("MAIL FROM:<{sender}>\r\n"))
}

/// `RCPT TO:<recipient>`
///
/// # Errors
///
/// Returns `ClientError::LineTooLong` if the line exceeds [`MAX_LINE_LENGTH`].
pub fn rcpt_to(recipient: &str) -> Result<String> {
    bounded(format!("RCPT TO:<{recipient}>\r\n"))
}

/// One line of message content, as sent during the DATA phase.
///
/// Any trailing line terminator is replaced by CRLF, and a leading `.` is
/// doubled (RFC 5321 section 4.5.2) so content can never end the DATA phase.
///
/// # Errors
///
/// Returns `ClientError::LineTooLong` if the encoded line exceeds [`MAX_LINE_LENGTH`].
pub fn data_line(line: &[u8]) -> Result<Vec<u8>> {
    let mut end = line.len();
    while end > 0 && matches!(line[end - 1], b'\r' | b'\n') {
        end -= 1;
    }
    let line = &line[..end];

    let stuffed = line.first() == Some(&b'.');
    check_length(line.len() + usize::from(stuffed) + 2)?;

    let mut encoded = Vec::with_capacity(line.len() + 3);
    if stuffed {
        encoded.push(b'.');
    }
    encoded.extend_from_slice(line);
    encoded.extend_from_slice(b"\r\n");
    Ok(encoded)
}
