//! Outbound SMTP for direct-to-MX delivery.
//!
//! [`client::SmtpSession`] performs one complete mail transaction against a
//! single server over a fresh connection:
//!
//! ```text
//! connect -> 220 -> HELO/250 -> MAIL/250 -> RCPT/250 -> DATA/354 -> body . /250 -> QUIT/221
//! ```
//!
//! Any reply other than the one expected at a stage aborts the session, and
//! the connection is released before the error is returned.

pub mod client;

pub use client::{ClientError, SmtpSession, Stage, Transaction};
