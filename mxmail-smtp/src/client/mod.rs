//! SMTP client implementation for outbound delivery.
//!
//! [`SmtpClient`] moves protocol lines and replies over one connection, while
//! [`SmtpSession`] drives it through the fixed sequence of [`Stage`]s that
//! make up a single-recipient transaction.

pub mod command;
mod error;
mod response;
mod session;
mod smtp_client;
mod stage;

pub use command::MAX_LINE_LENGTH;
pub use error::{ClientError, Result};
pub use response::{Response, ResponseLine};
pub use session::{SmtpSession, Transaction};
pub use smtp_client::SmtpClient;
pub use stage::Stage;
