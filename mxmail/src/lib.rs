//! Direct-to-MX mail delivery from the command line
//!
//! Each message file names its sender and recipient as the first two
//! `<address>` tokens. The file is sent, unchanged apart from line endings and
//! dot-stuffing, to the first of the recipient domain's mail servers that
//! accepts it.

pub mod cli;
pub mod controller;

pub use cli::Cli;
pub use controller::{Mxmail, Summary, send_all};
