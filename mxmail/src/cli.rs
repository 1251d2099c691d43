use std::path::PathBuf;

use clap::Parser;

/// Deliver each message file directly to its recipient's mail servers
#[derive(Parser, Debug, PartialEq, Eq)]
#[command(name = "mxmail")]
#[command(about = "Deliver mail straight to the recipient's MX servers", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file (RON)
    ///
    /// Defaults to `MXMAIL_CONFIG`, then ./mxmail.config.ron, then
    /// /etc/mxmail/mxmail.config.ron. Built-in defaults apply if none exist.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Message files to send, each naming its sender and recipient as the
    /// first two <address> tokens
    #[arg(required = true, num_args = 1..)]
    pub files: Vec<PathBuf>,
}
