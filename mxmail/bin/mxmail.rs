use std::process::ExitCode;

use clap::Parser;
use mxmail::{Cli, Mxmail};
use mxmail_common::logging;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    logging::init();

    let mxmail = Mxmail::load(cli.config.as_deref())?;
    let summary = mxmail.run(&cli.files).await?;

    Ok(summary.exit_code())
}
