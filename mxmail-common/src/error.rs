//! Error types for the mxmail-common crate.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configuration file is not valid RON for the expected structure.
    #[error("Failed to parse config from {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    /// A configuration path was named explicitly but does not exist.
    #[error("{origin} points to non-existent file: {}", path.display())]
    Missing { origin: String, path: PathBuf },
}
