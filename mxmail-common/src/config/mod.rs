//! Configuration file discovery and loading.
//!
//! Configuration is written in RON. Every structure uses serde defaults, so
//! a missing file and an empty `()` file behave the same.

mod timeouts;

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
pub use timeouts::SmtpTimeouts;

use crate::error::ConfigError;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "MXMAIL_CONFIG";

/// Locations searched when neither `--config` nor `MXMAIL_CONFIG` is given.
pub const DEFAULT_PATHS: [&str; 2] = ["./mxmail.config.ron", "/etc/mxmail/mxmail.config.ron"];

/// Find the configuration file using the following precedence:
/// 1. An explicitly provided path (e.g. `--config`)
/// 2. The `MXMAIL_CONFIG` environment variable
/// 3. `./mxmail.config.ron` (current working directory)
/// 4. `/etc/mxmail/mxmail.config.ron` (system-wide config)
///
/// Returns `Ok(None)` when nothing was named and no default file exists.
///
/// # Errors
///
/// Returns `ConfigError::Missing` if an explicitly named file does not exist.
pub fn find_config_file(explicit: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    let env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    find_config_file_from(explicit, env.as_deref(), &DEFAULT_PATHS.map(Path::new))
}

fn find_config_file_from(
    explicit: Option<&Path>,
    env: Option<&Path>,
    defaults: &[&Path],
) -> Result<Option<PathBuf>, ConfigError> {
    for (origin, path) in [("--config", explicit), (CONFIG_ENV, env)] {
        if let Some(path) = path {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(ConfigError::Missing {
                origin: origin.to_string(),
                path: path.to_path_buf(),
            });
        }
    }

    Ok(defaults
        .iter()
        .find(|path| path.exists())
        .map(|path| path.to_path_buf()))
}

/// Read and deserialize a RON configuration file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not parse as `T`.
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    ron::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
