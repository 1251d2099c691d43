use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use mxmail_common::{config, error::ConfigError, internal};
use mxmail_delivery::{
    DeliveryProcessor, DnsConfig, DomainConfigRegistry, ResolveMailServers, SmtpConfig,
};
use serde::Deserialize;

/// Top-level configuration
#[derive(Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Mxmail {
    #[serde(default)]
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub dns: DnsConfig,
    #[serde(default)]
    pub domains: DomainConfigRegistry,
}

/// Per-run delivery tally.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub sent: usize,
    pub failed: usize,
}

impl Summary {
    /// `0` when every file was delivered, `1` otherwise.
    #[must_use]
    pub fn exit_code(self) -> ExitCode {
        if self.failed == 0 {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

impl Mxmail {
    /// Load the configuration file, if one can be found.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file is missing, or a file is
    /// found but cannot be read or parsed.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match config::find_config_file(explicit)? {
            Some(path) => {
                internal!(
                    level = DEBUG,
                    "Loading configuration from {}",
                    path.display()
                );
                config::load(&path)
            }
            None => {
                internal!(level = DEBUG, "No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Send every file in order, resolving through the system DNS.
    ///
    /// # Errors
    ///
    /// Returns an error if the DNS resolver cannot be initialised. Failures
    /// of individual files are counted, not returned.
    pub async fn run(self, files: &[PathBuf]) -> anyhow::Result<Summary> {
        let processor = DeliveryProcessor::with_dns(self.smtp, &self.dns, self.domains)?;
        Ok(send_all(&processor, files).await)
    }
}

/// Deliver each file independently, reporting the outcome of each.
pub async fn send_all<R: ResolveMailServers>(
    processor: &DeliveryProcessor<R>,
    files: &[PathBuf],
) -> Summary {
    let mut summary = Summary::default();

    for file in files {
        match processor.send_message(file).await {
            Ok(report) => {
                tracing::debug!(
                    "{} accepted by {} after {} attempt(s)",
                    file.display(),
                    report.server.address(),
                    report.attempts
                );
                tracing::info!("'{}' successfully sent!", file.display());
                summary.sent += 1;
            }
            Err(err) => {
                tracing::warn!("{}: {err}", file.display());
                tracing::info!("'{}' could not be sent!", file.display());
                summary.failed += 1;
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use mxmail_common::config::SmtpTimeouts;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        let config: Mxmail = ron::from_str("()").unwrap();
        assert_eq!(config, Mxmail::default());
    }

    #[test]
    fn test_full_config() {
        let config: Mxmail = ron::from_str(
            r#"(
                smtp: (
                    port: 2525,
                    helo: Some("relay.example.net"),
                    timeouts: (connect_secs: 5, data_secs: 60),
                ),
                dns: (timeout_secs: 2),
                domains: {
                    "test.example.com": (mx_override: Some("localhost:1025")),
                },
            )"#,
        )
        .unwrap();

        assert_eq!(config.smtp.port, 2525);
        assert_eq!(config.smtp.helo.as_deref(), Some("relay.example.net"));
        assert_eq!(
            config.smtp.timeouts,
            SmtpTimeouts {
                connect_secs: 5,
                data_secs: 60,
                ..SmtpTimeouts::default()
            }
        );
        assert_eq!(config.dns.timeout_secs, 2);
        assert_eq!(
            config
                .domains
                .get("test.example.com")
                .and_then(|d| d.mx_override_address()),
            Some("localhost:1025")
        );
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "(smtp: (port: 587))").unwrap();

        let config = Mxmail::load(Some(file.path())).unwrap();
        assert_eq!(config.smtp.port, 587);
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Mxmail::load(Some(&dir.path().join("absent.ron")));
        assert!(matches!(result, Err(ConfigError::Missing { .. })));
    }

    #[test]
    fn test_load_rejects_bad_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "(smtp: (port: \"twenty-five\"))").unwrap();

        let result = Mxmail::load(Some(file.path()));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_exit_code() {
        assert_eq!(
            Summary { sent: 2, failed: 0 }.exit_code(),
            ExitCode::SUCCESS
        );
        assert_eq!(
            Summary { sent: 1, failed: 1 }.exit_code(),
            ExitCode::FAILURE
        );
    }
}
