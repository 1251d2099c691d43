//! Timeout configuration for outbound SMTP sessions.
//!
//! Each stage of a delivery attempt is bounded separately so that a stalled
//! server costs at most one stage timeout before the next candidate is tried.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Per-stage SMTP client timeouts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtpTimeouts {
    /// Timeout for establishing the TCP connection
    ///
    /// Default: 30 seconds
    #[serde(default = "defaults::connect_secs")]
    pub connect_secs: u64,

    /// Timeout for the server's 220 banner
    ///
    /// Default: 30 seconds
    #[serde(default = "defaults::greeting_secs")]
    pub greeting_secs: u64,

    /// Timeout for HELO
    ///
    /// Default: 30 seconds
    #[serde(default = "defaults::helo_secs")]
    pub helo_secs: u64,

    /// Timeout for MAIL FROM
    ///
    /// Default: 30 seconds
    #[serde(default = "defaults::mail_from_secs")]
    pub mail_from_secs: u64,

    /// Timeout for RCPT TO
    ///
    /// Default: 30 seconds
    #[serde(default = "defaults::rcpt_to_secs")]
    pub rcpt_to_secs: u64,

    /// Timeout for the DATA command and for transmitting the message body
    ///
    /// Applied separately to the 354 exchange and to the body transfer.
    /// Default: 120 seconds
    #[serde(default = "defaults::data_secs")]
    pub data_secs: u64,

    /// Timeout for QUIT
    ///
    /// Default: 10 seconds
    #[serde(default = "defaults::quit_secs")]
    pub quit_secs: u64,
}

impl SmtpTimeouts {
    #[must_use]
    pub const fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }

    #[must_use]
    pub const fn greeting(&self) -> Duration {
        Duration::from_secs(self.greeting_secs)
    }

    #[must_use]
    pub const fn helo(&self) -> Duration {
        Duration::from_secs(self.helo_secs)
    }

    #[must_use]
    pub const fn mail_from(&self) -> Duration {
        Duration::from_secs(self.mail_from_secs)
    }

    #[must_use]
    pub const fn rcpt_to(&self) -> Duration {
        Duration::from_secs(self.rcpt_to_secs)
    }

    #[must_use]
    pub const fn data(&self) -> Duration {
        Duration::from_secs(self.data_secs)
    }

    #[must_use]
    pub const fn quit(&self) -> Duration {
        Duration::from_secs(self.quit_secs)
    }
}

impl Default for SmtpTimeouts {
    fn default() -> Self {
        Self {
            connect_secs: defaults::connect_secs(),
            greeting_secs: defaults::greeting_secs(),
            helo_secs: defaults::helo_secs(),
            mail_from_secs: defaults::mail_from_secs(),
            rcpt_to_secs: defaults::rcpt_to_secs(),
            data_secs: defaults::data_secs(),
            quit_secs: defaults::quit_secs(),
        }
    }
}

mod defaults {
    pub const fn connect_secs() -> u64 {
        30
    }

    pub const fn greeting_secs() -> u64 {
        30
    }

    pub const fn helo_secs() -> u64 {
        30
    }

    pub const fn mail_from_secs() -> u64 {
        30
    }

    pub const fn rcpt_to_secs() -> u64 {
        30
    }

    pub const fn data_secs() -> u64 {
        120
    }

    pub const fn quit_secs() -> u64 {
        10
    }
}
