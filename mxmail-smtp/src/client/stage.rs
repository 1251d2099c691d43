use std::{fmt, time::Duration};

use mxmail_common::config::SmtpTimeouts;

/// A step of the outbound SMTP transaction, in protocol order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Opening the TCP connection
    Connect,
    /// Waiting for the server banner
    Greeting,
    Helo,
    MailFrom,
    RcptTo,
    /// `DATA` and its intermediate reply
    DataStart,
    /// Message body, the terminating `.` line and the final reply
    DataEnd,
    Quit,
}

impl Stage {
    /// All stages in the order a session walks through them.
    pub const ALL: [Self; 8] = [
        Self::Connect,
        Self::Greeting,
        Self::Helo,
        Self::MailFrom,
        Self::RcptTo,
        Self::DataStart,
        Self::DataEnd,
        Self::Quit,
    ];

    /// The only reply code that lets the session continue past this stage.
    #[must_use]
    pub const fn expected_code(self) -> Option<u16> {
        match self {
            Self::Connect => None,
            Self::Greeting => Some(220),
            Self::Helo | Self::MailFrom | Self::RcptTo | Self::DataEnd => Some(250),
            Self::DataStart => Some(354),
            Self::Quit => Some(221),
        }
    }

    #[must_use]
    pub const fn timeout(self, timeouts: &SmtpTimeouts) -> Duration {
        match self {
            Self::Connect => timeouts.connect(),
            Self::Greeting => timeouts.greeting(),
            Self::Helo => timeouts.helo(),
            Self::MailFrom => timeouts.mail_from(),
            Self::RcptTo => timeouts.rcpt_to(),
            Self::DataStart | Self::DataEnd => timeouts.data(),
            Self::Quit => timeouts.quit(),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connect => "connect",
            Self::Greeting => "greeting",
            Self::Helo => "HELO",
            Self::MailFrom => "MAIL FROM",
            Self::RcptTo => "RCPT TO",
            Self::DataStart => "DATA",
            Self::DataEnd => "end of data",
            Self::Quit => "QUIT",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_codes_in_order() {
        let codes: Vec<_> = Stage::ALL.iter().filter_map(|s| s.expected_code()).collect();
        assert_eq!(codes, vec![220, 250, 250, 250, 354, 250, 221]);
    }

    #[test]
    fn test_data_stages_share_timeout() {
        let timeouts = SmtpTimeouts {
            data_secs: 300,
            ..SmtpTimeouts::default()
        };
        assert_eq!(Stage::DataStart.timeout(&timeouts), Duration::from_secs(300));
        assert_eq!(Stage::DataEnd.timeout(&timeouts), Duration::from_secs(300));
        assert_eq!(Stage::Quit.timeout(&timeouts), Duration::from_secs(10));
    }
}
