//! One complete outbound SMTP transaction against a single server.

use std::future::Future;

use mxmail_common::{config::SmtpTimeouts, tracing};
use tokio::io::{AsyncRead, AsyncWrite};

use super::{
    command,
    error::{ClientError, Result},
    response::Response,
    smtp_client::SmtpClient,
    stage::Stage,
};

/// Envelope and greeting parameters for one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transaction<'a> {
    /// Argument to `HELO`
    pub helo_domain: &'a str,
    /// Reverse path for `MAIL FROM`
    pub sender: &'a str,
    /// Forward path for `RCPT TO`
    pub recipient: &'a str,
}

/// The protocol lines of a transaction, encoded before any connection is
/// opened so that an oversized line never costs a network round trip.
struct Script {
    helo: String,
    mail_from: String,
    rcpt_to: String,
    payload: Vec<u8>,
}

impl Script {
    fn encode<L>(transaction: &Transaction<'_>, body: impl IntoIterator<Item = L>) -> Result<Self>
    where
        L: AsRef<[u8]>,
    {
        let mut payload = Vec::new();
        for line in body {
            payload.extend_from_slice(&command::data_line(line.as_ref())?);
        }
        payload.extend_from_slice(command::END_OF_DATA.as_bytes());

        Ok(Self {
            helo: command::helo(transaction.helo_domain)?,
            mail_from: command::mail_from(transaction.sender)?,
            rcpt_to: command::rcpt_to(transaction.recipient)?,
            payload,
        })
    }
}

/// Delivers one message to one server over a fresh connection.
///
/// The session is all-or-nothing: it either walks every [`Stage`] receiving
/// the expected reply at each, or fails at the first deviation. The
/// connection is closed on every exit path before `deliver` returns.
#[derive(Debug, Clone, Copy)]
pub struct SmtpSession<'a> {
    /// Server address as `host:port`
    server: &'a str,
    timeouts: &'a SmtpTimeouts,
}

impl<'a> SmtpSession<'a> {
    #[must_use]
    pub const fn new(server: &'a str, timeouts: &'a SmtpTimeouts) -> Self {
        Self { server, timeouts }
    }

    /// Check that every line of the transaction can be encoded.
    ///
    /// Performs no I/O, so a message that could never be sent can be
    /// rejected before any server is looked up or contacted.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::LineTooLong`] for the first oversized line.
    pub fn validate<L>(
        transaction: &Transaction<'_>,
        body: impl IntoIterator<Item = L>,
    ) -> Result<()>
    where
        L: AsRef<[u8]>,
    {
        Script::encode(transaction, body).map(drop)
    }

    /// Connect to the server and run the full transaction.
    ///
    /// `body` is transmitted line by line during the DATA phase.
    ///
    /// # Errors
    ///
    /// Returns an error if any line is too long, the connection fails, a
    /// stage times out, or the server replies with anything other than the
    /// code the current stage requires.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(server = %self.server),
        err(level = "debug", Display)
    )]
    pub async fn deliver<L>(
        &self,
        transaction: &Transaction<'_>,
        body: impl IntoIterator<Item = L>,
    ) -> Result<()>
    where
        L: AsRef<[u8]>,
    {
        let script = Script::encode(transaction, body)?;

        let mut client = within(
            Stage::Connect,
            self.timeouts,
            SmtpClient::connect(self.server),
        )
        .await?;

        let outcome = converse(&mut client, &script, self.timeouts).await;
        client.close().await;
        outcome
    }

    /// Run the transaction over an already established connection.
    ///
    /// The connection is closed before returning, whatever the outcome.
    ///
    /// # Errors
    ///
    /// As for [`SmtpSession::deliver`], minus connection establishment.
    pub async fn deliver_over<S, L>(
        mut client: SmtpClient<S>,
        transaction: &Transaction<'_>,
        body: impl IntoIterator<Item = L>,
        timeouts: &SmtpTimeouts,
    ) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
        L: AsRef<[u8]>,
    {
        let outcome = match Script::encode(transaction, body) {
            Ok(script) => converse(&mut client, &script, timeouts).await,
            Err(err) => Err(err),
        };
        client.close().await;
        outcome
    }
}

async fn converse<S>(
    client: &mut SmtpClient<S>,
    script: &Script,
    timeouts: &SmtpTimeouts,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    within(Stage::Greeting, timeouts, async {
        expect(Stage::Greeting, &client.read_response().await?)
    })
    .await?;

    exchange(client, Stage::Helo, &script.helo, timeouts).await?;
    exchange(client, Stage::MailFrom, &script.mail_from, timeouts).await?;
    exchange(client, Stage::RcptTo, &script.rcpt_to, timeouts).await?;
    exchange(client, Stage::DataStart, command::DATA, timeouts).await?;

    within(Stage::DataEnd, timeouts, async {
        tracing::trace!(bytes = script.payload.len(), "Sending message content");
        client.send(&script.payload).await?;
        expect(Stage::DataEnd, &client.read_response().await?)
    })
    .await?;

    exchange(client, Stage::Quit, command::QUIT, timeouts).await
}

/// Send one command line and require the stage's reply code.
async fn exchange<S>(
    client: &mut SmtpClient<S>,
    stage: Stage,
    line: &str,
    timeouts: &SmtpTimeouts,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    within(stage, timeouts, async {
        client.send_command(line).await?;
        expect(stage, &client.read_response().await?)
    })
    .await
}

fn expect(stage: Stage, response: &Response) -> Result<()> {
    match stage.expected_code() {
        Some(expected) if expected != response.code => Err(ClientError::UnexpectedResponse {
            stage,
            expected,
            code: response.code,
            message: response.message(),
        }),
        _ => Ok(()),
    }
}

async fn within<T>(
    stage: Stage,
    timeouts: &SmtpTimeouts,
    operation: impl Future<Output = Result<T>>,
) -> Result<T> {
    let limit = stage.timeout(timeouts);
    tokio::time::timeout(limit, operation)
        .await
        .map_err(|_| ClientError::Timeout {
            stage,
            secs: limit.as_secs(),
        })?
}
