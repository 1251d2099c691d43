//! Line-level SMTP client over a single connection.

use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    net::TcpStream,
};

use mxmail_common::{incoming, outgoing, tracing};

use super::error::{ClientError, Result};
use super::response::Response;

/// Initial size of the read buffer for SMTP responses.
const BUFFER_SIZE: usize = 4096;

/// Maximum size of the read buffer to prevent unbounded growth (1MB).
const MAX_BUFFER_SIZE: usize = 1024 * 1024;

/// An SMTP client for sending protocol lines and receiving replies.
///
/// Owns its connection. Dropping the client closes it; [`SmtpClient::close`]
/// additionally performs an orderly shutdown of the write half first.
pub struct SmtpClient<S = TcpStream> {
    stream: S,
    buffer: Vec<u8>,
    buffer_pos: usize,
}

impl SmtpClient<TcpStream> {
    /// Creates a new SMTP client by connecting to the specified `host:port`.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails.
    pub async fn connect(addr: &str) -> Result<Self> {
        let stream = TcpStream::connect(addr).await.map_err(ClientError::Io)?;
        Ok(Self::new(stream))
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> SmtpClient<S> {
    /// Wraps an already established connection.
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            buffer: vec![0u8; BUFFER_SIZE],
            buffer_pos: 0,
        }
    }

    /// Sends a single command line, which must already carry its CRLF.
    ///
    /// # Errors
    ///
    /// Returns an error if sending fails.
    pub async fn send_command(&mut self, line: &str) -> Result<()> {
        outgoing!("C: {}", line.trim_end());
        self.send(line.as_bytes()).await
    }

    /// Sends raw bytes, such as an encoded message body.
    ///
    /// # Errors
    ///
    /// Returns an error if sending fails.
    pub async fn send(&mut self, data: &[u8]) -> Result<()> {
        self.stream.write_all(data).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Reads a complete SMTP response from the server.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails, the peer closes the connection, or
    /// the response is malformed.
    pub async fn read_response(&mut self) -> Result<Response> {
        loop {
            if let Some((response, consumed)) =
                Response::parse_response(&self.buffer[..self.buffer_pos])?
            {
                self.buffer.copy_within(consumed..self.buffer_pos, 0);
                self.buffer_pos -= consumed;

                incoming!("S: {} {}", response.code, response.message());
                return Ok(response);
            }

            if self.buffer_pos >= self.buffer.len() {
                // Buffer is full but no complete response - expand buffer
                let new_size = self.buffer.len() * 2;
                if new_size > MAX_BUFFER_SIZE {
                    return Err(ClientError::ParseError(format!(
                        "Response too large (exceeds {MAX_BUFFER_SIZE} bytes)"
                    )));
                }
                self.buffer.resize(new_size, 0);
            }

            let n = self.stream.read(&mut self.buffer[self.buffer_pos..]).await?;
            if n == 0 {
                return Err(ClientError::ConnectionClosed);
            }
            self.buffer_pos += n;
        }
    }

    /// Shuts down and releases the connection.
    ///
    /// Shutdown errors are only logged: the connection is gone either way.
    pub async fn close(mut self) {
        if let Err(err) = self.stream.shutdown().await {
            tracing::trace!("Error shutting down connection: {err}");
        }
    }
}
