use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use crate::http::parser::parse;
use crate::http::request::{MAX_REQUEST_SIZE, RawRequest};
use crate::http::response::ResponseOutcome;
use crate::http::writer::{Delivery, ResponseWriter};

/// Per-connection settings, copied into every connection task.
#[derive(Debug, Clone)]
pub struct ConnectionOptions {
    /// Directory resource names are resolved against.
    pub root: PathBuf,
    /// Limit on the single request read. `None` waits forever.
    pub read_timeout: Option<Duration>,
    /// Limit on each write of the response. `None` waits forever.
    pub write_timeout: Option<Duration>,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            read_timeout: None,
            write_timeout: None,
        }
    }
}

/// One request, one response, then the connection is closed.
pub struct Connection<S> {
    stream: S,
    options: ConnectionOptions,
}

/// Where a connection is in its single request/response cycle.
pub enum ConnectionState {
    ReadingRequest,
    Classified(ResponseOutcome),
    Responded(Delivery),
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, options: ConnectionOptions) -> Self {
        Self { stream, options }
    }

    /// Drives the connection through every state exactly once and closes it.
    pub async fn run(mut self) -> anyhow::Result<Delivery> {
        let mut state = ConnectionState::ReadingRequest;

        loop {
            state = match state {
                ConnectionState::ReadingRequest => {
                    let raw = self.read_request().await;
                    let request = parse(&raw);
                    let outcome = ResponseOutcome::resolve(&request, &self.options.root).await;
                    ConnectionState::Classified(outcome)
                }

                ConnectionState::Classified(outcome) => {
                    let delivery = ResponseWriter::new(outcome)
                        .with_write_timeout(self.options.write_timeout)
                        .write_to_stream(&mut self.stream)
                        .await;
                    ConnectionState::Responded(delivery)
                }

                ConnectionState::Responded(delivery) => {
                    self.close().await?;
                    return Ok(delivery);
                }
            };
        }
    }

    /// Performs the one read a connection gets. Failures and timeouts read as empty.
    pub async fn read_request(&mut self) -> RawRequest {
        let mut temp = [0u8; MAX_REQUEST_SIZE];

        let read = match self.options.read_timeout {
            Some(limit) => match timeout(limit, self.stream.read(&mut temp)).await {
                Ok(read) => read,
                Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "read timed out")),
            },
            None => self.stream.read(&mut temp).await,
        };

        match read {
            Ok(0) => {
                tracing::debug!("Client closed connection before sending a request");
                RawRequest::empty()
            }
            Ok(n) => RawRequest::new(Bytes::copy_from_slice(&temp[..n])),
            Err(e) => {
                tracing::debug!(error = %e, "Failed reading request");
                RawRequest::empty()
            }
        }
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        match self.stream.shutdown().await {
            // Peer already went away; nothing left to close.
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            other => other.context("failed to shut down connection"),
        }
    }
}
