use std::io;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use crate::http::error::ServeError;
use crate::http::response::{FileResource, NOT_FOUND_BODY, ResponseHead, ResponseOutcome, StatusCode};

const HTTP_VERSION: &str = "HTTP/1.0";

/// Files are streamed to the client this many bytes at a time.
pub const CHUNK_SIZE: usize = 1024;

pub fn serialize_head(head: &ResponseHead) -> Vec<u8> {
    let mut buf = Vec::new();

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        head.status.as_u16(),
        head.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    // Headers
    for (k, v) in &head.headers {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    buf
}

/// What actually went out on the wire.
#[derive(Debug)]
pub struct Delivery {
    /// Status of the response that was sent (a failed open turns 200 into 404).
    pub status: StatusCode,
    /// Body bytes written after the head.
    pub body_bytes: u64,
    /// Set when a read or write failed and the response was cut short.
    pub interrupted: Option<ServeError>,
}

impl Delivery {
    pub fn is_complete(&self) -> bool {
        self.interrupted.is_none()
    }
}

/// Writes exactly one response for an outcome.
///
/// Writing is best-effort: failures end the response early and are logged
/// and reported in the [`Delivery`], never returned as errors.
pub struct ResponseWriter {
    outcome: ResponseOutcome,
    write_timeout: Option<Duration>,
}

impl ResponseWriter {
    pub fn new(outcome: ResponseOutcome) -> Self {
        Self {
            outcome,
            write_timeout: None,
        }
    }

    /// Bounds each individual write. `None` waits forever.
    pub fn with_write_timeout(mut self, write_timeout: Option<Duration>) -> Self {
        self.write_timeout = write_timeout;
        self
    }

    pub async fn write_to_stream<W>(self, stream: &mut W) -> Delivery
    where
        W: AsyncWrite + Unpin,
    {
        let write_timeout = self.write_timeout;
        let delivery = match self.outcome {
            ResponseOutcome::BadRequest => {
                write_fixed(stream, ResponseOutcome::BadRequest, &[], write_timeout).await
            }
            ResponseOutcome::NotFound => {
                write_fixed(stream, ResponseOutcome::NotFound, NOT_FOUND_BODY, write_timeout).await
            }
            ResponseOutcome::Ok(file) => write_file(stream, file, write_timeout).await,
        };

        if let Some(e) = &delivery.interrupted {
            tracing::debug!(
                error = %e,
                status = delivery.status.as_u16(),
                bytes = delivery.body_bytes,
                "Response cut short"
            );
        }

        delivery
    }
}

/// Writes a head with no variable part and a static body.
async fn write_fixed<W>(
    stream: &mut W,
    outcome: ResponseOutcome,
    body: &[u8],
    write_timeout: Option<Duration>,
) -> Delivery
where
    W: AsyncWrite + Unpin,
{
    let status = outcome.status();
    let mut buf = serialize_head(&outcome.head());
    buf.extend_from_slice(body);

    let interrupted = send(stream, &buf, write_timeout)
        .await
        .err()
        .map(|source| ServeError::TransferInterrupted {
            resource: format!("{} {} response", status.as_u16(), status.reason_phrase()),
            source,
        });

    Delivery {
        status,
        body_bytes: if interrupted.is_none() { body.len() as u64 } else { 0 },
        interrupted,
    }
}

async fn write_file<W>(
    stream: &mut W,
    file: FileResource,
    write_timeout: Option<Duration>,
) -> Delivery
where
    W: AsyncWrite + Unpin,
{
    // Opened before anything is written so a failure can still become a clean 404.
    let handle = match tokio::fs::File::open(&file.path).await {
        Ok(handle) => handle,
        Err(source) => {
            let e = ServeError::ResourceUnavailable {
                resource: file.name.clone(),
                source,
            };
            tracing::debug!(error = %e, "Failed to open file, sending 404 Not Found");
            return write_fixed(stream, ResponseOutcome::NotFound, NOT_FOUND_BODY, write_timeout).await;
        }
    };

    let head = ResponseOutcome::Ok(file.clone()).head();
    let interrupted = |source: io::Error| ServeError::TransferInterrupted {
        resource: file.name.clone(),
        source,
    };

    if let Err(source) = send(stream, &serialize_head(&head), write_timeout).await {
        return Delivery {
            status: StatusCode::Ok,
            body_bytes: 0,
            interrupted: Some(interrupted(source)),
        };
    }

    // Never send more than the Content-Length we promised.
    let mut reader = handle.take(file.size);
    let mut chunk = [0u8; CHUNK_SIZE];
    let mut body_bytes = 0u64;

    loop {
        let n = match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(source) => {
                return Delivery {
                    status: StatusCode::Ok,
                    body_bytes,
                    interrupted: Some(interrupted(source)),
                };
            }
        };

        if let Err(source) = send(stream, &chunk[..n], write_timeout).await {
            return Delivery {
                status: StatusCode::Ok,
                body_bytes,
                interrupted: Some(interrupted(source)),
            };
        }

        body_bytes += n as u64;
    }

    // The file shrank after the stat; the client got less than Content-Length.
    if body_bytes < file.size {
        return Delivery {
            status: StatusCode::Ok,
            body_bytes,
            interrupted: Some(interrupted(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "file ended before Content-Length bytes were sent",
            ))),
        };
    }

    Delivery {
        status: StatusCode::Ok,
        body_bytes,
        interrupted: None,
    }
}

async fn send<W>(stream: &mut W, buf: &[u8], write_timeout: Option<Duration>) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let write = async {
        stream.write_all(buf).await?;
        stream.flush().await
    };

    match write_timeout {
        Some(limit) => timeout(limit, write)
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "write timed out"))?,
        None => write.await,
    }
}
