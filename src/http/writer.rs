use std::io;
use std::path::Path;
use std::time::Duration;

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use crate::http::error::HandlerError;
use crate::http::response::{ResponseHead, StatusCode};

const HTTP_VERSION: &str = "HTTP/1.0";
const BODY_CHUNK: usize = 8 * 1024;

/// `HTTP/1.0 <code> <reason>\r\n`
pub fn status_line(status: StatusCode) -> String {
    format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        status.as_u16(),
        status.reason_phrase()
    )
}

/// Serialises the status line, the optional `Content-Length` header and the
/// blank line that ends the head.
pub fn serialize_head(head: &ResponseHead) -> Vec<u8> {
    let mut buf = Vec::new();

    // Status line
    buf.extend_from_slice(status_line(head.status).as_bytes());

    if let Some(len) = head.content_length {
        buf.extend_from_slice(format!("Content-Length: {len}\r\n").as_bytes());
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    buf
}

pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
}

impl ResponseWriter {
    pub fn new(head: &ResponseHead) -> Self {
        Self {
            buffer: serialize_head(head),
            written: 0,
        }
    }

    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "connection closed while writing",
                ));
            }

            self.written += n;
        }

        stream.flush().await
    }
}

/// Streams exactly `len` bytes of the file at `path` into `stream`.
///
/// `write_timeout` bounds each chunk written, not the whole transfer, so a
/// slow but steady client still gets the full body.
///
/// Opening or reading failures and a file that turns out shorter than `len`
/// are [`HandlerError::ResourceUnavailable`]; socket failures and stalled
/// writes are [`HandlerError::TransportError`].
pub async fn send_file<W>(
    stream: &mut W,
    path: &Path,
    len: u64,
    write_timeout: Duration,
) -> Result<u64, HandlerError>
where
    W: AsyncWrite + Unpin,
{
    let file = File::open(path)
        .await
        .map_err(HandlerError::ResourceUnavailable)?;

    let mut body = file.take(len);
    let mut chunk = vec![0u8; BODY_CHUNK];
    let mut sent = 0u64;

    loop {
        let n = body
            .read(&mut chunk)
            .await
            .map_err(HandlerError::ResourceUnavailable)?;

        if n == 0 {
            break;
        }

        timeout(write_timeout, stream.write_all(&chunk[..n]))
            .await
            .map_err(|_| {
                HandlerError::TransportError(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "body write timed out",
                ))
            })?
            .map_err(HandlerError::TransportError)?;

        sent += n as u64;
    }

    stream.flush().await.map_err(HandlerError::TransportError)?;

    if sent < len {
        return Err(HandlerError::ResourceUnavailable(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("file shrank to {sent} of {len} bytes while sending"),
        )));
    }

    Ok(sent)
}
