use std::sync::Arc;
use std::time::Duration;

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use crate::config::Config;
use crate::http::error::HandlerError;
use crate::http::parser::{ParseError, parse_http_request, parse_request_line};
use crate::http::request::Request;
use crate::http::resolver;
use crate::http::response::{ResponseHead, StatusCode};
use crate::http::writer::{self, ResponseWriter};

const READ_CHUNK: usize = 1024;
const LINGER: Duration = Duration::from_millis(250);

/// Serves one request on `stream` and closes it.
///
/// Failures are logged and end only this connection. The stream is shut
/// down exactly once whichever way the exchange ends.
pub async fn handle<S>(stream: S, config: Arc<Config>)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut conn = Connection::new(stream, config);

    if let Err(e) = conn.run().await {
        tracing::warn!(error = %e, "Connection ended with error");
    }

    conn.close().await;
}

pub struct Connection<S> {
    stream: S,
    buffer: BytesMut,
    state: ConnectionState,
    config: Arc<Config>,
}

pub enum ConnectionState {
    Reading,
    Received(Option<Request>), // None = request line unusable
    StatusDecided(ResponseHead),
    HeadersSent(ResponseHead),
    Done,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, config: Arc<Config>) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(READ_CHUNK),
            state: ConnectionState::Reading,
            config,
        }
    }

    pub async fn run(&mut self) -> Result<(), HandlerError> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Done) {
                ConnectionState::Reading => {
                    let request = match self.read_request().await {
                        Ok(request) => Some(request),
                        Err(HandlerError::MalformedRequest) => {
                            tracing::debug!("Malformed request line");
                            None
                        }
                        Err(e) => return Err(e),
                    };

                    self.state = ConnectionState::Received(request);
                }

                ConnectionState::Received(request) => {
                    let head = match self.decide(request.as_ref()).await {
                        Ok(head) => head,
                        Err(e) => {
                            // Best effort; the resolution error is what gets reported.
                            let _ = self
                                .write_head(&ResponseHead::bare(StatusCode::InternalServerError))
                                .await;
                            return Err(e);
                        }
                    };

                    if let Some(req) = &request {
                        tracing::info!(
                            method = %req.method(),
                            uri = %req.uri(),
                            status = head.status.as_u16(),
                            "Responding"
                        );
                    } else {
                        tracing::info!(status = head.status.as_u16(), "Responding to bad request");
                    }

                    self.state = ConnectionState::StatusDecided(head);
                }

                ConnectionState::StatusDecided(head) => {
                    self.write_head(&head).await?;
                    self.state = ConnectionState::HeadersSent(head);
                }

                ConnectionState::HeadersSent(head) => {
                    if let (Some(path), Some(len)) = (&head.body, head.content_length) {
                        let sent = writer::send_file(
                            &mut self.stream,
                            path,
                            len,
                            self.config.write_timeout,
                        )
                        .await?;

                        tracing::debug!(bytes = sent, "Body sent");
                    }

                    self.state = ConnectionState::Done;
                }

                ConnectionState::Done => {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Reads until a request head is complete, the read bound is hit, the
    /// client stops sending, or the idle timeout fires.
    ///
    /// In the last three cases the request is still served when its request
    /// line made it through; header bytes read so far are discarded.
    pub async fn read_request(&mut self) -> Result<Request, HandlerError> {
        let limit = self.config.max_request_bytes;

        loop {
            // A complete head may already be buffered
            match parse_http_request(&self.buffer) {
                Ok((request, consumed)) => {
                    self.buffer.advance(consumed);
                    return Ok(request);
                }

                Err(ParseError::Incomplete) => {
                    // Read more, unless the bound or the idle timeout ends it
                }

                Err(ParseError::Malformed) => return Err(HandlerError::MalformedRequest),
            }

            if self.buffer.len() >= limit {
                tracing::debug!(limit, "Request head exceeds read limit");
                return self.take_request_line();
            }

            let mut temp = [0u8; READ_CHUNK];
            let want = (limit - self.buffer.len()).min(READ_CHUNK);

            let n = match timeout(self.config.read_timeout, self.stream.read(&mut temp[..want])).await {
                Ok(read) => read.map_err(HandlerError::TransportError)?,
                Err(_) => {
                    tracing::debug!("Idle read timeout");
                    return self.take_request_line();
                }
            };

            if n == 0 {
                // Client stopped sending
                return self.take_request_line();
            }

            self.buffer.extend_from_slice(&temp[..n]);
        }
    }

    fn take_request_line(&mut self) -> Result<Request, HandlerError> {
        match parse_request_line(&self.buffer) {
            Ok((request, _)) => {
                self.buffer.clear();
                Ok(request)
            }
            Err(_) => Err(HandlerError::MalformedRequest),
        }
    }

    async fn decide(&self, request: Option<&Request>) -> Result<ResponseHead, HandlerError> {
        let method = request.and_then(Request::known_method);

        let resource = match (method, request) {
            (Some(m), Some(req)) if m.is_retrieval() => {
                Some(resolver::resolve(req.uri(), &self.config.root_dir).await?)
            }
            _ => None,
        };

        Ok(ResponseHead::decide(method, resource.as_ref()).limit_body(self.config.max_response_bytes))
    }

    async fn write_head(&mut self, head: &ResponseHead) -> Result<(), HandlerError> {
        tracing::debug!(line = %writer::status_line(head.status).trim_end(), "Sending status line");

        let mut out = ResponseWriter::new(head);
        timeout(self.config.write_timeout, out.write_to_stream(&mut self.stream))
            .await
            .map_err(|_| timed_out("head write timed out"))?
            .map_err(HandlerError::TransportError)
    }

    /// Shuts the write side down, then drains whatever the client is still
    /// sending for a short while before the stream is dropped.
    ///
    /// Closing a socket with unread input resets it, which can destroy a
    /// response the client has not read yet.
    pub async fn close(mut self) {
        if let Err(e) = self.stream.shutdown().await {
            tracing::debug!(error = %e, "Shutdown failed");
            return;
        }

        let mut sink = [0u8; READ_CHUNK];
        let drain = async {
            let mut drained = 0;
            while drained < self.config.max_request_bytes {
                match self.stream.read(&mut sink).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => drained += n,
                }
            }
        };

        let _ = timeout(LINGER, drain).await;
    }
}

fn timed_out(what: &str) -> HandlerError {
    HandlerError::TransportError(std::io::Error::new(std::io::ErrorKind::TimedOut, what.to_string()))
}
