//! Failures that end a single connection.

use std::fmt;
use std::io;

/// Everything that can go wrong while serving one connection.
///
/// None of these ever reach the listener; the handler logs them and closes
/// the connection.
#[derive(Debug)]
pub enum HandlerError {
    /// No usable request line arrived within the read bound.
    MalformedRequest,
    /// The filesystem refused to answer for a reason other than "not found".
    ResolutionError(io::Error),
    /// The resolved file could not be opened or shrank while being sent.
    ResourceUnavailable(io::Error),
    /// Reading from or writing to the client failed or timed out.
    TransportError(io::Error),
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerError::MalformedRequest => write!(f, "malformed request"),
            HandlerError::ResolutionError(e) => write!(f, "resource resolution failed: {e}"),
            HandlerError::ResourceUnavailable(e) => write!(f, "resource unavailable: {e}"),
            HandlerError::TransportError(e) => write!(f, "transport error: {e}"),
        }
    }
}

impl std::error::Error for HandlerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HandlerError::MalformedRequest => None,
            HandlerError::ResolutionError(e)
            | HandlerError::ResourceUnavailable(e)
            | HandlerError::TransportError(e) => Some(e),
        }
    }
}
