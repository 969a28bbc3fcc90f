use std::path::PathBuf;

use crate::http::request::Method;
use crate::http::resolver::ResolvedResource;

/// HTTP status codes the server sends.
///
/// - `Ok` (200): Resource found
/// - `BadRequest` (400): Unparseable request or unknown method
/// - `NotFound` (404): Resource missing
/// - `InternalServerError` (500): Server-side failure while resolving
/// - `NotImplemented` (501): Known method the server does not serve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
    /// 500 Internal Server Error
    InternalServerError,
    /// 501 Not Implemented
    NotImplemented,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use minihttpd::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotImplemented.as_u16(), 501);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::InternalServerError => 500,
            StatusCode::NotImplemented => 501,
        }
    }

    /// Returns the reason phrase for this status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use minihttpd::http::response::StatusCode;
    /// assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::NotImplemented => "Not Implemented",
        }
    }
}

/// What will be sent back: the status, the optional `Content-Length` header
/// and the file to stream as the body, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    pub status: StatusCode,
    pub content_length: Option<u64>,
    pub body: Option<PathBuf>,
}

impl ResponseHead {
    /// A response made of the status line and the blank line only.
    pub fn bare(status: StatusCode) -> Self {
        Self {
            status,
            content_length: None,
            body: None,
        }
    }

    /// Decides the response from the request method and the resolver outcome.
    ///
    /// `method` is `None` when the request could not be parsed or named a
    /// method the server does not recognise. `resource` is only consulted
    /// for GET and HEAD.
    ///
    /// | method        | resource exists | status |
    /// |---------------|-----------------|--------|
    /// | GET, HEAD     | yes             | 200    |
    /// | GET, HEAD     | no              | 404    |
    /// | POST, DELETE  | any             | 501    |
    /// | other / none  | any             | 400    |
    ///
    /// Only a 200 answer to GET carries a body. HEAD gets the same
    /// `Content-Length` header without one.
    pub fn decide(method: Option<Method>, resource: Option<&ResolvedResource>) -> Self {
        match method {
            Some(method) if method.is_retrieval() => match resource {
                Some(resource) if resource.exists => Self {
                    status: StatusCode::Ok,
                    content_length: resource.size,
                    body: (method == Method::GET).then(|| resource.path.clone()),
                },
                _ => Self::bare(StatusCode::NotFound),
            },
            Some(_) => Self::bare(StatusCode::NotImplemented),
            None => Self::bare(StatusCode::BadRequest),
        }
    }

    /// Replaces a body larger than `max_bytes` with a bare 500.
    pub fn limit_body(self, max_bytes: u64) -> Self {
        match (&self.body, self.content_length) {
            (Some(path), Some(len)) if len > max_bytes => {
                tracing::warn!(
                    path = %path.display(),
                    size = len,
                    limit = max_bytes,
                    "Refusing to send oversized file"
                );
                Self::bare(StatusCode::InternalServerError)
            }
            _ => self,
        }
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }
}
