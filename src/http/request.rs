/// HTTP request methods the server knows how to answer.
///
/// Anything else is treated as a bad request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// POST - Recognised but not implemented
    POST,
    /// DELETE - Recognised but not implemented
    DELETE,
}

impl Method {
    /// Parses an HTTP method from a string.
    ///
    /// Matching is case-sensitive, as method tokens are.
    ///
    /// # Example
    ///
    /// ```
    /// # use minihttpd::http::request::Method;
    /// assert_eq!(Method::from_str("HEAD"), Some(Method::HEAD));
    /// assert_eq!(Method::from_str("get"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::GET),
            "HEAD" => Some(Method::HEAD),
            "POST" => Some(Method::POST),
            "DELETE" => Some(Method::DELETE),
            _ => None,
        }
    }

    /// Whether the method reads a resource (and so needs the resolver).
    pub fn is_retrieval(&self) -> bool {
        matches!(self, Method::GET | Method::HEAD)
    }
}

/// A parsed request line.
///
/// Only the method and URI are kept; the protocol version and any headers
/// are read off the wire and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: String,
    uri: String,
}

impl Request {
    pub fn new(method: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            uri: uri.into(),
        }
    }

    /// The method token exactly as the client sent it.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The request URI exactly as the client sent it.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The method as a known [`Method`], or `None` for anything unrecognised.
    pub fn known_method(&self) -> Option<Method> {
        Method::from_str(&self.method)
    }
}
