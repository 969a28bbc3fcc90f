use crate::http::request::Request;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// More bytes are needed.
    Incomplete,
    /// The request line cannot be turned into a request.
    Malformed,
}

struct RequestLine {
    request: Request,
    has_version: bool,
    len: usize,
}

/// Parses the request line at the start of `buf`.
///
/// Returns the request and the number of bytes the line occupies, including
/// its terminator. Tokens after the URI are ignored.
pub fn parse_request_line(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    let line = split_request_line(buf)?;
    Ok((line.request, line.len))
}

/// Parses a full request head: the request line plus the header block that
/// follows it.
///
/// Header lines are skipped, not interpreted. A request line without a
/// version token is an HTTP/0.9 simple request and has no header block.
/// Returns the request and the total number of bytes consumed.
pub fn parse_http_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    let line = split_request_line(buf)?;

    if !line.has_version {
        return Ok((line.request, line.len));
    }

    let headers_len = find_headers_end(&buf[line.len..]).ok_or(ParseError::Incomplete)?;
    Ok((line.request, line.len + headers_len))
}

fn split_request_line(buf: &[u8]) -> Result<RequestLine, ParseError> {
    let line_end = find_line_end(buf).ok_or(ParseError::Incomplete)?;
    let raw = trim_cr(&buf[..line_end]);

    if !raw.is_ascii() || raw.iter().any(|b| b.is_ascii_control() && *b != b'\t') {
        return Err(ParseError::Malformed);
    }

    let line = std::str::from_utf8(raw).map_err(|_| ParseError::Malformed)?;
    let mut parts = line.split_ascii_whitespace();

    let method = parts.next().ok_or(ParseError::Malformed)?;
    let uri = parts.next().ok_or(ParseError::Malformed)?;
    let has_version = parts.next().is_some();

    Ok(RequestLine {
        request: Request::new(method, uri),
        has_version,
        len: line_end + 1,
    })
}

fn find_line_end(buf: &[u8]) -> Option<usize> {
    buf.iter().position(|&b| b == b'\n')
}

/// Length of the header block up to and including the blank line that ends it.
fn find_headers_end(buf: &[u8]) -> Option<usize> {
    let mut start = 0;

    loop {
        let end = find_line_end(&buf[start..])?;
        let line = trim_cr(&buf[start..start + end]);
        start += end + 1;

        if line.is_empty() {
            return Some(start);
        }
    }
}

fn trim_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}
