use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::http::error::ServeError;
use crate::http::request::{ParsedRequest, RawRequest};

/// The two file shapes the server was built to hand out.
static STRICT_REQUEST_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"GET\s+/(file[0-9]\.html|image[0-9]\.jpg)\s+HTTP/[0-9]\.[0-9]")
        .expect("strict request-line pattern is valid")
});

/// Any single non-whitespace token after the slash.
static GENERIC_REQUEST_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"GET\s+/(\S+)\s+HTTP/[0-9]\.[0-9]")
        .expect("generic request-line pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Nothing was read from the connection.
    Empty,
    /// No `\r\n\r\n` in the bytes we got.
    MissingTerminator,
    /// The request line matched neither grammar.
    NoMatch,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ParseError::Empty => "no bytes read",
            ParseError::MissingTerminator => "header terminator missing",
            ParseError::NoMatch => "request line does not match",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for ParseError {}

/// Extracts the requested resource name from a raw request buffer.
///
/// The strict pattern is tried before the generic one. Both are searched for
/// anywhere within the request line, and only the request line is looked at. Header fields and any body are ignored.
pub fn parse_http_request(buf: &[u8]) -> Result<String, ParseError> {
    if buf.is_empty() {
        return Err(ParseError::Empty);
    }

    let headers_end = find_headers_end(buf).ok_or(ParseError::MissingTerminator)?;
    let header_text = String::from_utf8_lossy(&buf[..headers_end]);

    let request_line = header_text
        .split("\r\n")
        .next()
        .unwrap_or_default();

    let captures = STRICT_REQUEST_LINE
        .captures(request_line)
        .or_else(|| GENERIC_REQUEST_LINE.captures(request_line))
        .ok_or(ParseError::NoMatch)?;

    Ok(captures[1].to_string())
}

/// Classifies a captured request. Never fails: anything unparsable is a bad request.
pub fn parse(raw: &RawRequest) -> ParsedRequest {
    match parse_http_request(raw.as_bytes()) {
        Ok(resource) => {
            tracing::debug!(resource = %resource, "Request line accepted");
            ParsedRequest::ok(resource)
        }
        Err(reason) => {
            let e = ServeError::from(reason);
            tracing::debug!(error = %e, bytes = raw.len(), "Sending 400 Bad Request");
            ParsedRequest::bad_request()
        }
    }
}

fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4)
        .position(|w| w == b"\r\n\r\n")
}
