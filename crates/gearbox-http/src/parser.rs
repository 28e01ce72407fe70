//! HTTP/1.1 request parser.
//!
//! Turns a complete request buffer (request line, headers, body) into a
//! [`Request`] record. The buffer must hold the whole request; there is no
//! incremental mode.

use gearbox_core::{Method, Request, is_token};

use crate::body::{self, BodyLength};

/// Errors produced while parsing a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Request line is not `METHOD SP target SP version`.
    InvalidRequestLine,
    /// Unknown or malformed method.
    InvalidMethod,
    /// Version is not HTTP/1.x.
    InvalidVersion,
    /// Malformed header line.
    InvalidHeader,
    /// Header line longer than the configured limit.
    HeaderLineTooLong,
    /// More header lines than the configured limit.
    TooManyHeaders,
    /// `Content-Length` is not a non-negative integer.
    InvalidContentLength,
    /// Transfer coding other than `chunked`.
    InvalidTransferEncoding,
    /// Both `Transfer-Encoding` and `Content-Length` were sent.
    AmbiguousBodyLength,
    /// Malformed chunk in a chunked body.
    InvalidChunk,
    /// Body exceeds the configured limit.
    BodyTooLarge {
        /// Declared or accumulated size.
        size: usize,
        /// Configured maximum.
        max: usize,
    },
    /// Buffer ends before the request does.
    Incomplete,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequestLine => write!(f, "invalid request line"),
            Self::InvalidMethod => write!(f, "invalid HTTP method"),
            Self::InvalidVersion => write!(f, "unsupported HTTP version"),
            Self::InvalidHeader => write!(f, "invalid header"),
            Self::HeaderLineTooLong => write!(f, "header line too long"),
            Self::TooManyHeaders => write!(f, "too many headers"),
            Self::InvalidContentLength => write!(f, "invalid content-length"),
            Self::InvalidTransferEncoding => write!(f, "invalid transfer-encoding"),
            Self::AmbiguousBodyLength => write!(f, "ambiguous body length"),
            Self::InvalidChunk => write!(f, "invalid chunked encoding"),
            Self::BodyTooLarge { size, max } => {
                write!(f, "body too large: {size} bytes exceeds limit of {max}")
            }
            Self::Incomplete => write!(f, "incomplete request"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parsing limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    max_header_count: usize,
    max_header_line_len: usize,
    max_body_size: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_header_count: 100,
            max_header_line_len: 8 * 1024,
            max_body_size: 4 * 1024 * 1024,
        }
    }
}

impl ParseLimits {
    /// Create limits with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of header lines.
    #[must_use]
    pub fn with_max_header_count(mut self, count: usize) -> Self {
        self.max_header_count = count;
        self
    }

    /// Set the maximum length of one header line.
    #[must_use]
    pub fn with_max_header_line_len(mut self, len: usize) -> Self {
        self.max_header_line_len = len;
        self
    }

    /// Set the maximum body size.
    #[must_use]
    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    /// Maximum number of header lines.
    #[must_use]
    pub fn max_header_count(&self) -> usize {
        self.max_header_count
    }

    /// Maximum length of one header line.
    #[must_use]
    pub fn max_header_line_len(&self) -> usize {
        self.max_header_line_len
    }

    /// Maximum body size.
    #[must_use]
    pub fn max_body_size(&self) -> usize {
        self.max_body_size
    }
}

/// Request parser.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    limits: ParseLimits,
}

impl Parser {
    /// Create a parser with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with custom limits.
    #[must_use]
    pub fn with_limits(limits: ParseLimits) -> Self {
        Self { limits }
    }

    /// The limits this parser enforces.
    #[must_use]
    pub fn limits(&self) -> &ParseLimits {
        &self.limits
    }

    /// Parse a complete request with default limits.
    ///
    /// # Errors
    ///
    /// See [`Parser::parse_request`].
    pub fn parse(buf: &[u8]) -> Result<Request, ParseError> {
        Self::new().parse_request(buf)
    }

    /// Parse a complete request.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] describing the first problem found.
    pub fn parse_request(&self, buf: &[u8]) -> Result<Request, ParseError> {
        let head_end = memchr::memmem::find(buf, b"\r\n\r\n").ok_or(ParseError::Incomplete)?;
        let head = &buf[..head_end + 2];
        let rest = &buf[head_end + 4..];

        let line_end = body::find_crlf(head).ok_or(ParseError::InvalidRequestLine)?;
        let mut request = parse_request_line(&head[..line_end])?;

        let mut lines = &head[line_end + 2..];
        let mut count = 0usize;
        while let Some(end) = body::find_crlf(lines) {
            let line = &lines[..end];
            lines = &lines[end + 2..];

            count += 1;
            if count > self.limits.max_header_count {
                return Err(ParseError::TooManyHeaders);
            }
            if line.len() > self.limits.max_header_line_len {
                return Err(ParseError::HeaderLineTooLong);
            }
            let (name, value) = parse_header_line(line)?;
            request.headers_mut().append(name, value);
        }

        let body = match body_length(&request)? {
            BodyLength::Empty => Vec::new(),
            BodyLength::ContentLength(len) => {
                body::read_fixed(rest, len, self.limits.max_body_size)?
            }
            BodyLength::Chunked => body::read_chunked(rest, self.limits.max_body_size)?,
        };
        request.set_body(body);

        tracing::trace!(
            method = %request.method(),
            path = request.path(),
            headers = request.headers().len(),
            body_len = request.body().len(),
            "parsed request"
        );
        Ok(request)
    }
}

fn parse_request_line(line: &[u8]) -> Result<Request, ParseError> {
    let line = std::str::from_utf8(line).map_err(|_| ParseError::InvalidRequestLine)?;
    let mut parts = line.split(' ');
    let (Some(method), Some(target), Some(version), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(ParseError::InvalidRequestLine);
    };

    let method = Method::from_bytes(method.as_bytes()).ok_or(ParseError::InvalidMethod)?;
    if !version.starts_with("HTTP/1.") {
        return Err(ParseError::InvalidVersion);
    }
    if target.is_empty() {
        return Err(ParseError::InvalidRequestLine);
    }

    let target = strip_absolute_form(target);
    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path, Some(query.to_owned())),
        None => (target, None),
    };
    let path = if path.is_empty() { "/" } else { path };

    let mut request = Request::new(method, path);
    request.set_query(query);
    request.set_version(version);
    Ok(request)
}

// "http://host:port/path?q" -> "/path?q"
fn strip_absolute_form(target: &str) -> &str {
    let Some((_, after_scheme)) = target.split_once("://") else {
        return target;
    };
    match after_scheme.find(['/', '?']) {
        Some(pos) => &after_scheme[pos..],
        None => "/",
    }
}

fn parse_header_line(line: &[u8]) -> Result<(String, Vec<u8>), ParseError> {
    if matches!(line.first(), Some(b' ' | b'\t')) {
        // Obsolete line folding.
        return Err(ParseError::InvalidHeader);
    }
    let colon = memchr::memchr(b':', line).ok_or(ParseError::InvalidHeader)?;
    let name = &line[..colon];
    if !is_token(name) {
        return Err(ParseError::InvalidHeader);
    }
    let value = trim_ows(&line[colon + 1..]);
    let name = std::str::from_utf8(name).map_err(|_| ParseError::InvalidHeader)?;
    Ok((name.to_owned(), value.to_vec()))
}

fn body_length(request: &Request) -> Result<BodyLength, ParseError> {
    let headers = request.headers();
    let content_length = headers.get("content-length");
    let transfer_encoding = headers.get_str("transfer-encoding");

    if let Some(te) = transfer_encoding {
        if content_length.is_some() {
            return Err(ParseError::AmbiguousBodyLength);
        }
        let last = te.rsplit(',').next().unwrap_or_default().trim();
        if last.eq_ignore_ascii_case("chunked") {
            return Ok(BodyLength::Chunked);
        }
        return Err(ParseError::InvalidTransferEncoding);
    }

    match content_length {
        Some(raw) => std::str::from_utf8(raw)
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .map(BodyLength::ContentLength)
            .ok_or(ParseError::InvalidContentLength),
        None => Ok(BodyLength::Empty),
    }
}

fn trim_ows(mut value: &[u8]) -> &[u8] {
    while let [b' ' | b'\t', rest @ ..] = value {
        value = rest;
    }
    while let [rest @ .., b' ' | b'\t'] = value {
        value = rest;
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_get() {
        let req = Parser::parse(b"GET /users/42?verbose=1 HTTP/1.1\r\nHost: example.com\r\n\r\n")
            .unwrap();
        assert_eq!(req.method(), &Method::Get);
        assert_eq!(req.path(), "/users/42");
        assert_eq!(req.query(), Some("verbose=1"));
        assert_eq!(req.version(), "HTTP/1.1");
        assert_eq!(req.headers().get_str("host"), Some("example.com"));
        assert!(req.body().is_empty());
    }

    #[test]
    fn reads_content_length_body() {
        let req = Parser::parse(
            b"POST /items HTTP/1.1\r\nContent-Type: application/json\r\nContent-Length: 7\r\n\r\n{\"a\":1}",
        )
        .unwrap();
        assert_eq!(req.body(), br#"{"a":1}"#);
        assert_eq!(req.content_type(), "application/json");
    }

    #[test]
    fn reads_chunked_body() {
        let req = Parser::parse(
            b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n4\r\nwire\r\n0\r\n\r\n",
        )
        .unwrap();
        assert_eq!(req.body(), b"wire");
    }

    #[test]
    fn no_length_means_no_body() {
        let req = Parser::parse(b"POST / HTTP/1.1\r\n\r\nignored").unwrap();
        assert!(req.body().is_empty());
    }

    #[test]
    fn header_values_are_trimmed() {
        let req = Parser::parse(b"GET / HTTP/1.1\r\nX-Pad: \t spaced \t\r\n\r\n").unwrap();
        assert_eq!(req.headers().get_str("x-pad"), Some("spaced"));
    }

    #[test]
    fn absolute_form_target() {
        let req = Parser::parse(b"GET http://example.com:8080/a/b?c=d HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.path(), "/a/b");
        assert_eq!(req.query(), Some("c=d"));

        let req = Parser::parse(b"GET http://example.com HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.path(), "/");
    }

    #[test]
    fn accepts_extension_methods() {
        let req = Parser::parse(b"PURGE /cache HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.method(), &Method::Extension("PURGE".to_owned()));
        assert_eq!(req.path(), "/cache");
    }

    #[test]
    fn rejects_bad_request_lines() {
        assert_eq!(
            Parser::parse(b"GET /\r\n\r\n").unwrap_err(),
            ParseError::InvalidRequestLine
        );
        assert_eq!(
            Parser::parse(b"GE(T / HTTP/1.1\r\n\r\n").unwrap_err(),
            ParseError::InvalidMethod
        );
        assert_eq!(
            Parser::parse(b"GET / HTTP/2\r\n\r\n").unwrap_err(),
            ParseError::InvalidVersion
        );
    }

    #[test]
    fn rejects_bad_headers() {
        assert_eq!(
            Parser::parse(b"GET / HTTP/1.1\r\nNoColon\r\n\r\n").unwrap_err(),
            ParseError::InvalidHeader
        );
        assert_eq!(
            Parser::parse(b"GET / HTTP/1.1\r\nA: 1\r\n folded\r\n\r\n").unwrap_err(),
            ParseError::InvalidHeader
        );
        assert_eq!(
            Parser::parse(b"GET / HTTP/1.1\r\nBad Name: 1\r\n\r\n").unwrap_err(),
            ParseError::InvalidHeader
        );
    }

    #[test]
    fn rejects_ambiguous_length() {
        let err = Parser::parse(
            b"POST / HTTP/1.1\r\nContent-Length: 1\r\nTransfer-Encoding: chunked\r\n\r\n",
        )
        .unwrap_err();
        assert_eq!(err, ParseError::AmbiguousBodyLength);
    }

    #[test]
    fn rejects_unknown_transfer_coding() {
        let err = Parser::parse(b"POST / HTTP/1.1\r\nTransfer-Encoding: gzip\r\n\r\n").unwrap_err();
        assert_eq!(err, ParseError::InvalidTransferEncoding);
    }

    #[test]
    fn rejects_bad_content_length() {
        let err = Parser::parse(b"POST / HTTP/1.1\r\nContent-Length: -1\r\n\r\n").unwrap_err();
        assert_eq!(err, ParseError::InvalidContentLength);
    }

    #[test]
    fn missing_head_terminator_is_incomplete() {
        assert_eq!(
            Parser::parse(b"GET / HTTP/1.1\r\nHost: a\r\n").unwrap_err(),
            ParseError::Incomplete
        );
    }

    #[test]
    fn limits_are_enforced() {
        let parser = Parser::with_limits(ParseLimits::new().with_max_header_count(1));
        assert_eq!(
            parser
                .parse_request(b"GET / HTTP/1.1\r\nA: 1\r\nB: 2\r\n\r\n")
                .unwrap_err(),
            ParseError::TooManyHeaders
        );

        let parser = Parser::with_limits(ParseLimits::new().with_max_header_line_len(8));
        assert_eq!(
            parser
                .parse_request(b"GET / HTTP/1.1\r\nX-Long: abcdef\r\n\r\n")
                .unwrap_err(),
            ParseError::HeaderLineTooLong
        );

        let parser = Parser::with_limits(ParseLimits::new().with_max_body_size(2));
        assert_eq!(
            parser
                .parse_request(b"POST / HTTP/1.1\r\nContent-Length: 3\r\n\r\nabc")
                .unwrap_err(),
            ParseError::BodyTooLarge { size: 3, max: 2 }
        );
    }

    #[test]
    fn error_messages() {
        assert_eq!(ParseError::Incomplete.to_string(), "incomplete request");
        assert_eq!(
            ParseError::BodyTooLarge { size: 10, max: 5 }.to_string(),
            "body too large: 10 bytes exceeds limit of 5"
        );
    }
}
