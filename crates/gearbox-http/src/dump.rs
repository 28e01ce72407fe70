//! Serialize a standard [`http::Request`] into HTTP/1.1 wire bytes.
//!
//! The output is what a client would put on the socket: request line in
//! origin form, a `Host` header, the caller's headers in order, body framing,
//! and the body. Framing is always computed from the body itself; any
//! `Content-Length`, `Transfer-Encoding` or `Trailer` header on the request is
//! left out of the dump.

use http::header::{CONTENT_LENGTH, HOST, TRAILER, TRANSFER_ENCODING};
use http::{HeaderName, Request, Version};

use crate::body::encode_chunked;

/// Headers that describe the framing of the dumped body and are therefore
/// written by the serializer, never copied from the request.
pub static FRAMING_HEADERS: [HeaderName; 3] = [CONTENT_LENGTH, TRANSFER_ENCODING, TRAILER];

/// How the body is delimited on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Framing {
    /// `Content-Length` with the exact body size. Omitted for empty bodies.
    #[default]
    ContentLength,
    /// `Transfer-Encoding: chunked`.
    Chunked,
}

/// Errors produced while serializing a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DumpError {
    /// Only HTTP/1.0 and HTTP/1.1 requests can be written as text.
    UnsupportedVersion(Version),
}

impl std::fmt::Display for DumpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedVersion(version) => {
                write!(f, "cannot serialize {version:?} request as HTTP/1.x")
            }
        }
    }
}

impl std::error::Error for DumpError {}

/// Serialize `request` into HTTP/1.1 bytes with `Content-Length` framing.
///
/// # Errors
///
/// Returns [`DumpError::UnsupportedVersion`] for HTTP/2 and later.
///
/// # Example
///
/// ```
/// let request = http::Request::builder()
///     .method("POST")
///     .uri("http://example.com/items?draft=1")
///     .header("Content-Type", "text/plain")
///     .header("Content-Length", "999")
///     .body(b"hi".to_vec())
///     .unwrap();
///
/// let wire = gearbox_http::dump_request(&request).unwrap();
/// assert_eq!(
///     wire,
///     b"POST /items?draft=1 HTTP/1.1\r\n\
///       host: example.com\r\n\
///       content-type: text/plain\r\n\
///       content-length: 2\r\n\
///       \r\n\
///       hi"
/// );
/// ```
pub fn dump_request(request: &Request<Vec<u8>>) -> Result<Vec<u8>, DumpError> {
    dump_request_with(request, Framing::ContentLength)
}

/// Serialize `request` into HTTP/1.1 bytes with the given body framing.
///
/// An explicit `Host` header wins over the URI authority. Relative URIs
/// without a `Host` header produce no `Host` line.
///
/// # Errors
///
/// Returns [`DumpError::UnsupportedVersion`] for HTTP/2 and later.
pub fn dump_request_with(
    request: &Request<Vec<u8>>,
    framing: Framing,
) -> Result<Vec<u8>, DumpError> {
    let version = match request.version() {
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_11 => "HTTP/1.1",
        other => return Err(DumpError::UnsupportedVersion(other)),
    };

    let uri = request.uri();
    let target = uri.path_and_query().map_or("/", |pq| pq.as_str());
    let target = if target.is_empty() { "/" } else { target };
    let headers = request.headers();
    let body = request.body();

    let mut out = Vec::with_capacity(256 + body.len());
    out.extend_from_slice(request.method().as_str().as_bytes());
    out.push(b' ');
    out.extend_from_slice(target.as_bytes());
    out.push(b' ');
    out.extend_from_slice(version.as_bytes());
    out.extend_from_slice(b"\r\n");

    match headers.get(HOST) {
        Some(host) => write_header(&mut out, "host", host.as_bytes()),
        None => {
            if let Some(authority) = uri.authority() {
                write_header(&mut out, "host", authority.as_str().as_bytes());
            }
        }
    }

    for (name, value) in headers {
        if *name == HOST || FRAMING_HEADERS.contains(name) {
            continue;
        }
        write_header(&mut out, name.as_str(), value.as_bytes());
    }

    match framing {
        Framing::ContentLength => {
            if !body.is_empty() {
                write_header(&mut out, "content-length", body.len().to_string().as_bytes());
            }
            out.extend_from_slice(b"\r\n");
            out.extend_from_slice(body);
        }
        Framing::Chunked => {
            write_header(&mut out, "transfer-encoding", b"chunked");
            out.extend_from_slice(b"\r\n");
            out.extend_from_slice(&encode_chunked(body));
        }
    }

    tracing::trace!(bytes = out.len(), ?framing, "serialized request");
    Ok(out)
}

fn write_header(out: &mut Vec<u8>, name: &str, value: &[u8]) {
    out.extend_from_slice(name.as_bytes());
    out.extend_from_slice(b": ");
    out.extend_from_slice(value);
    out.extend_from_slice(b"\r\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Parser;
    use proptest::prelude::*;

    fn build(method: &str, uri: &str) -> http::request::Builder {
        Request::builder().method(method).uri(uri)
    }

    #[test]
    fn relative_uri_has_no_host() {
        let req = build("GET", "/users/42").body(Vec::new()).unwrap();
        let wire = dump_request(&req).unwrap();
        assert_eq!(wire, b"GET /users/42 HTTP/1.1\r\n\r\n");
    }

    #[test]
    fn explicit_host_header_wins() {
        let req = build("GET", "http://a.example/")
            .header("Host", "b.example")
            .body(Vec::new())
            .unwrap();
        let wire = String::from_utf8(dump_request(&req).unwrap()).unwrap();
        assert_eq!(wire, "GET / HTTP/1.1\r\nhost: b.example\r\n\r\n");
    }

    #[test]
    fn chunked_framing_is_explicit() {
        let req = build("POST", "/upload").body(b"abc".to_vec()).unwrap();
        let wire = dump_request_with(&req, Framing::Chunked).unwrap();
        assert_eq!(
            wire,
            b"POST /upload HTTP/1.1\r\ntransfer-encoding: chunked\r\n\r\n3\r\nabc\r\n0\r\n\r\n"
        );
        assert_eq!(Parser::parse(&wire).unwrap().body(), b"abc");
    }

    #[test]
    fn caller_transfer_encoding_is_not_dumped() {
        for value in ["chunked", "gzip", "gzip, chunked", "identity"] {
            let req = build("POST", "/")
                .header("Transfer-Encoding", value)
                .header("Trailer", "X-Checksum")
                .body(b"payload".to_vec())
                .unwrap();
            let wire = dump_request(&req).unwrap();
            let parsed = Parser::parse(&wire).unwrap();
            assert_eq!(parsed.body(), b"payload", "{value}");
            assert!(!parsed.headers().contains("transfer-encoding"), "{value}");
            assert!(!parsed.headers().contains("trailer"), "{value}");
        }
    }

    #[test]
    fn caller_content_length_is_replaced() {
        for value in ["0", "3", "100"] {
            let req = build("POST", "/")
                .header("Content-Length", value)
                .body(b"payload".to_vec())
                .unwrap();
            let parsed = Parser::parse(&dump_request(&req).unwrap()).unwrap();
            assert_eq!(parsed.body(), b"payload", "{value}");
            assert_eq!(parsed.headers().get_str("content-length"), Some("7"));
        }
    }

    #[test]
    fn http2_is_rejected() {
        let req = build("GET", "/")
            .version(Version::HTTP_2)
            .body(Vec::new())
            .unwrap();
        let err = dump_request(&req).unwrap_err();
        assert_eq!(err, DumpError::UnsupportedVersion(Version::HTTP_2));
        assert!(err.to_string().contains("HTTP/2"));
    }

    #[test]
    fn repeated_headers_are_all_written() {
        let req = build("GET", "/")
            .header("Accept", "text/html")
            .header("Accept", "application/json")
            .body(Vec::new())
            .unwrap();
        let parsed = Parser::parse(&dump_request(&req).unwrap()).unwrap();
        let accepts: Vec<_> = parsed
            .headers()
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case("accept"))
            .map(|(_, v)| v)
            .collect();
        assert_eq!(accepts, vec![&b"text/html"[..], &b"application/json"[..]]);
    }

    #[test]
    fn extension_method_is_written_verbatim() {
        let req = build("PROPFIND", "/dav").body(Vec::new()).unwrap();
        let wire = dump_request(&req).unwrap();
        assert!(wire.starts_with(b"PROPFIND /dav HTTP/1.1\r\n"));
    }

    #[test]
    fn query_survives_round_trip() {
        let req = build("GET", "/search?q=a%20b&page=2")
            .body(Vec::new())
            .unwrap();
        let parsed = Parser::parse(&dump_request(&req).unwrap()).unwrap();
        assert_eq!(parsed.path(), "/search");
        assert_eq!(parsed.query(), Some("q=a%20b&page=2"));
    }

    proptest! {
        #[test]
        fn body_round_trips_with_either_framing(
            body in prop::collection::vec(any::<u8>(), 0..512),
            chunked in any::<bool>(),
            transfer_encoding in prop::option::of("[a-z, ]{1,16}"),
            content_length in prop::option::of("[0-9]{1,6}"),
        ) {
            let mut builder = build("PUT", "/blob");
            if let Some(value) = &transfer_encoding {
                builder = builder.header("Transfer-Encoding", value.as_str());
            }
            if let Some(value) = &content_length {
                builder = builder.header("Content-Length", value.as_str());
            }
            let framing = if chunked { Framing::Chunked } else { Framing::ContentLength };
            let req = builder.body(body.clone()).unwrap();
            let parsed = Parser::parse(&dump_request_with(&req, framing).unwrap()).unwrap();
            prop_assert_eq!(parsed.body(), &body[..]);
        }
    }
}
