//! HTTP request types.

use std::fmt;

/// HTTP request method.
///
/// The nine methods of RFC 9110 and RFC 5789 have their own variants; any
/// other valid token is kept verbatim as [`Method::Extension`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET
    Get,
    /// HEAD
    Head,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
    /// CONNECT
    Connect,
    /// OPTIONS
    Options,
    /// TRACE
    Trace,
    /// PATCH
    Patch,
    /// Any other method token, such as `PURGE` or `PROPFIND`.
    Extension(String),
}

impl Method {
    /// Parse a method from its wire representation.
    ///
    /// Methods are case-sensitive per RFC 9110, so `get` is an extension
    /// method rather than [`Method::Get`]. Returns `None` if `bytes` is not a
    /// token.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let method = match bytes {
            b"GET" => Self::Get,
            b"HEAD" => Self::Head,
            b"POST" => Self::Post,
            b"PUT" => Self::Put,
            b"DELETE" => Self::Delete,
            b"CONNECT" => Self::Connect,
            b"OPTIONS" => Self::Options,
            b"TRACE" => Self::Trace,
            b"PATCH" => Self::Patch,
            _ if is_token(bytes) => {
                Self::Extension(String::from_utf8_lossy(bytes).into_owned())
            }
            _ => return None,
        };
        Some(method)
    }

    /// Returns the method as it appears on the wire.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Connect => "CONNECT",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
            Self::Patch => "PATCH",
            Self::Extension(token) => token,
        }
    }
}

/// Returns true if `bytes` is a non-empty RFC 9110 token.
#[must_use]
pub fn is_token(bytes: &[u8]) -> bool {
    !bytes.is_empty()
        && bytes
            .iter()
            .all(|&b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b))
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered HTTP header collection with case-insensitive lookup.
///
/// Names keep the casing they were inserted with so that serialized output
/// matches what the caller wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, Vec<u8>)>,
}

impl Headers {
    /// Create empty headers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the first value for a header name (case-insensitive).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_slice())
    }

    /// Get a header value as UTF-8 text, if present and valid.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| std::str::from_utf8(v).ok())
    }

    /// Replace every value for `name` with a single value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) {
        let name = name.into();
        let value = value.into();
        match self
            .entries
            .iter()
            .position(|(n, _)| n.eq_ignore_ascii_case(&name))
        {
            Some(idx) => {
                self.entries[idx].1 = value;
                let mut i = idx + 1;
                while i < self.entries.len() {
                    if self.entries[i].0.eq_ignore_ascii_case(&name) {
                        self.entries.remove(i);
                    } else {
                        i += 1;
                    }
                }
            }
            None => self.entries.push((name, value)),
        }
    }

    /// Append a value without touching existing ones.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Remove every value for `name`, returning whether anything was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        before != self.entries.len()
    }

    /// Returns true if the header is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate over all headers as (name, value) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_slice()))
    }

    /// Returns the number of header lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The request half of a [`RequestCtx`](crate::RequestCtx).
///
/// This is the low-level record a handler context reads from: it is filled
/// by parsing raw HTTP/1.1 bytes rather than built field by field.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    query: Option<String>,
    version: String,
    headers: Headers,
    body: Vec<u8>,
}

impl Default for Request {
    fn default() -> Self {
        Self::new(Method::Get, "/")
    }
}

impl Request {
    /// Create a new HTTP/1.1 request with no headers and no body.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            version: "HTTP/1.1".to_owned(),
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    /// Get the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Get the request path (without the query string).
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get the raw query string, without the leading `?`.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Set the raw query string.
    pub fn set_query(&mut self, query: Option<String>) {
        self.query = query;
    }

    /// Get the protocol version from the request line.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Set the protocol version.
    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = version.into();
    }

    /// Get the headers.
    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Get mutable headers.
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Value of the `Content-Type` header, or the empty string.
    #[must_use]
    pub fn content_type(&self) -> &str {
        self.headers.get_str("content-type").unwrap_or_default()
    }

    /// Get the body bytes.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Replace the body.
    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
    }

    /// Take the body, leaving it empty.
    pub fn take_body(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_round_trips_through_wire_form() {
        for method in [
            Method::Get,
            Method::Head,
            Method::Post,
            Method::Put,
            Method::Delete,
            Method::Connect,
            Method::Options,
            Method::Trace,
            Method::Patch,
        ] {
            assert_eq!(Method::from_bytes(method.as_str().as_bytes()), Some(method));
        }
    }

    #[test]
    fn method_is_case_sensitive() {
        assert_eq!(
            Method::from_bytes(b"get"),
            Some(Method::Extension("get".to_owned()))
        );
    }

    #[test]
    fn extension_methods_keep_their_token() {
        for token in ["PURGE", "PROPFIND", "M-SEARCH", "brew"] {
            let method = Method::from_bytes(token.as_bytes()).unwrap();
            assert_eq!(method, Method::Extension(token.to_owned()));
            assert_eq!(method.as_str(), token);
            assert_eq!(method.to_string(), token);
        }
    }

    #[test]
    fn non_token_methods_are_rejected() {
        for bad in [&b""[..], b"GE T", b"GET/", b"(GET)", b"G\xc3\xa9T"] {
            assert_eq!(Method::from_bytes(bad), None, "{bad:?}");
        }
    }

    #[test]
    fn headers_lookup_ignores_case() {
        let mut headers = Headers::new();
        headers.set("Content-Type", "application/json");
        assert_eq!(headers.get("content-type"), Some(&b"application/json"[..]));
        assert_eq!(headers.get_str("CONTENT-TYPE"), Some("application/json"));
        assert!(headers.contains("Content-type"));
    }

    #[test]
    fn headers_set_replaces_all_values() {
        let mut headers = Headers::new();
        headers.append("X-Tag", "a");
        headers.append("x-tag", "b");
        headers.append("Accept", "*/*");
        headers.set("X-TAG", "c");

        let tags: Vec<_> = headers.iter().filter(|(n, _)| n.eq_ignore_ascii_case("x-tag")).collect();
        assert_eq!(tags, vec![("X-Tag", &b"c"[..])]);
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn headers_keep_insertion_order() {
        let mut headers = Headers::new();
        headers.set("B", "2");
        headers.set("A", "1");
        let names: Vec<_> = headers.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn headers_remove() {
        let mut headers = Headers::new();
        headers.set("Host", "example.com");
        assert!(headers.remove("host"));
        assert!(!headers.remove("host"));
        assert!(headers.is_empty());
    }

    #[test]
    fn request_content_type_defaults_to_empty() {
        let mut req = Request::new(Method::Post, "/items");
        assert_eq!(req.content_type(), "");
        req.headers_mut().set("Content-Type", "text/plain");
        assert_eq!(req.content_type(), "text/plain");
    }

    #[test]
    fn request_take_body_leaves_empty() {
        let mut req = Request::new(Method::Post, "/");
        req.set_body(b"payload".to_vec());
        assert_eq!(req.take_body(), b"payload");
        assert!(req.body().is_empty());
    }
}
