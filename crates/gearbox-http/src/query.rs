//! Query string parsing.
//!
//! [`QueryArgs`] decodes a raw query string once and answers lookups from the
//! decoded pairs, the way a handler context exposes them.
//!
//! # Example
//!
//! ```
//! use gearbox_http::QueryArgs;
//!
//! let args = QueryArgs::parse("q=hello%20world&page=2&tag=a&tag=b");
//! assert_eq!(args.peek("q"), Some("hello world"));
//! assert_eq!(args.peek("page"), Some("2"));
//! assert_eq!(args.get_all("tag").collect::<Vec<_>>(), vec!["a", "b"]);
//! assert_eq!(args.peek("missing"), None);
//! ```

use std::borrow::Cow;

/// Decoded query arguments, in the order they appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryArgs {
    pairs: Vec<(String, String)>,
}

impl QueryArgs {
    /// Parse a raw query string, with or without the leading `?`.
    ///
    /// Keys and values are percent-decoded and `+` is read as a space.
    /// Empty segments (`a=1&&b=2`) are skipped; a key with no `=` gets an
    /// empty value.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        let pairs = raw
            .split('&')
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
                (
                    percent_decode(key).into_owned(),
                    percent_decode(value).into_owned(),
                )
            })
            .collect();
        Self { pairs }
    }

    /// First value for `key`.
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value for `key`.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if `key` appears at least once.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// All decoded pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of pairs, counting repeated keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true if there are no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Percent-decode a query component.
///
/// Borrows when there is nothing to decode. Malformed escapes are kept
/// verbatim and invalid UTF-8 is replaced.
///
/// ```
/// use gearbox_http::percent_decode;
///
/// assert_eq!(percent_decode("caf%C3%A9+au+lait"), "café au lait");
/// assert_eq!(percent_decode("100%"), "100%");
/// ```
#[must_use]
pub fn percent_decode(input: &str) -> Cow<'_, str> {
    if !input.bytes().any(|b| b == b'%' || b == b'+') {
        return Cow::Borrowed(input);
    }

    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut rest = bytes;
    while let Some((&first, tail)) = rest.split_first() {
        match first {
            b'+' => {
                out.push(b' ');
                rest = tail;
            }
            b'%' => match tail {
                [hi, lo, after @ ..] => match (hex_value(*hi), hex_value(*lo)) {
                    (Some(hi), Some(lo)) => {
                        out.push((hi << 4) | lo);
                        rest = after;
                    }
                    _ => {
                        out.push(b'%');
                        rest = tail;
                    }
                },
                _ => {
                    out.push(b'%');
                    rest = tail;
                }
            },
            other => {
                out.push(other);
                rest = tail;
            }
        }
    }

    match String::from_utf8(out) {
        Ok(decoded) => Cow::Owned(decoded),
        Err(err) => Cow::Owned(String::from_utf8_lossy(err.as_bytes()).into_owned()),
    }
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
