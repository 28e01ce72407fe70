//! JSON codec owned by a handler context.
//!
//! The codec is a plain value configured once when the context is built, so
//! two contexts never share encoder settings.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// MIME type for JSON bodies.
pub const MIME_APPLICATION_JSON: &str = "application/json";
/// MIME type for plain text bodies.
pub const MIME_TEXT_PLAIN: &str = "text/plain";

/// JSON encoder/decoder settings.
///
/// The default matches the output of a standard-library JSON encoder:
/// compact, object keys sorted, `<`, `>` and `&` escaped inside strings.
/// U+2028 and U+2029 are always escaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonCodec {
    escape_html: bool,
    pretty: bool,
    sort_keys: bool,
}

impl Default for JsonCodec {
    fn default() -> Self {
        Self {
            escape_html: true,
            pretty: false,
            sort_keys: true,
        }
    }
}

impl JsonCodec {
    /// Create a codec with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether `<`, `>` and `&` are written as `\u` escapes.
    #[must_use]
    pub fn with_escape_html(mut self, escape: bool) -> Self {
        self.escape_html = escape;
        self
    }

    /// Set whether output is indented.
    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Set whether object keys are written in sorted order.
    ///
    /// Sorting goes through an intermediate [`serde_json::Value`], so struct
    /// fields are sorted too. Turn it off to keep field declaration order.
    #[must_use]
    pub fn with_sort_keys(mut self, sort: bool) -> Self {
        self.sort_keys = sort;
        self
    }

    /// Returns whether object keys are sorted.
    #[must_use]
    pub fn sort_keys(&self) -> bool {
        self.sort_keys
    }

    /// Returns whether HTML-sensitive characters are escaped.
    #[must_use]
    pub fn escape_html(&self) -> bool {
        self.escape_html
    }

    /// Returns whether output is indented.
    #[must_use]
    pub fn pretty(&self) -> bool {
        self.pretty
    }

    /// Encode a value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if the value's `Serialize` impl fails,
    /// for example a map with non-string keys.
    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        let raw = if self.sort_keys {
            // serde_json::Map is BTreeMap-backed.
            let value = serde_json::to_value(value).map_err(Error::serialization)?;
            self.write(&value)
        } else {
            self.write(value)
        }
        .map_err(Error::serialization)?;

        Ok(escape(raw, self.escape_html))
    }

    fn write<T: Serialize + ?Sized>(&self, value: &T) -> serde_json::Result<Vec<u8>> {
        if self.pretty {
            serde_json::to_vec_pretty(value)
        } else {
            serde_json::to_vec(value)
        }
    }

    /// Decode a value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Deserialization`] with the decoder's message.
    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes).map_err(Error::Deserialization)
    }
}

// None of these characters is structural in JSON, so they only appear inside
// string literals and can be rewritten byte by byte. U+2028 and U+2029 are
// E2 80 A8 and E2 80 A9 in UTF-8.
fn escape(raw: Vec<u8>, html: bool) -> Vec<u8> {
    let needs_html = |b: &u8| html && matches!(b, b'<' | b'>' | b'&');
    let has_separator = find_separator(&raw).is_some();
    if !has_separator && !raw.iter().any(needs_html) {
        return raw;
    }

    let mut out = Vec::with_capacity(raw.len() + 16);
    let mut rest = raw.as_slice();
    while let Some((&b, tail)) = rest.split_first() {
        match (b, tail) {
            (b'<', _) if html => out.extend_from_slice(b"\\u003c"),
            (b'>', _) if html => out.extend_from_slice(b"\\u003e"),
            (b'&', _) if html => out.extend_from_slice(b"\\u0026"),
            (0xE2, [0x80, 0xA8, after @ ..]) => {
                out.extend_from_slice(b"\\u2028");
                rest = after;
                continue;
            }
            (0xE2, [0x80, 0xA9, after @ ..]) => {
                out.extend_from_slice(b"\\u2029");
                rest = after;
                continue;
            }
            _ => out.push(b),
        }
        rest = tail;
    }
    out
}

fn find_separator(raw: &[u8]) -> Option<usize> {
    raw.windows(3)
        .position(|w| matches!(w, [0xE2, 0x80, 0xA8 | 0xA9]))
}
