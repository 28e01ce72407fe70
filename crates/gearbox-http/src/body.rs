//! Request body framing.
//!
//! A request body on the wire is framed either by `Content-Length` or by
//! `Transfer-Encoding: chunked`. Without either, a request has no body.

use crate::parser::ParseError;

/// How the body following the header block is delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyLength {
    /// No body.
    Empty,
    /// Exactly this many bytes.
    ContentLength(usize),
    /// Chunked transfer coding.
    Chunked,
}

/// Read a body of known length from the front of `buf`.
pub(crate) fn read_fixed(buf: &[u8], length: usize, max: usize) -> Result<Vec<u8>, ParseError> {
    if length > max {
        return Err(ParseError::BodyTooLarge { size: length, max });
    }
    buf.get(..length)
        .map(<[u8]>::to_vec)
        .ok_or(ParseError::Incomplete)
}

/// Decode a chunked body from the front of `buf`.
///
/// Chunk extensions are ignored and trailer fields are skipped.
pub(crate) fn read_chunked(buf: &[u8], max: usize) -> Result<Vec<u8>, ParseError> {
    let mut body = Vec::new();
    let mut rest = buf;

    loop {
        let line_end = find_crlf(rest).ok_or(ParseError::Incomplete)?;
        let size = parse_chunk_size(&rest[..line_end])?;
        rest = &rest[line_end + 2..];

        if size == 0 {
            // Trailer section ends with an empty line.
            loop {
                let end = find_crlf(rest).ok_or(ParseError::Incomplete)?;
                rest = &rest[end + 2..];
                if end == 0 {
                    return Ok(body);
                }
            }
        }

        if body.len().saturating_add(size) > max {
            return Err(ParseError::BodyTooLarge {
                size: body.len().saturating_add(size),
                max,
            });
        }

        let chunk = rest.get(..size).ok_or(ParseError::Incomplete)?;
        body.extend_from_slice(chunk);
        rest = &rest[size..];

        match rest {
            [b'\r', b'\n', tail @ ..] => rest = tail,
            [] | [b'\r'] => return Err(ParseError::Incomplete),
            _ => return Err(ParseError::InvalidChunk),
        }
    }
}

/// Encode `body` as a single chunk followed by the terminating chunk.
#[must_use]
pub fn encode_chunked(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 16);
    if !body.is_empty() {
        out.extend_from_slice(format!("{:x}\r\n", body.len()).as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(b"0\r\n\r\n");
    out
}

fn parse_chunk_size(line: &[u8]) -> Result<usize, ParseError> {
    let digits = match memchr::memchr(b';', line) {
        Some(pos) => &line[..pos],
        None => line,
    };
    let digits = std::str::from_utf8(digits)
        .map_err(|_| ParseError::InvalidChunk)?
        .trim();
    if digits.is_empty() {
        return Err(ParseError::InvalidChunk);
    }
    usize::from_str_radix(digits, 16).map_err(|_| ParseError::InvalidChunk)
}

pub(crate) fn find_crlf(buf: &[u8]) -> Option<usize> {
    memchr::memmem::find(buf, b"\r\n")
}
