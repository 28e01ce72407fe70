//! HTTP/1.1 wire handling for gearbox.
//!
//! Serializes standard [`http::Request`] values to bytes and parses bytes
//! back into [`gearbox_core::Request`] records. Both directions are strict
//! about framing, so a request that survives a round trip is one a real
//! server would accept.
//!
//! # Example
//!
//! ```
//! use gearbox_http::{Parser, dump_request};
//!
//! let request = http::Request::builder()
//!     .uri("/path?x=1")
//!     .body(Vec::new())
//!     .unwrap();
//! let wire = dump_request(&request).unwrap();
//! let parsed = Parser::parse(&wire).unwrap();
//! assert_eq!(parsed.path(), "/path");
//! assert_eq!(parsed.query(), Some("x=1"));
//! ```

#![deny(unsafe_code)]

pub mod body;
mod dump;
mod parser;
mod query;

pub use body::{BodyLength, encode_chunked};
pub use dump::{DumpError, FRAMING_HEADERS, Framing, dump_request, dump_request_with};
pub use parser::{ParseError, ParseLimits, Parser};
pub use query::{QueryArgs, percent_decode};
