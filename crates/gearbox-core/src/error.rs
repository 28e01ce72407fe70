//! Error types shared by the context contract and the test harness.

use std::error::Error as StdError;

/// Result alias used throughout gearbox.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The method, URL or a header could not form a valid request.
    InvalidRequest,
    /// A value could not be written out, either as JSON or as HTTP/1.1 bytes.
    SerializationFailure,
    /// The request body has a content type with no registered decoder.
    UnsupportedMediaType,
    /// The request body did not decode into the requested type.
    DeserializationFailure,
}

/// Errors returned by context operations and fake request execution.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Method, URL or header rejected while building a request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Encoding to JSON or to the wire format failed.
    #[error("serialization failed: {0}")]
    Serialization(#[source] Box<dyn StdError + Send + Sync>),

    /// No body decoder for this content type.
    #[error("content type '{0}' is not supported")]
    UnsupportedMediaType(String),

    /// Body decoding failed.
    #[error("failed to decode request body: {0}")]
    Deserialization(#[source] serde_json::Error),
}

impl Error {
    /// Wrap any error as a serialization failure.
    pub fn serialization(err: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::Serialization(err.into())
    }

    /// Returns the classification of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::Serialization(_) => ErrorKind::SerializationFailure,
            Self::UnsupportedMediaType(_) => ErrorKind::UnsupportedMediaType,
            Self::Deserialization(_) => ErrorKind::DeserializationFailure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_media_type_names_content_type() {
        let err = Error::UnsupportedMediaType("text/plain".into());
        assert_eq!(err.kind(), ErrorKind::UnsupportedMediaType);
        assert_eq!(err.to_string(), "content type 'text/plain' is not supported");
    }

    #[test]
    fn serialization_keeps_source() {
        let err = Error::serialization("bad bytes");
        assert_eq!(err.kind(), ErrorKind::SerializationFailure);
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "serialization failed: bad bytes");
    }

    #[test]
    fn deserialization_kind() {
        let json_err = serde_json::from_str::<u8>("nope").unwrap_err();
        let err = Error::Deserialization(json_err);
        assert_eq!(err.kind(), ErrorKind::DeserializationFailure);
    }
}
