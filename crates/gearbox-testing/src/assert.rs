//! Panicking assertions on handler responses.
//!
//! Each assertion returns the response so checks can be chained:
//!
//! ```
//! use gearbox_testing::prelude::*;
//!
//! let mut response = Response::new();
//! response.set_body_string("hello world");
//!
//! response
//!     .assert_status_code(200)
//!     .assert_text_contains("world");
//! ```

use std::fmt::Debug;

use gearbox_core::{Response, StatusCode};
use serde::de::DeserializeOwned;

/// Assertions for [`Response`].
pub trait ResponseAssertions {
    /// Asserts that the status code equals `expected`.
    ///
    /// # Panics
    ///
    /// Panics with both codes if they differ.
    fn assert_status_code(&self, expected: u16) -> &Self;

    /// Asserts that the status equals `expected`.
    ///
    /// # Panics
    ///
    /// Panics with both statuses if they differ.
    fn assert_status(&self, expected: StatusCode) -> &Self;

    /// Asserts that header `name` is present with value `expected`.
    ///
    /// # Panics
    ///
    /// Panics if the header is missing or has another value.
    fn assert_header(&self, name: &str, expected: &str) -> &Self;

    /// Asserts that the body equals `expected`.
    ///
    /// # Panics
    ///
    /// Panics if the body differs.
    fn assert_text(&self, expected: &str) -> &Self;

    /// Asserts that the body contains `expected`.
    ///
    /// # Panics
    ///
    /// Panics if the substring is not found.
    fn assert_text_contains(&self, expected: &str) -> &Self;

    /// Asserts that the body decodes as JSON equal to `expected`.
    ///
    /// # Panics
    ///
    /// Panics if the body is not valid JSON for `T` or the value differs.
    fn assert_json<T>(&self, expected: &T) -> &Self
    where
        T: DeserializeOwned + PartialEq + Debug;

    /// Asserts that the body matches the regular expression `pattern`.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` does not compile or the body does not match.
    #[cfg(feature = "regex")]
    fn assert_text_matches(&self, pattern: &str) -> &Self;
}

impl ResponseAssertions for Response {
    #[track_caller]
    fn assert_status_code(&self, expected: u16) -> &Self {
        let actual = self.status().as_u16();
        assert_eq!(actual, expected, "Expected status {expected}, got {actual}");
        self
    }

    #[track_caller]
    fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status(),
            expected,
            "Expected status {expected}, got {}",
            self.status()
        );
        self
    }

    #[track_caller]
    fn assert_header(&self, name: &str, expected: &str) -> &Self {
        let actual = self.header(name);
        assert_eq!(
            actual,
            Some(expected),
            "Expected header '{name}' to be '{expected}', got {actual:?}"
        );
        self
    }

    #[track_caller]
    fn assert_text(&self, expected: &str) -> &Self {
        assert_eq!(self.text(), expected, "Body mismatch");
        self
    }

    #[track_caller]
    fn assert_text_contains(&self, expected: &str) -> &Self {
        let text = self.text();
        assert!(
            text.contains(expected),
            "Expected body to contain '{expected}', got '{text}'"
        );
        self
    }

    #[track_caller]
    fn assert_json<T>(&self, expected: &T) -> &Self
    where
        T: DeserializeOwned + PartialEq + Debug,
    {
        let actual: T = match serde_json::from_slice(self.body()) {
            Ok(value) => value,
            Err(err) => panic!("Body is not valid JSON ({err}): '{}'", self.text()),
        };
        assert_eq!(actual, *expected, "JSON body mismatch");
        self
    }

    #[cfg(feature = "regex")]
    #[track_caller]
    fn assert_text_matches(&self, pattern: &str) -> &Self {
        let re = match regex::Regex::new(pattern) {
            Ok(re) => re,
            Err(err) => panic!("Invalid pattern '{pattern}': {err}"),
        };
        let text = self.text();
        assert!(
            re.is_match(&text),
            "Expected body to match '{pattern}', got '{text}'"
        );
        self
    }
}
