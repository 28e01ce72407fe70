//! The handler-visible context contract.
//!
//! Every gearbox handler receives a `&mut dyn Context`. Real server contexts
//! and test doubles implement the same trait, so a handler cannot tell which
//! one it is talking to.
//!
//! The trait is object-safe. Operations that need a generic value (JSON
//! encoding, body decoding, typed locals) live on [`ContextExt`], which is
//! implemented for every context on top of the object-safe primitives.
//!
//! # Example
//!
//! ```
//! use gearbox_core::{Context, ContextExt, StatusCode};
//!
//! fn show_user(ctx: &mut dyn Context) {
//!     let id = ctx.param("id").to_owned();
//!     ctx.status(StatusCode::OK);
//!     let _ = ctx.send_json(&serde_json::json!({ "id": id }));
//! }
//! # let _ = show_user;
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::json::{JsonCodec, MIME_APPLICATION_JSON};
use crate::request::Request;
use crate::response::{Response, StatusCode};

/// A request handler or middleware.
///
/// Middleware continues the chain by calling [`Context::next`]; a handler
/// that never calls it ends the chain.
pub type Handler = Arc<dyn Fn(&mut dyn Context) + Send + Sync>;

/// Wrap a function or closure as a [`Handler`].
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&mut dyn Context) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Per-request scratch storage for passing values between handlers.
#[derive(Default)]
pub struct Locals {
    values: HashMap<String, Box<dyn Any>>,
}

impl Locals {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, replacing any previous value under the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: Box<dyn Any>) {
        self.values.insert(key.into(), value);
    }

    /// Get a value by key, untyped.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&dyn Any> {
        self.values.get(key).map(|value| &**value)
    }

    /// Get a value by key if it has type `T`.
    #[must_use]
    pub fn get_as<T: Any>(&self, key: &str) -> Option<&T> {
        self.values.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    /// Remove a value.
    pub fn remove(&mut self, key: &str) -> Option<Box<dyn Any>> {
        self.values.remove(key)
    }

    /// Number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Locals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

/// A typed key into [`Locals`].
///
/// Declaring keys as constants ties each slot to one type, so producers and
/// consumers in a chain agree at compile time.
///
/// ```
/// use gearbox_core::LocalKey;
///
/// const USER_ID: LocalKey<u64> = LocalKey::new("user_id");
/// assert_eq!(USER_ID.name(), "user_id");
/// ```
pub struct LocalKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> LocalKey<T> {
    /// Declare a key.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// The underlying string key.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for LocalKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for LocalKey<T> {}

impl<T> fmt::Debug for LocalKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LocalKey").field(&self.name).finish()
    }
}

/// The low-level record behind a context: the request being handled, the
/// response being built, and request-scoped locals.
#[derive(Debug, Default)]
pub struct RequestCtx {
    /// Incoming request.
    pub request: Request,
    /// Outgoing response.
    pub response: Response,
    locals: Locals,
}

impl RequestCtx {
    /// Create a context around a parsed request.
    #[must_use]
    pub fn new(request: Request) -> Self {
        Self {
            request,
            response: Response::new(),
            locals: Locals::new(),
        }
    }

    /// Request-scoped locals.
    #[must_use]
    pub fn locals(&self) -> &Locals {
        &self.locals
    }

    /// Mutable request-scoped locals.
    pub fn locals_mut(&mut self) -> &mut Locals {
        &mut self.locals
    }
}

/// Capabilities a handler can use on the request it is serving.
pub trait Context {
    /// Run the next handler in the chain, if there is one.
    fn next(&mut self);

    /// The underlying request/response record.
    fn request_ctx(&self) -> &RequestCtx;

    /// The underlying request/response record, mutably.
    fn request_ctx_mut(&mut self) -> &mut RequestCtx;

    /// The JSON codec this context encodes and decodes with.
    fn json_codec(&self) -> &JsonCodec;

    /// Value of a path parameter, or `""` if it was not matched.
    fn param(&self, key: &str) -> &str;

    /// Replace the response body with raw bytes.
    fn send_bytes(&mut self, value: &[u8]) -> &mut dyn Context;

    /// Replace the response body with a string.
    fn send_string(&mut self, value: &str) -> &mut dyn Context;

    /// Set the response status code.
    fn status(&mut self, status: StatusCode) -> &mut dyn Context;

    /// Request header value, or `""` if absent.
    fn get(&self, key: &str) -> &str {
        self.request_ctx()
            .request
            .headers()
            .get_str(key)
            .unwrap_or_default()
    }

    /// Set a response header, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) {
        self.request_ctx_mut()
            .response
            .headers_mut()
            .set(key, value);
    }

    /// Percent-decoded query parameter, or `""` if absent.
    fn query(&self, key: &str) -> String;

    /// Request body as text.
    fn body(&self) -> String {
        String::from_utf8_lossy(self.request_ctx().request.body()).into_owned()
    }

    /// Store a request-scoped value for later handlers in the chain.
    fn set_local(&mut self, key: &str, value: Box<dyn Any>) {
        self.request_ctx_mut().locals_mut().insert(key, value);
    }

    /// Fetch a value stored with [`set_local`](Context::set_local).
    fn get_local(&self, key: &str) -> Option<&dyn Any> {
        self.request_ctx().locals().get(key)
    }
}

/// Generic conveniences layered over [`Context`].
pub trait ContextExt: Context {
    /// Encode `value` as JSON into the response body.
    ///
    /// On success the `Content-Type` is set to `application/json`. On
    /// failure the response is left exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if `value` cannot be encoded.
    fn send_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let raw = self.json_codec().encode(value)?;
        let response = &mut self.request_ctx_mut().response;
        response.set_content_type(MIME_APPLICATION_JSON);
        response.set_body(raw);
        Ok(())
    }

    /// Decode the request body according to its `Content-Type`.
    ///
    /// Only JSON is supported; the content type must start with
    /// `application/json`, so parameters like `charset` are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedMediaType`] naming the content type for
    /// anything else, or [`Error::Deserialization`] if decoding fails.
    fn parse_body<T: DeserializeOwned>(&self) -> Result<T> {
        let request = &self.request_ctx().request;
        let content_type = request.content_type();
        if content_type.starts_with(MIME_APPLICATION_JSON) {
            return self.json_codec().decode(request.body());
        }
        Err(Error::UnsupportedMediaType(content_type.to_owned()))
    }

    /// Store a value under a typed key.
    fn insert_local<T: Any>(&mut self, key: LocalKey<T>, value: T) {
        self.set_local(key.name(), Box::new(value));
    }

    /// Fetch a value by typed key.
    fn local<T: Any>(&self, key: LocalKey<T>) -> Option<&T> {
        self.get_local(key.name())
            .and_then(|value| value.downcast_ref::<T>())
    }

    /// Fetch a value by string key if it has type `T`.
    fn get_local_as<T: Any>(&self, key: &str) -> Option<&T> {
        self.get_local(key).and_then(|value| value.downcast_ref::<T>())
    }
}

impl<C: Context + ?Sized> ContextExt for C {}
