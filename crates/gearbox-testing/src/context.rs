//! The context handed to handlers under test.

use std::collections::HashMap;

use gearbox_core::{Context, JsonCodec, Request, RequestCtx, Response, StatusCode};
use gearbox_http::QueryArgs;

use crate::chain::HandlerChain;

/// A [`Context`] backed by an in-memory request/response record.
///
/// Path parameters come from an explicit mapping instead of a router, and
/// [`next`](Context::next) walks a [`HandlerChain`] instead of a server's
/// middleware stack. Everything else writes straight through to the
/// underlying [`RequestCtx`].
#[derive(Debug, Default)]
pub struct FakeContext {
    inner: RequestCtx,
    params: HashMap<String, String>,
    chain: HandlerChain,
    codec: JsonCodec,
}

impl FakeContext {
    /// Create a context around `request` with no parameters and no chain.
    #[must_use]
    pub fn new(request: Request) -> Self {
        Self {
            inner: RequestCtx::new(request),
            ..Self::default()
        }
    }

    /// Use `codec` for JSON encoding and decoding.
    #[must_use]
    pub fn with_codec(mut self, codec: JsonCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Set a path parameter. Last write wins.
    pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.insert(name.into(), value.into());
    }

    /// All path parameters.
    #[must_use]
    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// Replace the handler chain. The cursor of `chain` is kept as is.
    pub fn set_chain(&mut self, chain: HandlerChain) {
        self.chain = chain;
    }

    /// The handler chain.
    #[must_use]
    pub fn chain(&self) -> &HandlerChain {
        &self.chain
    }

    /// The request being handled.
    #[must_use]
    pub fn request(&self) -> &Request {
        &self.inner.request
    }

    /// The response built so far.
    #[must_use]
    pub fn response(&self) -> &Response {
        &self.inner.response
    }

    /// Raw request body.
    #[must_use]
    pub fn body_bytes(&self) -> &[u8] {
        self.inner.request.body()
    }

    /// Consume the context and keep the response.
    #[must_use]
    pub fn into_response(self) -> Response {
        self.inner.response
    }

    /// Swap in a fresh record, keeping parameters and codec.
    pub(crate) fn reset(&mut self, inner: RequestCtx) {
        self.inner = inner;
        self.chain = HandlerChain::default();
    }
}

impl Context for FakeContext {
    fn next(&mut self) {
        let Some(handler) = self.chain.advance() else {
            tracing::trace!(cursor = self.chain.cursor(), "handler chain exhausted");
            return;
        };
        tracing::debug!(
            cursor = self.chain.cursor(),
            len = self.chain.len(),
            "running next handler"
        );
        (*handler)(self);
    }

    fn request_ctx(&self) -> &RequestCtx {
        &self.inner
    }

    fn request_ctx_mut(&mut self) -> &mut RequestCtx {
        &mut self.inner
    }

    fn json_codec(&self) -> &JsonCodec {
        &self.codec
    }

    fn param(&self, key: &str) -> &str {
        self.params.get(key).map_or("", String::as_str)
    }

    fn send_bytes(&mut self, value: &[u8]) -> &mut dyn Context {
        self.inner.response.set_body(value);
        self
    }

    fn send_string(&mut self, value: &str) -> &mut dyn Context {
        self.inner.response.set_body_string(value);
        self
    }

    fn status(&mut self, status: StatusCode) -> &mut dyn Context {
        self.inner.response.set_status(status);
        self
    }

    fn query(&self, key: &str) -> String {
        let raw = self.inner.request.query().unwrap_or_default();
        QueryArgs::parse(raw)
            .peek(key)
            .unwrap_or_default()
            .to_owned()
    }
}
