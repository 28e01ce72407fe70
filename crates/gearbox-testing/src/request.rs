//! Building and running fake requests.

use gearbox_core::{
    Context, Error, Handler, JsonCodec, Method, Request, RequestCtx, Response, Result,
};
use gearbox_http::{FRAMING_HEADERS, Framing, ParseLimits, Parser, dump_request_with};
use http::{HeaderName, HeaderValue};

use crate::chain::HandlerChain;
use crate::context::FakeContext;

/// A synthetic request and the context its handler will run against.
///
/// Headers and path parameters are injected before [`run`](Self::run).
/// Running serializes the request to HTTP/1.1 bytes and parses them back, so
/// the handler sees exactly what a server would have handed it.
///
/// Body framing on the wire is chosen by [`with_framing`](Self::with_framing),
/// not by injected headers. Injected `Content-Length`, `Transfer-Encoding`
/// and `Trailer` values are still visible to the handler, but they never
/// change how the body is transported.
///
/// # Example
///
/// ```
/// use gearbox_testing::prelude::*;
///
/// let mut req = FakeRequest::new("GET", "/users/42", "").unwrap();
/// req.set_param("id", "42");
///
/// let response = req
///     .run(|ctx| {
///         let id = ctx.param("id").to_owned();
///         ctx.status(StatusCode::OK);
///         ctx.send_json(&serde_json::json!({ "id": id })).unwrap();
///     })
///     .unwrap();
///
/// response
///     .assert_status_code(200)
///     .assert_header("content-type", "application/json")
///     .assert_text(r#"{"id":"42"}"#);
/// ```
#[derive(Debug)]
pub struct FakeRequest {
    request: http::Request<Vec<u8>>,
    body: Vec<u8>,
    context: FakeContext,
    limits: ParseLimits,
    framing: Framing,
}

impl FakeRequest {
    /// Build a request from a method, a URL and a body.
    ///
    /// An empty method means `GET`. The URL may be origin-form (`/path?q`)
    /// or absolute (`http://host/path`); an absolute URL also supplies the
    /// `Host` header.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if the method is not an HTTP token
    /// or the URL does not parse.
    pub fn new(method: &str, url: &str, body: impl Into<Vec<u8>>) -> Result<Self> {
        let method = if method.is_empty() { "GET" } else { method };
        if Method::from_bytes(method.as_bytes()).is_none() {
            return Err(Error::InvalidRequest(format!("invalid method '{method}'")));
        }

        let body = body.into();
        let request = http::Request::builder()
            .method(method)
            .uri(url)
            .body(body.clone())
            .map_err(|err| Error::InvalidRequest(format!("{url}: {err}")))?;

        tracing::debug!(%method, url, body_len = body.len(), "built fake request");
        Ok(Self {
            request,
            body,
            context: FakeContext::default(),
            limits: ParseLimits::default(),
            framing: Framing::default(),
        })
    }

    /// Use `codec` for the handler's JSON encoding and decoding.
    #[must_use]
    pub fn with_codec(mut self, codec: JsonCodec) -> Self {
        self.context = self.context.with_codec(codec);
        self
    }

    /// Use `limits` when parsing the serialized request back.
    #[must_use]
    pub fn with_limits(mut self, limits: ParseLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Frame the body on the wire with `framing` instead of `Content-Length`.
    #[must_use]
    pub fn with_framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    /// Set a path parameter. Last write wins and names are not validated.
    pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let name = name.into();
        tracing::trace!(name = %name, "injected path parameter");
        self.context.set_param(name, value);
        self
    }

    /// Set a request header, replacing any previous value for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if `name` or `value` is not valid in
    /// an HTTP header.
    pub fn set_header(&mut self, name: &str, value: &str) -> Result<&mut Self> {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|err| Error::InvalidRequest(format!("header name '{name}': {err}")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|err| Error::InvalidRequest(format!("header '{name}' value: {err}")))?;
        tracing::trace!(name, "injected request header");
        self.request.headers_mut().insert(header_name, header_value);
        Ok(self)
    }

    /// The standard-form request that will be serialized.
    #[must_use]
    pub fn request(&self) -> &http::Request<Vec<u8>> {
        &self.request
    }

    /// Mutable access to the standard-form request.
    ///
    /// The body handed to the handler is always the one given to
    /// [`new`](Self::new), whatever is done to this request's body.
    pub fn request_mut(&mut self) -> &mut http::Request<Vec<u8>> {
        &mut self.request
    }

    /// The context handlers run against. After a run it holds the final
    /// request and response.
    #[must_use]
    pub fn context(&self) -> &FakeContext {
        &self.context
    }

    /// Mutable access to the context.
    pub fn context_mut(&mut self) -> &mut FakeContext {
        &mut self.context
    }

    /// Run `handler` once against this request and return its response.
    ///
    /// Calls to [`Context::next`] inside the handler do nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if the request cannot be written as
    /// HTTP/1.1 or the written bytes do not parse back.
    pub fn run<F>(&mut self, handler: F) -> Result<Response>
    where
        F: FnOnce(&mut dyn Context),
    {
        self.prepare()?;
        handler(&mut self.context);
        Ok(self.finish())
    }

    /// Run `handlers` as a chain and return the final response.
    ///
    /// The first handler is started immediately; each later one runs only
    /// when its predecessor calls [`Context::next`].
    ///
    /// # Errors
    ///
    /// Same as [`run`](Self::run).
    pub fn run_chain(&mut self, handlers: impl IntoIterator<Item = Handler>) -> Result<Response> {
        self.prepare()?;
        self.context.set_chain(HandlerChain::new(handlers));
        self.context.next();
        Ok(self.finish())
    }

    fn prepare(&mut self) -> Result<()> {
        let wire = dump_request_with(&self.request, self.framing).map_err(Error::serialization)?;
        let mut parsed = Parser::with_limits(self.limits)
            .parse_request(&wire)
            .map_err(Error::serialization)?;
        tracing::debug!(
            wire_len = wire.len(),
            method = %parsed.method(),
            path = parsed.path(),
            "request round-tripped through HTTP/1.1"
        );

        parsed.set_body(self.body.clone());
        self.restore_framing_headers(&mut parsed);
        self.context.reset(RequestCtx::new(parsed));
        Ok(())
    }

    // The wire carries serializer-chosen framing; the handler sees what the
    // caller injected.
    fn restore_framing_headers(&self, parsed: &mut Request) {
        for name in &FRAMING_HEADERS {
            let mut injected = self.request.headers().get_all(name).iter().peekable();
            if injected.peek().is_none() {
                continue;
            }
            parsed.headers_mut().remove(name.as_str());
            for value in injected {
                parsed.headers_mut().append(name.as_str(), value.as_bytes());
            }
        }
    }

    fn finish(&self) -> Response {
        let response = self.context.response().clone();
        tracing::debug!(
            status = response.status().as_u16(),
            body_len = response.body().len(),
            "handler finished"
        );
        response
    }
}
