//! Fake request contexts for unit testing gearbox handlers and middleware.
//!
//! A [`FakeRequest`] holds a method, URL, body, injected headers and path
//! parameters. Running it pushes the request through a real HTTP/1.1
//! serialize-and-parse round trip and hands the result to your handler as a
//! [`FakeContext`], so handler code runs unmodified and without a server.
//!
//! # Quick Start
//!
//! ```
//! use gearbox_testing::prelude::*;
//!
//! fn show_user(ctx: &mut dyn Context) {
//!     let id = ctx.param("id").to_owned();
//!     ctx.status(StatusCode::OK);
//!     if ctx.send_json(&serde_json::json!({ "id": id })).is_err() {
//!         ctx.status(StatusCode::INTERNAL_SERVER_ERROR);
//!     }
//! }
//!
//! let mut req = FakeRequest::new("GET", "/users/42", "").unwrap();
//! req.set_param("id", "42");
//! req.run(show_user)
//!     .unwrap()
//!     .assert_status_code(200)
//!     .assert_json(&serde_json::json!({ "id": "42" }));
//! ```
//!
//! # Middleware
//!
//! [`FakeRequest::run_chain`] runs a sequence of handlers where each one
//! continues with [`Context::next`](gearbox_core::Context::next):
//!
//! ```
//! use gearbox_testing::prelude::*;
//!
//! const USER: LocalKey<String> = LocalKey::new("user");
//!
//! let auth = handler(|ctx| {
//!     if ctx.get("Authorization").is_empty() {
//!         ctx.status(StatusCode::UNAUTHORIZED);
//!         return;
//!     }
//!     ctx.insert_local(USER, "ada".to_owned());
//!     ctx.next();
//! });
//! let greet = handler(|ctx| {
//!     let name = ctx.local(USER).cloned().unwrap_or_default();
//!     ctx.send_string(&format!("hello {name}"));
//! });
//!
//! let mut req = FakeRequest::new("GET", "/", "").unwrap();
//! req.set_header("Authorization", "Bearer t").unwrap();
//! req.run_chain([auth, greet]).unwrap().assert_text("hello ada");
//! ```

#![forbid(unsafe_code)]

mod assert;
mod chain;
mod context;
mod request;

pub use assert::ResponseAssertions;
pub use chain::HandlerChain;
pub use context::FakeContext;
pub use request::FakeRequest;

pub use gearbox_http::{Framing, ParseLimits};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        FakeContext, FakeRequest, Framing, HandlerChain, ParseLimits, ResponseAssertions,
    };
    pub use gearbox_core::{
        Context, ContextExt, Error, ErrorKind, Handler, JsonCodec, LocalKey, Response, Result,
        StatusCode, handler,
    };
}
