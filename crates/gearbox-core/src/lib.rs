//! Core types and traits for gearbox handlers.
//!
//! This crate provides the contract every handler is written against:
//! - [`Context`] and [`ContextExt`], the capabilities a handler may use
//! - [`RequestCtx`], the request/response record a context is backed by
//! - [`Request`] and [`Response`] records
//! - [`JsonCodec`], an explicit JSON configuration value
//! - [`Error`] and [`ErrorKind`]
//!
//! # Design Principles
//!
//! - Handlers see `&mut dyn Context`, never a concrete type
//! - Every mutator writes straight through to the record
//! - No process-wide configuration

#![forbid(unsafe_code)]

mod context;
pub mod error;
mod json;
mod request;
mod response;

pub use context::{Context, ContextExt, Handler, LocalKey, Locals, RequestCtx, handler};
pub use error::{Error, ErrorKind, Result};
pub use json::{JsonCodec, MIME_APPLICATION_JSON, MIME_TEXT_PLAIN};
pub use request::{Headers, Method, Request, is_token};
pub use response::{DEFAULT_CONTENT_TYPE, Response, StatusCode};
