//! Chat backend for a commercial-printing storefront.
//!
//! Forwards the browser-held conversation to the hosted Messages API and
//! re-frames the vendor's SSE stream into the newline-delimited data-stream
//! protocol the browser chat runtime consumes.

pub mod anthropic;
pub mod config;
pub mod errors;
pub mod models;
pub mod routes;
pub mod service;
pub mod stream;
