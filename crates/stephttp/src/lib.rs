//! HTTP tool invocation
//!
//! [`HttpToolInvoker`] turns a step's resolved inputs into an HTTP request
//! described by a [`ToolDefinition`](stepcore::ToolDefinition) and maps the
//! response back to a step output.

mod auth;
mod client;
mod request;
mod response;

pub use client::{HttpClientConfig, HttpToolInvoker};
