//! HTTP transport used to reach the YouTube Data API.
//!
//! This module provides:
//! - Read-only request descriptors ([`HttpRequest`])
//! - Buffered responses ([`HttpResponse`])
//! - The client abstraction the agent depends on ([`HttpClient`])
//! - Production client implementation ([`ReqwestClient`])

mod client;
mod error;
mod http;


pub use client::ReqwestClient;
pub use error::HttpError;
pub use http::{HttpClient, HttpRequest, HttpResponse};
