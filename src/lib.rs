//! # fluentnet
//!
//! A fluent HTTP request builder on top of tokio, hyper and BoringSSL.
//!
//! Options accumulate through chained calls; a dispatch merges them with
//! per-call parameters, runs any pre-send hooks, sends the request and hands
//! back a fully buffered [`InboundResponse`].
//!
//! ## Features
//!
//! - **Body formats**: JSON (default), URL-encoded forms, multipart
//! - **Auth**: basic and digest (RFC 7616)
//! - **Cookies**: shareable jars with RFC 6265 matching and PSL protection
//! - **Redirects**: followed by default, with credential stripping across origins
//! - **Hooks**: inspect the exact request before it leaves the process
//! - **Pluggable transport**: swap the network layer for tests or embedding
//!
//! HTTP error statuses are responses, not errors. Only failures to obtain a
//! response surface as [`HttpError`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fluentnet::Http;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), fluentnet::HttpError> {
//!     let response = Http::accept("application/json")
//!         .timeout_secs(10.0)
//!         .get("https://example.com/search", &json!({"q": "rust"}))
//!         .await?;
//!
//!     println!("{} {}", response.status(), response.body());
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error codes and the caller-facing error type
//! - [`cookies`] - Cookie jar, cookie model, public suffix checks
//! - [`http`] - Options, headers, payloads, request and response views
//! - [`socket`] - DNS, TCP and TLS connection setup
//! - [`transport`] - Transport trait, hooks and the network transport

pub mod base;
pub mod cookies;
pub mod facade;
pub mod http;
pub mod pending;
pub mod socket;
pub mod transport;

pub use crate::base::error::HttpError;
pub use crate::base::neterror::NetError;
pub use crate::cookies::jar::CookieJar;
pub use crate::facade::Http;
pub use crate::http::{
    Auth, AuthScheme, BodyFormat, InboundResponse, OutboundRequest, RequestOptions,
    TransferStats,
};
pub use crate::pending::PendingRequest;
pub use crate::transport::{NetworkTransport, Transport, TransportConfig};
pub use ::http::Method;
