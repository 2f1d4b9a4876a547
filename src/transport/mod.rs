//! The transport collaborator.
//!
//! A [`Transport`] turns one [`OutboundRequest`] into one
//! [`TransportResponse`]. Status codes are data, never errors: only failures
//! to obtain a response are reported as `Err`.
//!
//! [`NetworkTransport`] is the default. Tests and embedders can supply their
//! own implementation through
//! [`PendingRequest::with_transport`](crate::pending::PendingRequest::with_transport).

pub mod config;
pub mod hooks;
pub mod network;

use crate::base::neterror::NetError;
use crate::cookies::jar::CookieJar;
use crate::http::headers::HeaderBag;
use crate::http::options::RequestOptions;
use crate::http::request::OutboundRequest;
use crate::http::stats::TransferStats;
use bytes::Bytes;
use futures::future::BoxFuture;
use http::{HeaderMap, StatusCode, Version};

pub use config::TransportConfig;
pub use hooks::{BeforeSending, HookChain, Hooked};
pub use network::NetworkTransport;

/// Future returned by [`Transport::execute`].
pub type Executing<'a> = BoxFuture<'a, Result<TransportResponse, NetError>>;

/// Final response of one dispatch, body fully read.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub version: Version,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub stats: TransferStats,
}

pub trait Transport: Send + Sync {
    /// Headers added to every request when the caller did not set them.
    fn default_headers(&self) -> HeaderBag {
        HeaderBag::new()
    }

    /// Perform the exchange. `jar` receives cookies set by every hop.
    fn execute<'a>(
        &'a self,
        request: OutboundRequest,
        options: &'a RequestOptions,
        jar: &'a CookieJar,
    ) -> Executing<'a>;
}
