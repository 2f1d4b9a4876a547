//! Static entry points.
//!
//! Every function creates a fresh [`PendingRequest`] and forwards to it, so
//! `Http::accept("text/xml").get(..)` reads the same as the builder chain.

use crate::base::error::HttpError;
use crate::cookies::jar::CookieJar;
use crate::http::options::RequestOptions;
use crate::http::request::OutboundRequest;
use crate::http::requestbody::BodyFormat;
use crate::http::response::InboundResponse;
use crate::pending::PendingRequest;
use crate::transport::Transport;
use http::Method;
use serde::Serialize;
use std::time::Duration;

/// Namespace for one-shot requests and builder shortcuts.
#[derive(Debug, Clone, Copy)]
pub struct Http;

impl Http {
    pub fn builder() -> PendingRequest {
        PendingRequest::new()
    }

    pub fn with_options(options: RequestOptions) -> PendingRequest {
        PendingRequest::new().with_options(options)
    }

    pub fn without_redirecting() -> PendingRequest {
        PendingRequest::new().without_redirecting()
    }

    pub fn without_verifying() -> PendingRequest {
        PendingRequest::new().without_verifying()
    }

    pub fn as_json() -> PendingRequest {
        PendingRequest::new().as_json()
    }

    pub fn as_form_params() -> PendingRequest {
        PendingRequest::new().as_form_params()
    }

    pub fn as_multipart() -> PendingRequest {
        PendingRequest::new().as_multipart()
    }

    pub fn body_format(format: BodyFormat) -> PendingRequest {
        PendingRequest::new().body_format(format)
    }

    pub fn content_type(content_type: impl Into<String>) -> PendingRequest {
        PendingRequest::new().content_type(content_type)
    }

    pub fn accept(accept: impl Into<String>) -> PendingRequest {
        PendingRequest::new().accept(accept)
    }

    pub fn with_headers<I, N, V>(headers: I) -> PendingRequest
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        PendingRequest::new().with_headers(headers)
    }

    pub fn with_header(name: impl Into<String>, value: impl Into<String>) -> PendingRequest {
        PendingRequest::new().with_header(name, value)
    }

    pub fn with_basic_auth(username: impl Into<String>, password: impl Into<String>) -> PendingRequest {
        PendingRequest::new().with_basic_auth(username, password)
    }

    pub fn with_digest_auth(username: impl Into<String>, password: impl Into<String>) -> PendingRequest {
        PendingRequest::new().with_digest_auth(username, password)
    }

    pub fn with_cookies(jar: CookieJar) -> PendingRequest {
        PendingRequest::new().with_cookies(jar)
    }

    pub fn timeout(timeout: Duration) -> PendingRequest {
        PendingRequest::new().timeout(timeout)
    }

    pub fn timeout_secs(seconds: f64) -> PendingRequest {
        PendingRequest::new().timeout_secs(seconds)
    }

    pub fn before_sending<F>(hook: F) -> PendingRequest
    where
        F: Fn(&OutboundRequest, &RequestOptions) + Send + Sync + 'static,
    {
        PendingRequest::new().before_sending(hook)
    }

    pub fn with_transport(transport: impl Transport + 'static) -> PendingRequest {
        PendingRequest::new().with_transport(transport)
    }

    pub async fn get<Q>(url: &str, query: &Q) -> Result<InboundResponse, HttpError>
    where
        Q: Serialize + ?Sized,
    {
        PendingRequest::new().get(url, query).await
    }

    pub async fn post<P>(url: &str, params: &P) -> Result<InboundResponse, HttpError>
    where
        P: Serialize + ?Sized,
    {
        PendingRequest::new().post(url, params).await
    }

    pub async fn put<P>(url: &str, params: &P) -> Result<InboundResponse, HttpError>
    where
        P: Serialize + ?Sized,
    {
        PendingRequest::new().put(url, params).await
    }

    pub async fn patch<P>(url: &str, params: &P) -> Result<InboundResponse, HttpError>
    where
        P: Serialize + ?Sized,
    {
        PendingRequest::new().patch(url, params).await
    }

    pub async fn delete<P>(url: &str, params: &P) -> Result<InboundResponse, HttpError>
    where
        P: Serialize + ?Sized,
    {
        PendingRequest::new().delete(url, params).await
    }

    pub async fn send(method: Method, url: &str, extra: RequestOptions) -> Result<InboundResponse, HttpError> {
        PendingRequest::new().send(method, url, extra).await
    }
}
