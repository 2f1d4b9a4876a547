//! The request builder.
//!
//! A [`PendingRequest`] accumulates options through consuming chain methods
//! and dispatches with `get`/`post`/`put`/`patch`/`delete`/`send`. Dispatch
//! borrows the builder mutably, so one builder never has two requests in
//! flight, and its configuration survives for the next call.
//!
//! ```rust,no_run
//! # async fn run() -> Result<(), fluentnet::HttpError> {
//! use fluentnet::PendingRequest;
//! use serde_json::json;
//!
//! let mut api = PendingRequest::new()
//!     .accept("application/json")
//!     .with_basic_auth("user", "secret");
//!
//! let created = api.post("https://example.com/items", &json!({"name": "widget"})).await?;
//! if created.is_client_error() {
//!     eprintln!("rejected: {}", created.body());
//! }
//! # Ok(())
//! # }
//! ```

use crate::base::error::HttpError;
use crate::base::neterror::NetError;
use crate::cookies::jar::CookieJar;
use crate::http::headers::HeaderBag;
use crate::http::options::{Auth, AuthScheme, RequestOptions};
use crate::http::query::QueryMap;
use crate::http::request::OutboundRequest;
use crate::http::requestbody::{BodyFormat, Payload, RequestBody};
use crate::http::response::InboundResponse;
use crate::http::stats::TransferStats;
use crate::transport::hooks::{BeforeSending, HookChain, Hooked};
use crate::transport::network::NetworkTransport;
use crate::transport::Transport;
use http::Method;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Fluent request configuration plus dispatch.
#[derive(Clone)]
pub struct PendingRequest {
    options: RequestOptions,
    format: BodyFormat,
    hooks: HookChain,
    transport: Arc<dyn Transport>,
    captured_cookies: Option<CookieJar>,
    transfer_stats: Option<TransferStats>,
}

impl Default for PendingRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PendingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingRequest")
            .field("options", &self.options)
            .field("format", &self.format)
            .field("hooks", &self.hooks)
            .field("captured_cookies", &self.captured_cookies)
            .field("transfer_stats", &self.transfer_stats)
            .finish_non_exhaustive()
    }
}

impl PendingRequest {
    /// JSON body format, no options, the default [`NetworkTransport`].
    pub fn new() -> Self {
        Self {
            options: RequestOptions::default(),
            format: BodyFormat::Json,
            hooks: HookChain::new(),
            transport: Arc::new(NetworkTransport::default()),
            captured_cookies: None,
            transfer_stats: None,
        }
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options.merge(options);
        self
    }

    pub fn without_redirecting(mut self) -> Self {
        self.options.allow_redirects = Some(false);
        self
    }

    pub fn without_verifying(mut self) -> Self {
        self.options.verify = Some(false);
        self
    }

    pub fn as_json(self) -> Self {
        self.body_format(BodyFormat::Json)
            .content_type("application/json")
    }

    pub fn as_form_params(self) -> Self {
        self.body_format(BodyFormat::FormParams)
            .content_type("application/x-www-form-urlencoded")
    }

    /// Multipart sets no `Content-Type` here: the boundary is only known
    /// once the form is built.
    pub fn as_multipart(self) -> Self {
        self.body_format(BodyFormat::Multipart)
    }

    pub fn body_format(mut self, format: BodyFormat) -> Self {
        self.format = format;
        self
    }

    pub fn content_type(self, content_type: impl Into<String>) -> Self {
        self.with_header("Content-Type", content_type)
    }

    pub fn accept(self, accept: impl Into<String>) -> Self {
        self.with_header("Accept", accept)
    }

    /// Union-merge headers. Existing values for the same name are kept.
    pub fn with_headers<I, N, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        self.options.headers.extend(headers);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.headers.append(name, value);
        self
    }

    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.options.auth = Some(Auth::basic(username, password));
        self
    }

    pub fn with_digest_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.options.auth = Some(Auth::digest(username, password));
        self
    }

    /// Use `jar` for every dispatch. Cookies set by responses land in it.
    pub fn with_cookies(mut self, jar: CookieJar) -> Self {
        self.options.cookies = Some(jar);
        self
    }

    /// Bound the whole exchange. Zero disables the limit.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = Some(timeout);
        self
    }

    /// [`timeout`](Self::timeout) in fractional seconds. Negative or NaN
    /// values count as zero.
    pub fn timeout_secs(self, seconds: f64) -> Self {
        let timeout = if seconds.is_nan() || seconds <= 0.0 {
            Duration::ZERO
        } else {
            Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
        };
        self.timeout(timeout)
    }

    /// Register a pre-send hook.
    pub fn before_sending<F>(mut self, hook: F) -> Self
    where
        F: Fn(&OutboundRequest, &RequestOptions) + Send + Sync + 'static,
    {
        self.hooks.push(Arc::new(hook));
        self
    }

    /// Register a pre-send hook implemented as a type.
    pub fn with_hook(mut self, hook: impl BeforeSending + 'static) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    pub fn with_transport(self, transport: impl Transport + 'static) -> Self {
        self.with_shared_transport(Arc::new(transport))
    }

    pub fn with_shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn options(&self) -> &RequestOptions {
        &self.options
    }

    pub fn format(&self) -> BodyFormat {
        self.format
    }

    /// Jar used by the most recent dispatch.
    pub fn captured_cookies(&self) -> Option<&CookieJar> {
        self.captured_cookies.as_ref()
    }

    /// Statistics of the most recent successful dispatch.
    pub fn transfer_stats(&self) -> Option<&TransferStats> {
        self.transfer_stats.as_ref()
    }

    /// GET with `query` merged into any query already in `url`.
    pub async fn get<Q>(&mut self, url: &str, query: &Q) -> Result<InboundResponse, HttpError>
    where
        Q: Serialize + ?Sized,
    {
        let query = QueryMap::from_serialize(query).map_err(HttpError::Payload)?;
        self.send(Method::GET, url, RequestOptions::new().query(query))
            .await
    }

    pub async fn post<P>(&mut self, url: &str, params: &P) -> Result<InboundResponse, HttpError>
    where
        P: Serialize + ?Sized,
    {
        self.send_with_params(Method::POST, url, params).await
    }

    pub async fn put<P>(&mut self, url: &str, params: &P) -> Result<InboundResponse, HttpError>
    where
        P: Serialize + ?Sized,
    {
        self.send_with_params(Method::PUT, url, params).await
    }

    pub async fn patch<P>(&mut self, url: &str, params: &P) -> Result<InboundResponse, HttpError>
    where
        P: Serialize + ?Sized,
    {
        self.send_with_params(Method::PATCH, url, params).await
    }

    pub async fn delete<P>(&mut self, url: &str, params: &P) -> Result<InboundResponse, HttpError>
    where
        P: Serialize + ?Sized,
    {
        self.send_with_params(Method::DELETE, url, params).await
    }

    async fn send_with_params<P>(
        &mut self,
        method: Method,
        url: &str,
        params: &P,
    ) -> Result<InboundResponse, HttpError>
    where
        P: Serialize + ?Sized,
    {
        let payload = Payload::from_serialize(self.format, params).map_err(HttpError::Payload)?;
        let mut extra = RequestOptions::new();
        extra.payload = payload;
        self.send(method, url, extra).await
    }

    /// Dispatch `method` to `url` with `extra` merged over the builder's
    /// options.
    pub async fn send(
        &mut self,
        method: Method,
        url: &str,
        extra: RequestOptions,
    ) -> Result<InboundResponse, HttpError> {
        let (url, url_query) = split_query(url)?;
        let options = self
            .options
            .clone()
            .merged(RequestOptions::new().query(url_query))
            .merged(extra);

        let request = self.materialize(method, url, &options)?;

        let jar = options.cookies.clone().unwrap_or_default();
        self.captured_cookies = Some(jar.clone());

        tracing::debug!(
            method = %request.method(),
            url = %request.url(),
            hooks = self.hooks.len(),
            "dispatching request"
        );

        let hooked = Hooked::new(&self.hooks, self.transport.as_ref());
        let response = match hooked.execute(request, &options, &jar).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(error = %e, code = e.as_i32(), "dispatch failed");
                return Err(HttpError::from(e));
            }
        };

        self.transfer_stats = Some(response.stats.clone());
        Ok(InboundResponse::new(response, jar))
    }

    /// Build the request the transport will see: merged query on the URL,
    /// payload encoded, default headers filled in where absent.
    fn materialize(
        &self,
        method: Method,
        mut url: Url,
        options: &RequestOptions,
    ) -> Result<OutboundRequest, HttpError> {
        if options.query.is_empty() {
            url.set_query(None);
        } else {
            url.set_query(Some(&options.query.encode()));
        }

        let mut headers: HeaderBag = options.headers.clone();
        let mut body = RequestBody::Empty;

        if let Some(payload) = &options.payload {
            if !headers.contains("Content-Type") {
                headers.append("Content-Type", payload.content_type());
            }
            body = payload.encode();
        }

        if let Some(auth) = options.auth.as_ref().filter(|a| a.scheme == AuthScheme::Basic) {
            if !headers.contains("Authorization") {
                headers.append("Authorization", auth.basic_header());
            }
        }

        for (name, value) in self.transport.default_headers().iter() {
            if !headers.contains(name) {
                headers.append(name, value);
            }
        }

        Ok(OutboundRequest::new(method, url, headers, body))
    }
}

/// Parse `url` and move its query string into a [`QueryMap`].
fn split_query(url: &str) -> Result<(Url, QueryMap), HttpError> {
    let mut url = Url::parse(url).map_err(|_| HttpError::Request(NetError::InvalidUrl))?;
    let query = url.query().map(QueryMap::parse).unwrap_or_default();
    url.set_query(None);
    url.set_fragment(None);
    Ok((url, query))
}
