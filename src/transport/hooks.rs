//! Pre-send hooks.
//!
//! Hooks observe the fully materialized request right before it is handed
//! to the transport. They cannot alter it. Every hook runs once per
//! dispatch, in registration order; redirect hops and digest re-sends do
//! not re-run them.

use super::{Executing, Transport};
use crate::cookies::jar::CookieJar;
use crate::http::headers::HeaderBag;
use crate::http::options::RequestOptions;
use crate::http::request::OutboundRequest;
use std::fmt;
use std::sync::Arc;

/// A pre-send inspection callback.
///
/// Implemented for every `Fn(&OutboundRequest, &RequestOptions)` closure.
pub trait BeforeSending: Send + Sync {
    fn before_sending(&self, request: &OutboundRequest, options: &RequestOptions);
}

impl<F> BeforeSending for F
where
    F: Fn(&OutboundRequest, &RequestOptions) + Send + Sync,
{
    fn before_sending(&self, request: &OutboundRequest, options: &RequestOptions) {
        self(request, options)
    }
}

/// Ordered list of hooks.
#[derive(Clone, Default)]
pub struct HookChain {
    hooks: Vec<Arc<dyn BeforeSending>>,
}

impl HookChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, hook: Arc<dyn BeforeSending>) {
        self.hooks.push(hook);
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub fn run(&self, request: &OutboundRequest, options: &RequestOptions) {
        for hook in &self.hooks {
            hook.before_sending(request, options);
        }
    }
}

impl fmt::Debug for HookChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookChain").field("len", &self.hooks.len()).finish()
    }
}

/// A transport wrapped by a hook chain.
pub struct Hooked<'h> {
    hooks: &'h HookChain,
    inner: &'h dyn Transport,
}

impl<'h> Hooked<'h> {
    pub fn new(hooks: &'h HookChain, inner: &'h dyn Transport) -> Self {
        Self { hooks, inner }
    }
}

impl Transport for Hooked<'_> {
    fn default_headers(&self) -> HeaderBag {
        self.inner.default_headers()
    }

    fn execute<'a>(
        &'a self,
        request: OutboundRequest,
        options: &'a RequestOptions,
        jar: &'a CookieJar,
    ) -> Executing<'a> {
        Box::pin(async move {
            self.hooks.run(&request, options);
            self.inner.execute(request, options, jar).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::requestbody::RequestBody;
    use http::Method;
    use std::sync::Mutex;
    use url::Url;

    fn request() -> OutboundRequest {
        OutboundRequest::new(
            Method::GET,
            Url::parse("http://localhost/get").unwrap(),
            HeaderBag::new(),
            RequestBody::Empty,
        )
    }

    #[test]
    fn test_hooks_run_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut chain = HookChain::new();
        for label in ["first", "second"] {
            let seen = seen.clone();
            chain.push(Arc::new(move |_: &OutboundRequest, _: &RequestOptions| {
                seen.lock().unwrap().push(label);
            }));
        }

        chain.run(&request(), &RequestOptions::new());

        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_hooks_see_url() {
        let url = Arc::new(Mutex::new(String::new()));
        let captured = url.clone();
        let mut chain = HookChain::new();
        chain.push(Arc::new(move |request: &OutboundRequest, _: &RequestOptions| {
            *captured.lock().unwrap() = request.url().to_string();
        }));

        chain.run(&request(), &RequestOptions::new());

        assert_eq!(*url.lock().unwrap(), "http://localhost/get");
    }
}
