use crate::http::headers::HeaderBag;
use crate::http::requestbody::RequestBody;
use http::Method;
use std::borrow::Cow;
use url::Url;

/// A fully materialized request, as handed to pre-send hooks and the
/// transport.
///
/// Headers already include the defaults added at dispatch (`User-Agent`,
/// payload `Content-Type`, basic `Authorization`). The `Cookie` header is
/// added per hop by the transport and is not visible here.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    method: Method,
    url: Url,
    headers: HeaderBag,
    body: RequestBody,
}

impl OutboundRequest {
    pub fn new(method: Method, url: Url, headers: HeaderBag, body: RequestBody) -> Self {
        Self {
            method,
            url,
            headers,
            body,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Full URL, including the merged query string.
    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn uri(&self) -> &Url {
        &self.url
    }

    /// Body as text (lossy for non-UTF-8 payloads).
    pub fn body(&self) -> Cow<'_, str> {
        match &self.body {
            RequestBody::Empty => Cow::Borrowed(""),
            RequestBody::Bytes(bytes) => String::from_utf8_lossy(bytes),
        }
    }

    pub fn body_bytes(&self) -> &RequestBody {
        &self.body
    }

    /// First value of each header, original spelling and order.
    pub fn headers(&self) -> Vec<(String, String)> {
        self.headers.first_values()
    }

    /// First value for `name`, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn header_bag(&self) -> &HeaderBag {
        &self.headers
    }

    pub(crate) fn into_parts(self) -> (Method, Url, HeaderBag, RequestBody) {
        (self.method, self.url, self.headers, self.body)
    }
}
