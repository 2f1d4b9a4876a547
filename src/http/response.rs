//! Received responses.

use crate::base::error::HttpError;
use crate::cookies::jar::CookieJar;
use crate::http::stats::TransferStats;
use crate::transport::TransportResponse;
use bytes::Bytes;
use http::{HeaderMap, StatusCode, Version};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::OnceLock;
use url::Url;

/// A fully buffered response.
///
/// Immutable once built. 4xx and 5xx statuses arrive here like any other;
/// use the classification predicates to branch on them.
#[derive(Debug, Clone)]
pub struct InboundResponse {
    status: StatusCode,
    version: Version,
    headers: HeaderMap,
    body: Bytes,
    text: OnceLock<String>,
    stats: TransferStats,
    cookies: CookieJar,
}

impl InboundResponse {
    pub(crate) fn new(response: TransportResponse, cookies: CookieJar) -> Self {
        Self {
            status: response.status,
            version: response.version,
            headers: response.headers,
            body: response.body,
            text: OnceLock::new(),
            stats: response.stats,
            cookies,
        }
    }

    /// Body as text. Invalid UTF-8 sequences are replaced.
    pub fn body(&self) -> &str {
        self.text
            .get_or_init(|| String::from_utf8_lossy(&self.body).into_owned())
    }

    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        serde_json::from_slice(&self.body).map_err(HttpError::Decode)
    }

    /// First value of `name`, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Every value of `name` joined with `", "`. Empty if absent.
    pub fn header_line(&self, name: &str) -> String {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// First value of each header. Names are lowercase.
    pub fn headers(&self) -> Vec<(String, String)> {
        self.headers
            .keys()
            .filter_map(|name| {
                let value = self.headers.get(name)?.to_str().ok()?;
                Some((name.as_str().to_string(), value.to_string()))
            })
            .collect()
    }

    pub fn header_map(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn status(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// URL of the final hop, after any redirects.
    pub fn effective_uri(&self) -> &Url {
        &self.stats.effective_uri
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status())
    }

    pub fn is_ok(&self) -> bool {
        self.is_success()
    }

    pub fn is_redirect(&self) -> bool {
        (300..=399).contains(&self.status())
    }

    pub fn is_client_error(&self) -> bool {
        (400..=499).contains(&self.status())
    }

    pub fn is_server_error(&self) -> bool {
        (500..=599).contains(&self.status())
    }

    /// Jar in effect for the dispatch. Shared: cookies stored in it later
    /// are visible here too.
    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    pub fn transfer_stats(&self) -> &TransferStats {
        &self.stats
    }
}

impl fmt::Display for InboundResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.body())
    }
}
