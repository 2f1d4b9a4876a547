//! Typed request options and their merge rules.
//!
//! Scalars (`allow_redirects`, `verify`, `auth`, `cookies`, `timeout`,
//! `payload`) take the last value written. `headers` and `query` are unions:
//! merging appends values, so nothing set earlier is lost.

use crate::cookies::jar::CookieJar;
use crate::http::headers::HeaderBag;
use crate::http::query::QueryMap;
use crate::http::requestbody::Payload;
use base64::Engine;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    Basic,
    Digest,
}

/// Credentials for HTTP authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct Auth {
    pub username: String,
    pub password: String,
    pub scheme: AuthScheme,
}

impl Auth {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            scheme: AuthScheme::Basic,
        }
    }

    pub fn digest(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            scheme: AuthScheme::Digest,
        }
    }

    /// `Authorization` value for the basic scheme.
    pub fn basic_header(&self) -> String {
        let credentials = format!("{}:{}", self.username, self.password);
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(credentials)
        )
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Auth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("scheme", &self.scheme)
            .finish()
    }
}

/// Options for one dispatch, or accumulated on a builder.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub allow_redirects: Option<bool>,
    pub verify: Option<bool>,
    pub headers: HeaderBag,
    pub auth: Option<Auth>,
    pub cookies: Option<CookieJar>,
    pub timeout: Option<Duration>,
    pub query: QueryMap,
    pub payload: Option<Payload>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `other` into `self`, `other` winning for scalars.
    pub fn merge(&mut self, other: RequestOptions) {
        if other.allow_redirects.is_some() {
            self.allow_redirects = other.allow_redirects;
        }
        if other.verify.is_some() {
            self.verify = other.verify;
        }
        if other.auth.is_some() {
            self.auth = other.auth;
        }
        if other.cookies.is_some() {
            self.cookies = other.cookies;
        }
        if other.timeout.is_some() {
            self.timeout = other.timeout;
        }
        if other.payload.is_some() {
            self.payload = other.payload;
        }
        self.headers.merge(other.headers);
        self.query.merge(other.query);
    }

    pub fn merged(mut self, other: RequestOptions) -> Self {
        self.merge(other);
        self
    }

    pub fn follows_redirects(&self) -> bool {
        self.allow_redirects.unwrap_or(true)
    }

    pub fn verifies_tls(&self) -> bool {
        self.verify.unwrap_or(true)
    }

    /// Effective timeout. Zero is the same as unset.
    pub fn effective_timeout(&self) -> Option<Duration> {
        self.timeout.filter(|limit| !limit.is_zero())
    }

    pub fn allow_redirects(mut self, allow: bool) -> Self {
        self.allow_redirects = Some(allow);
        self
    }

    pub fn verify(mut self, verify: bool) -> Self {
        self.verify = Some(verify);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn headers(mut self, headers: HeaderBag) -> Self {
        self.headers.merge(headers);
        self
    }

    pub fn auth(mut self, auth: Auth) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn cookies(mut self, jar: CookieJar) -> Self {
        self.cookies = Some(jar);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn query(mut self, query: QueryMap) -> Self {
        self.query.merge(query);
        self
    }

    pub fn payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let options = RequestOptions::new();
        assert!(options.follows_redirects());
        assert!(options.verifies_tls());
        assert_eq!(options.effective_timeout(), None);
    }

    #[test]
    fn test_scalars_last_writer_wins() {
        let options = RequestOptions::new()
            .allow_redirects(false)
            .timeout(Duration::from_secs(2))
            .merged(RequestOptions::new().timeout(Duration::from_secs(5)));

        assert!(!options.follows_redirects());
        assert_eq!(options.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_unset_scalars_do_not_override() {
        let options = RequestOptions::new()
            .verify(false)
            .auth(Auth::basic("a", "b"))
            .merged(RequestOptions::new());

        assert!(!options.verifies_tls());
        assert_eq!(options.auth, Some(Auth::basic("a", "b")));
    }

    #[test]
    fn test_headers_and_query_union() {
        let options = RequestOptions::new()
            .header("Accept", "text/xml")
            .query(QueryMap::parse("foo=bar"))
            .merged(
                RequestOptions::new()
                    .header("Accept", "application/json")
                    .query(QueryMap::parse("foo=baz")),
            );

        assert_eq!(
            options.headers.get_all("accept"),
            vec!["text/xml", "application/json"]
        );
        assert_eq!(options.query.get_all("foo"), vec!["bar", "baz"]);
    }

    #[test]
    fn test_payload_replaced() {
        let options = RequestOptions::new()
            .payload(Payload::Json(json!({"a": 1})))
            .merged(RequestOptions::new().payload(Payload::Json(json!({"b": 2}))));

        assert!(matches!(options.payload, Some(Payload::Json(ref v)) if v == &json!({"b": 2})));
    }

    #[test]
    fn test_zero_timeout_means_none() {
        let options = RequestOptions::new().timeout(Duration::ZERO);
        assert_eq!(options.effective_timeout(), None);
    }

    #[test]
    fn test_basic_header() {
        assert_eq!(
            Auth::basic("username", "password").basic_header(),
            "Basic dXNlcm5hbWU6cGFzc3dvcmQ="
        );
    }

    #[test]
    fn test_debug_redacts_password() {
        let debug = format!("{:?}", Auth::digest("user", "secret"));
        assert!(!debug.contains("secret"));
    }
}
