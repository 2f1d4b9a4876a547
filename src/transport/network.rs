//! The default transport: one HTTP/1.1 connection per hop.

use super::{Executing, Transport, TransportConfig, TransportResponse};
use crate::base::context::with_deadline;
use crate::base::neterror::NetError;
use crate::cookies::jar::CookieJar;
use crate::http::digestauth::DigestChallenge;
use crate::http::headers::HeaderBag;
use crate::http::options::{AuthScheme, RequestOptions};
use crate::http::request::OutboundRequest;
use crate::http::requestbody::RequestBody;
use crate::http::stats::TransferStats;
use crate::socket::connectjob::ConnectJob;
use crate::socket::tls::TlsConfig;
use bytes::Bytes;
use http::header::{HeaderValue, COOKIE, HOST, LOCATION, SET_COOKIE, WWW_AUTHENTICATE};
use http::{HeaderMap, Method, StatusCode, Version};
use http_body_util::{BodyExt, Full};
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use std::time::Instant;
use tokio::task::JoinHandle;
use url::Url;

/// Sends requests over tokio sockets with hyper's HTTP/1.1 client.
///
/// Per dispatch it follows redirects, answers one digest challenge, keeps the
/// cookie jar in sync on every hop and enforces the request timeout over the
/// whole exchange.
#[derive(Debug, Clone, Default)]
pub struct NetworkTransport {
    config: TransportConfig,
}

/// One request/response exchange on the wire.
struct Hop {
    status: StatusCode,
    version: Version,
    headers: HeaderMap,
    body: Bytes,
}

/// Aborts the connection task when the exchange is done or dropped.
struct ConnectionDriver(JoinHandle<()>);

impl Drop for ConnectionDriver {
    fn drop(&mut self) {
        self.0.abort();
    }
}

impl NetworkTransport {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    async fn run(
        &self,
        request: OutboundRequest,
        options: &RequestOptions,
        jar: &CookieJar,
    ) -> Result<TransportResponse, NetError> {
        let started = Instant::now();
        let tls = self.config.tls(options.verifies_tls());
        let (mut method, mut url, mut headers, mut body) = request.into_parts();
        let digest = options
            .auth
            .as_ref()
            .filter(|auth| auth.scheme == AuthScheme::Digest);

        let mut redirect_count = 0u32;
        let mut digest_answered = false;
        let mut same_origin = true;

        loop {
            let hop = self.exchange(&method, &url, &headers, &body, &tls, jar).await?;
            for value in hop.headers.get_all(SET_COOKIE) {
                if let Ok(line) = value.to_str() {
                    jar.parse_and_save_cookie(&url, line);
                }
            }
            tracing::debug!(
                method = %method,
                url = %url,
                status = hop.status.as_u16(),
                bytes = hop.body.len(),
                "exchange complete"
            );

            if hop.status == StatusCode::UNAUTHORIZED && !digest_answered && same_origin {
                if let Some(auth) = digest {
                    let offered = hop
                        .headers
                        .get_all(WWW_AUTHENTICATE)
                        .iter()
                        .filter_map(|v| v.to_str().ok());
                    let answer = DigestChallenge::from_www_authenticate(offered).map(|challenge| {
                        let mut challenge = challenge?;
                        let token = challenge.authorize(
                            method.as_str(),
                            &request_target(&url),
                            &auth.username,
                            &auth.password,
                        )?;
                        tracing::debug!(url = %url, realm = challenge.realm(), "answering digest challenge");
                        Ok::<_, NetError>(token)
                    });
                    match answer {
                        Some(Ok(token)) => {
                            headers.set("Authorization", token);
                            digest_answered = true;
                            continue;
                        }
                        // An unanswerable challenge leaves the 401 as the response.
                        Some(Err(e)) => {
                            tracing::debug!(url = %url, error = %e, "cannot answer digest challenge");
                        }
                        None => {}
                    }
                }
            }

            if options.follows_redirects() && is_followed_redirect(hop.status) {
                if let Some(location) = hop.headers.get(LOCATION) {
                    if redirect_count >= self.config.max_redirects {
                        return Err(NetError::TooManyRedirects);
                    }
                    let location = location.to_str().map_err(|_| NetError::InvalidRedirect)?;
                    let next = url.join(location).map_err(|_| NetError::InvalidRedirect)?;
                    if !matches!(next.scheme(), "http" | "https") {
                        return Err(NetError::InvalidRedirect);
                    }

                    if next.origin() != url.origin() {
                        headers.remove("Authorization");
                        same_origin = false;
                    } else if digest_answered {
                        // The digest response is bound to the old request target.
                        headers.remove("Authorization");
                        digest_answered = false;
                    }

                    if matches!(hop.status.as_u16(), 301..=303) && method != Method::HEAD {
                        method = Method::GET;
                        body = RequestBody::Empty;
                        headers.remove("Content-Type");
                        headers.remove("Content-Length");
                    }

                    redirect_count += 1;
                    tracing::debug!(
                        from = %url,
                        to = %next,
                        status = hop.status.as_u16(),
                        redirect_count,
                        "following redirect"
                    );
                    url = next;
                    continue;
                }
            }

            let stats = TransferStats {
                method,
                effective_uri: url,
                elapsed: started.elapsed(),
                redirect_count,
                status: hop.status.as_u16(),
            };
            return Ok(TransportResponse {
                status: hop.status,
                version: hop.version,
                headers: hop.headers,
                body: hop.body,
                stats,
            });
        }
    }

    async fn exchange(
        &self,
        method: &Method,
        url: &Url,
        headers: &HeaderBag,
        body: &RequestBody,
        tls: &TlsConfig,
        jar: &CookieJar,
    ) -> Result<Hop, NetError> {
        let socket = ConnectJob::connect(url, tls).await?;
        let (mut sender, conn) = http1::handshake::<_, Full<Bytes>>(TokioIo::new(socket))
            .await
            .map_err(NetError::from)?;
        let _driver = ConnectionDriver(tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::trace!(error = %e, "connection closed with error");
            }
        }));

        let mut header_map = headers.to_header_map()?;
        if !header_map.contains_key(HOST) {
            header_map.insert(HOST, host_header(url)?);
        }
        if let Some(cookie) = jar.cookie_header_for_url(url) {
            let value = HeaderValue::from_str(&cookie).map_err(|_| NetError::InvalidHeader)?;
            header_map.insert(COOKIE, value);
        }

        let mut request = http::Request::builder()
            .method(method.clone())
            .uri(request_target(url))
            .body(Full::new(body.to_bytes()))
            .map_err(|_| NetError::InvalidUrl)?;
        *request.headers_mut() = header_map;

        let response = sender.send_request(request).await.map_err(NetError::from)?;
        let (parts, incoming) = response.into_parts();
        let body = incoming
            .collect()
            .await
            .map_err(|_| NetError::HttpBodyError)?
            .to_bytes();

        Ok(Hop {
            status: parts.status,
            version: parts.version,
            headers: parts.headers,
            body,
        })
    }
}

impl Transport for NetworkTransport {
    fn default_headers(&self) -> HeaderBag {
        [("User-Agent", self.config.user_agent.as_str())]
            .into_iter()
            .collect()
    }

    fn execute<'a>(
        &'a self,
        request: OutboundRequest,
        options: &'a RequestOptions,
        jar: &'a CookieJar,
    ) -> Executing<'a> {
        Box::pin(with_deadline(
            options.effective_timeout(),
            self.run(request, options, jar),
        ))
    }
}

fn is_followed_redirect(status: StatusCode) -> bool {
    matches!(status.as_u16(), 301 | 302 | 303 | 307 | 308)
}

/// Origin-form request target: path plus query.
fn request_target(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

fn host_header(url: &Url) -> Result<HeaderValue, NetError> {
    let host = url.host_str().ok_or(NetError::InvalidUrl)?;
    let value = match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };
    HeaderValue::from_str(&value).map_err(|_| NetError::InvalidUrl)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_target() {
        let url = Url::parse("http://localhost:8080/get?foo=bar").unwrap();
        assert_eq!(request_target(&url), "/get?foo=bar");

        let url = Url::parse("http://localhost").unwrap();
        assert_eq!(request_target(&url), "/");
    }

    #[test]
    fn test_host_header() {
        let url = Url::parse("http://localhost:8080/").unwrap();
        assert_eq!(host_header(&url).unwrap(), "localhost:8080");

        let url = Url::parse("https://example.com:443/").unwrap();
        assert_eq!(host_header(&url).unwrap(), "example.com");
    }

    #[test]
    fn test_followed_redirects() {
        assert!(is_followed_redirect(StatusCode::FOUND));
        assert!(is_followed_redirect(StatusCode::PERMANENT_REDIRECT));
        assert!(!is_followed_redirect(StatusCode::NOT_MODIFIED));
        assert!(!is_followed_redirect(StatusCode::MULTIPLE_CHOICES));
    }

    #[test]
    fn test_default_user_agent() {
        let transport = NetworkTransport::default();
        assert!(transport
            .default_headers()
            .get("user-agent")
            .is_some_and(|ua| ua.starts_with("fluentnet/")));
    }
}
