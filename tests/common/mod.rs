//! In-process HTTP server for integration tests.
//!
//! Echo endpoints answer with a JSON document describing what they
//! received: `query`, `headers` (lowercase name → list of values),
//! `cookies`, `json`, `form_params`, `method` and `body`.

#![allow(dead_code)]

use base64::Engine;
use boring::hash::{hash, MessageDigest};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use http::request::Parts;
use http::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::{json, Map, Value};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;

pub const DIGEST_REALM: &str = "fluentnet-test";
pub const DIGEST_NONCE: &str = "dcd98b7102dd2f0e8b11d0f600bfb0c093";
pub const USERNAME: &str = "Http";
pub const PASSWORD: &str = "secret";

pub struct TestServer {
    pub addr: SocketAddr,
}

impl TestServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    continue;
                };
                tokio::spawn(async move {
                    let service = service_fn(move |req| handle(req, addr));
                    let _ = hyper::server::conn::http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });

        Self { addr }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}/{}", self.addr, path.trim_start_matches('/'))
    }
}

async fn handle(req: Request<Incoming>, addr: SocketAddr) -> Result<Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();
    let body = body
        .collect()
        .await
        .map(|collected| collected.to_bytes())
        .unwrap_or_default();
    let base = format!("http://{addr}");
    let query = query_map(parts.uri.query());

    let response = match parts.uri.path() {
        "/get" | "/post" | "/put" | "/patch" | "/delete" => {
            let status = parts
                .headers
                .get("z-status")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(200);
            json_response(status, echo(&parts, &body))
        }
        "/multi-part" => json_response(200, multipart_echo(&parts, &body)),
        "/redirect" => redirect(302, &format!("{base}/redirected")),
        "/redirected" => text_response(200, "Redirected!"),
        "/redirect-to" => {
            let status = query
                .get("status")
                .and_then(Value::as_str)
                .and_then(|s| s.parse().ok())
                .unwrap_or(302);
            let target = query.get("url").and_then(Value::as_str).unwrap_or("/get");
            redirect(status, target)
        }
        "/redirect-loop" => redirect(302, "/redirect-loop"),
        "/redirect-with-cookie" => {
            let mut response = redirect(302, "/get");
            response
                .headers_mut()
                .append("set-cookie", "hop=1; Path=/".parse().unwrap());
            response
        }
        "/simple-response" => text_response(200, "A simple string response"),
        "/basic-auth" => {
            let expected = format!(
                "Basic {}",
                base64::engine::general_purpose::STANDARD.encode(format!("{USERNAME}:{PASSWORD}"))
            );
            match header(&parts, "authorization") {
                Some(value) if value == expected => text_response(200, "authenticated"),
                _ => {
                    let mut response = text_response(401, "unauthorized");
                    response
                        .headers_mut()
                        .insert("www-authenticate", "Basic realm=\"test\"".parse().unwrap());
                    response
                }
            }
        }
        "/digest-auth" => digest_auth(&parts),
        "/digest-auth-unsupported" => {
            let mut response = text_response(401, "unauthorized");
            response.headers_mut().insert(
                "www-authenticate",
                format!("Digest realm=\"{DIGEST_REALM}\", nonce=\"{DIGEST_NONCE}\", algorithm=SHA-512-256")
                    .parse()
                    .unwrap(),
            );
            response
        }
        "/timeout" => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            text_response(200, "too late")
        }
        "/set-cookie" => cookie_response("foo=bar; Path=/"),
        "/set-another-cookie" => cookie_response("baz=qux; Path=/"),
        "/set-public-suffix-cookie" => cookie_response("evil=1; Domain=com; Path=/"),
        _ => text_response(404, "not found"),
    };

    Ok(response)
}

fn echo(parts: &Parts, body: &Bytes) -> Value {
    let content_type = header(parts, "content-type").unwrap_or_default();

    let json_body = if content_type.starts_with("application/json") {
        serde_json::from_slice(body).unwrap_or(Value::Null)
    } else {
        Value::Null
    };
    let form_params = if content_type.starts_with("application/x-www-form-urlencoded") {
        Value::Object(query_map(std::str::from_utf8(body).ok()))
    } else {
        Value::Object(Map::new())
    };

    json!({
        "method": parts.method.as_str(),
        "query": query_map(parts.uri.query()),
        "headers": header_map(parts),
        "cookies": cookie_map(parts),
        "json": json_body,
        "form_params": form_params,
        "body": String::from_utf8_lossy(body),
    })
}

fn multipart_echo(parts: &Parts, body: &Bytes) -> Value {
    let content_type = header(parts, "content-type").unwrap_or_default();
    let boundary = content_type
        .split("boundary=")
        .nth(1)
        .unwrap_or_default()
        .to_string();

    let mut fields = Map::new();
    let mut file_content = Value::Null;
    let text = String::from_utf8_lossy(body);

    for section in text.split(&format!("--{boundary}")) {
        let section = section.strip_prefix("\r\n").unwrap_or(section);
        let Some((head, content)) = section.split_once("\r\n\r\n") else {
            continue;
        };
        let content = content.strip_suffix("\r\n").unwrap_or(content);
        let name = disposition_param(head, "name").unwrap_or_default();

        if disposition_param(head, "filename").is_some() {
            file_content = Value::String(content.to_string());
        } else {
            fields.insert(name, Value::String(content.to_string()));
        }
    }

    json!({
        "headers": header_map(parts),
        "body_content": fields,
        "has_file": !file_content.is_null(),
        "file_content": file_content,
    })
}

fn disposition_param(head: &str, key: &str) -> Option<String> {
    let marker = format!("; {key}=\"");
    let start = head.find(&marker)? + marker.len();
    let end = head[start..].find('"')? + start;
    Some(head[start..end].to_string())
}

fn digest_auth(parts: &Parts) -> Response<Full<Bytes>> {
    let authorized = header(parts, "authorization")
        .and_then(|value| value.strip_prefix("Digest ").map(str::to_string))
        .map(|params| verify_digest(parts.method.as_str(), &params))
        .unwrap_or(false);

    if authorized {
        return text_response(200, "authenticated");
    }

    let mut response = text_response(401, "unauthorized");
    let challenge = format!(
        "Digest realm=\"{DIGEST_REALM}\", qop=\"auth\", nonce=\"{DIGEST_NONCE}\", opaque=\"5ccc069c403ebaf9f0171e9517f40e41\""
    );
    response
        .headers_mut()
        .insert("www-authenticate", challenge.parse().unwrap());
    response
}

fn verify_digest(method: &str, params: &str) -> bool {
    let mut fields = Map::new();
    for param in params.split(", ") {
        if let Some((key, value)) = param.split_once('=') {
            fields.insert(key.to_string(), Value::String(value.trim_matches('"').to_string()));
        }
    }
    let field = |key: &str| fields.get(key).and_then(Value::as_str).unwrap_or_default().to_string();

    if field("username") != USERNAME || field("nonce") != DIGEST_NONCE {
        return false;
    }

    let ha1 = md5_hex(&format!("{USERNAME}:{DIGEST_REALM}:{PASSWORD}"));
    let ha2 = md5_hex(&format!("{method}:{}", field("uri")));
    let expected = md5_hex(&format!(
        "{ha1}:{DIGEST_NONCE}:{}:{}:{}:{ha2}",
        field("nc"),
        field("cnonce"),
        field("qop")
    ));

    field("response") == expected
}

fn md5_hex(input: &str) -> String {
    hash(MessageDigest::md5(), input.as_bytes())
        .unwrap()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name).and_then(|v| v.to_str().ok())
}

fn query_map(query: Option<&str>) -> Map<String, Value> {
    url::form_urlencoded::parse(query.unwrap_or_default().as_bytes())
        .into_owned()
        .map(|(k, v)| (k, Value::String(v)))
        .collect()
}

fn header_map(parts: &Parts) -> Map<String, Value> {
    let mut map = Map::new();
    for name in parts.headers.keys() {
        let values = parts
            .headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(|v| Value::String(v.to_string()))
            .collect();
        map.insert(name.as_str().to_string(), Value::Array(values));
    }
    map
}

fn cookie_map(parts: &Parts) -> Map<String, Value> {
    header(parts, "cookie")
        .map(|line| {
            line.split("; ")
                .filter_map(|pair| pair.split_once('='))
                .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

fn json_response(status: u16, value: Value) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::from_u16(status).unwrap_or(StatusCode::OK))
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(value.to_string())))
        .unwrap()
}

fn text_response(status: u16, text: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("content-type", "text/plain")
        .body(Full::new(Bytes::from_static(text.as_bytes())))
        .unwrap()
}

fn redirect(status: u16, location: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("location", location)
        .body(Full::new(Bytes::new()))
        .unwrap()
}

fn cookie_response(cookie: &'static str) -> Response<Full<Bytes>> {
    let mut response = text_response(200, "cookie set");
    response
        .headers_mut()
        .insert("set-cookie", cookie.parse().unwrap());
    response
}
