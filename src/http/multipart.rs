//! `multipart/form-data` encoding (RFC 7578).
//!
//! ```
//! use fluentnet::http::multipart::{Form, Part};
//!
//! let form = Form::new()
//!     .text("username", "user123")
//!     .part("file", Part::bytes(b"file content".as_slice()).file_name("doc.txt"));
//!
//! assert!(form.content_type().starts_with("multipart/form-data; boundary="));
//! ```
//!
//! Forms can also be built from serializable parameters, see
//! [`Form::from_value`].

use crate::http::query::{kind_of, scalar_to_string};
use bytes::Bytes;
use serde_json::Value;
use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};

/// A multipart form. Cheap to clone: part data is reference counted.
#[derive(Debug, Clone)]
pub struct Form {
    boundary: String,
    fields: Vec<(Cow<'static, str>, Part)>,
}

impl Default for Form {
    fn default() -> Self {
        Self::new()
    }
}

impl Form {
    pub fn new() -> Self {
        Self {
            boundary: generate_boundary(),
            fields: Vec::new(),
        }
    }

    /// Build a form from parameters.
    ///
    /// Two shapes are accepted:
    /// - an array of part objects `{"name", "contents", "filename"?, "headers"?}`
    /// - an object whose entries become text parts
    pub fn from_value(value: &Value) -> Result<Self, String> {
        let mut form = Form::new();
        match value {
            Value::Array(parts) => {
                for (index, element) in parts.iter().enumerate() {
                    let (name, part) = part_from_element(element)
                        .map_err(|e| format!("multipart element {index}: {e}"))?;
                    form = form.part(name, part);
                }
            }
            Value::Object(map) => {
                for (name, contents) in map {
                    if contents.is_null() {
                        continue;
                    }
                    form = form.text(name.clone(), scalar_or_json(contents));
                }
            }
            other => {
                return Err(format!(
                    "multipart parameters must be an array or object, got {}",
                    kind_of(other)
                ))
            }
        }
        Ok(form)
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Add a text field.
    pub fn text<N, V>(self, name: N, value: V) -> Self
    where
        N: Into<Cow<'static, str>>,
        V: Into<Cow<'static, str>>,
    {
        self.part(name, Part::text(value))
    }

    pub fn part<N>(mut self, name: N, part: Part) -> Self
    where
        N: Into<Cow<'static, str>>,
    {
        self.fields.push((name.into(), part));
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Value for the `Content-Type` request header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Total encoded length, equal to `self.to_body().len()`.
    pub fn content_length(&self) -> usize {
        let mut length = 0usize;
        for (name, part) in &self.fields {
            // --boundary\r\n headers \r\n\r\n data \r\n
            length += 2 + self.boundary.len() + 2;
            length += part.format_headers(name).len() + 4;
            length += part.data.len() + 2;
        }
        // --boundary--\r\n
        length + 2 + self.boundary.len() + 4
    }

    /// Encode the form. An empty form still carries the closing delimiter.
    pub fn to_body(&self) -> Bytes {
        let mut output = Vec::with_capacity(self.content_length());

        for (name, part) in &self.fields {
            output.extend_from_slice(b"--");
            output.extend_from_slice(self.boundary.as_bytes());
            output.extend_from_slice(b"\r\n");

            output.extend_from_slice(part.format_headers(name).as_bytes());
            output.extend_from_slice(b"\r\n\r\n");

            output.extend_from_slice(&part.data);
            output.extend_from_slice(b"\r\n");
        }

        output.extend_from_slice(b"--");
        output.extend_from_slice(self.boundary.as_bytes());
        output.extend_from_slice(b"--\r\n");

        Bytes::from(output)
    }
}

/// One part of a multipart form.
#[derive(Debug, Clone)]
pub struct Part {
    data: Bytes,
    content_type: Option<String>,
    file_name: Option<Cow<'static, str>>,
    headers: Vec<(String, String)>,
}

impl Part {
    /// A plain text part. No `Content-Type` is sent for it.
    pub fn text<V>(value: V) -> Self
    where
        V: Into<Cow<'static, str>>,
    {
        Self::bytes(value.into().into_owned())
    }

    pub fn bytes<B>(data: B) -> Self
    where
        B: Into<Bytes>,
    {
        Self {
            data: data.into(),
            content_type: None,
            file_name: None,
            headers: Vec::new(),
        }
    }

    pub fn content_type<S: Into<String>>(mut self, mime: S) -> Self {
        self.content_type = Some(mime.into());
        self
    }

    /// Set the file name. A `Content-Type` is guessed from the extension
    /// unless one was already set.
    pub fn file_name<S>(mut self, name: S) -> Self
    where
        S: Into<Cow<'static, str>>,
    {
        let name = name.into();
        if self.content_type.is_none() {
            self.content_type = Some(mime_from_file_name(&name).to_string());
        }
        self.file_name = Some(name);
        self
    }

    /// Add an extra part header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        if name.eq_ignore_ascii_case("content-type") {
            self.content_type = Some(value.into());
        } else {
            self.headers.push((name, value.into()));
        }
        self
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn format_headers(&self, name: &str) -> String {
        let mut header = format!(
            "Content-Disposition: form-data; name=\"{}\"",
            escape_quotes(name)
        );

        if let Some(ref filename) = self.file_name {
            header.push_str(&format!("; filename=\"{}\"", escape_quotes(filename)));
        }

        for (key, value) in &self.headers {
            header.push_str(&format!("\r\n{key}: {value}"));
        }

        if let Some(ref mime) = self.content_type {
            header.push_str(&format!("\r\nContent-Type: {mime}"));
        }

        header
    }
}

fn part_from_element(element: &Value) -> Result<(String, Part), String> {
    let Value::Object(map) = element else {
        return Err(format!("expected an object, got {}", kind_of(element)));
    };

    let name = match map.get("name") {
        Some(Value::String(name)) => name.clone(),
        Some(other) if !other.is_null() => scalar_to_string(other),
        _ => return Err("missing required key \"name\"".to_string()),
    };
    let contents = map
        .get("contents")
        .ok_or_else(|| "missing required key \"contents\"".to_string())?;

    let mut part = Part::text(scalar_or_json(contents));

    if let Some(Value::Object(headers)) = map.get("headers") {
        for (key, value) in headers {
            part = part.header(key.clone(), scalar_to_string(value));
        }
    }
    if let Some(Value::String(filename)) = map.get("filename") {
        part = part.file_name(filename.clone());
    }

    Ok((name, part))
}

fn scalar_or_json(value: &Value) -> String {
    match value {
        Value::Array(_) | Value::Object(_) => value.to_string(),
        scalar => scalar_to_string(scalar),
    }
}

fn mime_from_file_name(name: &str) -> &'static str {
    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        "csv" => "text/csv",
        "json" => "application/json",
        "xml" => "application/xml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

fn escape_quotes(s: &str) -> Cow<'_, str> {
    if s.contains('"') || s.contains('\\') || s.contains('\r') || s.contains('\n') {
        Cow::Owned(
            s.replace('\\', "\\\\")
                .replace('"', "\\\"")
                .replace('\r', "\\r")
                .replace('\n', "\\n"),
        )
    } else {
        Cow::Borrowed(s)
    }
}

fn generate_boundary() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64;
    let sequence = COUNTER.fetch_add(1, Ordering::Relaxed);

    format!(
        "----fluentnet-boundary-{:016x}{:08x}{:04x}",
        nanos,
        std::process::id(),
        sequence & 0xffff
    )
}
