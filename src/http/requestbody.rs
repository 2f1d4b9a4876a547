//! Request payloads and their wire encoding.

use crate::http::multipart::Form;
use crate::http::query::{flatten_into, kind_of};
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;

/// How dispatch parameters are encoded into the request body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BodyFormat {
    #[default]
    Json,
    FormParams,
    Multipart,
}

impl BodyFormat {
    /// `Content-Type` used when the caller did not set one. Multipart
    /// needs the boundary, so it is taken from the form instead.
    pub fn default_content_type(&self) -> Option<&'static str> {
        match self {
            BodyFormat::Json => Some("application/json"),
            BodyFormat::FormParams => Some("application/x-www-form-urlencoded"),
            BodyFormat::Multipart => None,
        }
    }
}

/// Dispatch parameters, already shaped for one body format.
#[derive(Debug, Clone)]
pub enum Payload {
    Json(Value),
    FormParams(Vec<(String, String)>),
    Multipart(Form),
}

impl Payload {
    /// Shape `params` for `format`. `Ok(None)` means no body is sent.
    pub fn from_serialize<T: Serialize + ?Sized>(
        format: BodyFormat,
        params: &T,
    ) -> Result<Option<Self>, String> {
        let value = serde_json::to_value(params).map_err(|e| e.to_string())?;
        Self::from_value(format, value)
    }

    pub fn from_value(format: BodyFormat, value: Value) -> Result<Option<Self>, String> {
        if value.is_null() {
            return Ok(None);
        }
        match format {
            BodyFormat::Json => Ok(Some(Payload::Json(value))),
            BodyFormat::FormParams => {
                let Value::Object(map) = value else {
                    return Err(format!(
                        "form parameters must be an object, got {}",
                        kind_of(&value)
                    ));
                };
                let mut pairs = Vec::new();
                for (key, nested) in &map {
                    flatten_into(key.clone(), nested, &mut pairs);
                }
                Ok(Some(Payload::FormParams(pairs)))
            }
            BodyFormat::Multipart => Form::from_value(&value).map(|form| Some(Payload::Multipart(form))),
        }
    }

    pub fn format(&self) -> BodyFormat {
        match self {
            Payload::Json(_) => BodyFormat::Json,
            Payload::FormParams(_) => BodyFormat::FormParams,
            Payload::Multipart(_) => BodyFormat::Multipart,
        }
    }

    /// Content type implied by the payload.
    pub fn content_type(&self) -> String {
        match self {
            Payload::Multipart(form) => form.content_type(),
            other => other
                .format()
                .default_content_type()
                .unwrap_or("application/octet-stream")
                .to_string(),
        }
    }

    pub fn encode(&self) -> RequestBody {
        match self {
            Payload::Json(value) => RequestBody::Bytes(Bytes::from(value.to_string())),
            Payload::FormParams(pairs) => RequestBody::Bytes(Bytes::from(
                url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(pairs.iter())
                    .finish(),
            )),
            Payload::Multipart(form) => RequestBody::Bytes(form.to_body()),
        }
    }
}

/// Encoded request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestBody {
    /// No body (GET, HEAD, DELETE without params).
    #[default]
    Empty,
    Bytes(Bytes),
}

impl From<String> for RequestBody {
    fn from(s: String) -> Self {
        RequestBody::Bytes(Bytes::from(s))
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(v: Vec<u8>) -> Self {
        RequestBody::Bytes(Bytes::from(v))
    }
}

impl From<&str> for RequestBody {
    fn from(s: &str) -> Self {
        RequestBody::Bytes(Bytes::from(s.to_owned()))
    }
}

impl From<Bytes> for RequestBody {
    fn from(b: Bytes) -> Self {
        RequestBody::Bytes(b)
    }
}

impl RequestBody {
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        match self {
            RequestBody::Empty => 0,
            RequestBody::Bytes(b) => b.len(),
        }
    }

    pub fn to_bytes(&self) -> Bytes {
        match self {
            RequestBody::Empty => Bytes::new(),
            RequestBody::Bytes(b) => b.clone(),
        }
    }
}
