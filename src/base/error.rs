//! Caller-facing error type.
//!
//! `NetError` is the transport vocabulary. `HttpError` is what dispatch and
//! response accessors return: it separates failures that happened before a
//! response arrived from everything else, so callers can branch on
//! `HttpError::Connection` without matching on individual codes.
//!
//! HTTP status codes are never errors. A 404 or 508 arrives as a normal
//! [`InboundResponse`](crate::http::response::InboundResponse).

use crate::base::neterror::NetError;
use thiserror::Error;

/// Errors produced by a [`PendingRequest`](crate::pending::PendingRequest).
#[derive(Debug, Error)]
pub enum HttpError {
    /// DNS, TCP connect, TLS or timeout failure before any response.
    #[error("{message}")]
    Connection {
        message: String,
        #[source]
        source: NetError,
    },

    /// The response body is not valid JSON for the requested type.
    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// The request parameters cannot be encoded in the selected body format.
    #[error("invalid request payload: {0}")]
    Payload(String),

    /// Any other transport failure (bad URL, bad header, redirect loop).
    #[error(transparent)]
    Request(NetError),
}

impl HttpError {
    /// True if no HTTP response was received.
    pub fn is_connection(&self) -> bool {
        matches!(self, HttpError::Connection { .. })
    }

    /// The underlying network error code, when there is one.
    pub fn net_error(&self) -> Option<&NetError> {
        match self {
            HttpError::Connection { source, .. } => Some(source),
            HttpError::Request(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NetError> for HttpError {
    fn from(err: NetError) -> Self {
        if err.is_connection_error() {
            HttpError::Connection {
                message: err.to_string(),
                source: err,
            }
        } else {
            HttpError::Request(err)
        }
    }
}
