//! Ergonomic error context helpers.
//!
//! Extension traits for attaching host/port context to I/O results and for
//! bounding futures with a deadline, converting both into `NetError`.

use crate::base::neterror::NetError;
use std::future::Future;
use std::io;
use std::time::Duration;

/// Extension trait for adding context to IO Results.
pub trait IoResultExt<T> {
    /// Add connection context to an IO error.
    ///
    /// # Example
    /// ```ignore
    /// use fluentnet::base::context::IoResultExt;
    ///
    /// let stream = TcpStream::connect(addr).await
    ///     .connection_context("example.com", 443)?;
    /// // Error: "Connection to example.com:443 failed: connection refused"
    /// ```
    fn connection_context(self, host: &str, port: u16) -> Result<T, NetError>;

    /// Add DNS resolution context to an IO error.
    fn dns_context(self, domain: &str) -> Result<T, NetError>;
}

impl<T> IoResultExt<T> for Result<T, io::Error> {
    fn connection_context(self, host: &str, port: u16) -> Result<T, NetError> {
        self.map_err(|e| NetError::connection_failed_to(host, port, e))
    }

    fn dns_context(self, domain: &str) -> Result<T, NetError> {
        self.map_err(|e| NetError::dns_failed(domain, e))
    }
}

/// Run `fut` under an optional deadline.
///
/// `None` and a zero duration both mean "wait indefinitely". When the
/// deadline fires the future is dropped, which tears down whatever socket it
/// owned.
pub async fn with_deadline<F, T>(limit: Option<Duration>, fut: F) -> Result<T, NetError>
where
    F: Future<Output = Result<T, NetError>>,
{
    match limit {
        Some(limit) if !limit.is_zero() => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| NetError::TimedOutAfter(limit))?,
        _ => fut.await,
    }
}
