use crate::socket::tls::TlsConfig;
use boring::ssl::SslVersion;

/// Settings for [`NetworkTransport`](super::NetworkTransport).
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Sent as `User-Agent` unless the request sets one.
    pub user_agent: String,

    /// Redirect hops followed before giving up with `TooManyRedirects`.
    pub max_redirects: u32,

    /// Lowest TLS version offered.
    pub tls_min_version: Option<SslVersion>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("fluentnet/", env!("CARGO_PKG_VERSION")).to_string(),
            max_redirects: 5,
            tls_min_version: Some(SslVersion::TLS1_2),
        }
    }
}

impl TransportConfig {
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_max_redirects(mut self, max_redirects: u32) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    pub fn with_tls_min_version(mut self, version: Option<SslVersion>) -> Self {
        self.tls_min_version = version;
        self
    }

    pub(crate) fn tls(&self, verify: bool) -> TlsConfig {
        TlsConfig::default()
            .with_min_version(self.tls_min_version)
            .with_verify(verify)
    }
}
