use crate::base::neterror::NetError;
use boring::ssl::{SslConnectorBuilder, SslVerifyMode, SslVersion};

/// Client TLS settings for one connection.
#[derive(Debug, Clone)]
pub struct TlsConfig {
    /// Verify the peer certificate chain and hostname.
    pub verify: bool,
    pub min_version: Option<SslVersion>,
    pub max_version: Option<SslVersion>,
    pub alpn_protos: Vec<String>,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            verify: true,
            min_version: Some(SslVersion::TLS1_2),
            max_version: Some(SslVersion::TLS1_3),
            // Only HTTP/1.1 is spoken on the wire.
            alpn_protos: vec!["http/1.1".to_string()],
        }
    }
}

impl TlsConfig {
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn with_min_version(mut self, version: Option<SslVersion>) -> Self {
        self.min_version = version;
        self
    }

    pub fn apply_to_builder(&self, builder: &mut SslConnectorBuilder) -> Result<(), NetError> {
        if let Some(min) = self.min_version {
            builder.set_min_proto_version(Some(min)).map_err(|_| NetError::SslProtocolError)?;
        }
        if let Some(max) = self.max_version {
            builder.set_max_proto_version(Some(max)).map_err(|_| NetError::SslProtocolError)?;
        }

        let alpn_wire = self.alpn_wire()?;
        if !alpn_wire.is_empty() {
            builder.set_alpn_protos(&alpn_wire).map_err(|_| NetError::SslProtocolError)?;
        }

        if self.verify {
            builder.set_verify(SslVerifyMode::PEER);
        } else {
            builder.set_verify(SslVerifyMode::NONE);
        }

        Ok(())
    }

    /// Length-prefixed ALPN list.
    fn alpn_wire(&self) -> Result<Vec<u8>, NetError> {
        let mut wire = Vec::new();
        for proto in &self.alpn_protos {
            let len = u8::try_from(proto.len()).map_err(|_| NetError::SslProtocolError)?;
            wire.push(len);
            wire.extend_from_slice(proto.as_bytes());
        }
        Ok(wire)
    }

    /// SNI must not be sent for IP literals (RFC 6066).
    pub fn should_set_sni(host: &str) -> bool {
        host.trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<std::net::IpAddr>()
            .is_err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_verifies() {
        let config = TlsConfig::default();
        assert!(config.verify);
        assert_eq!(config.alpn_wire().unwrap(), b"\x08http/1.1");
    }

    #[test]
    fn test_sni_for_hostnames_only() {
        assert!(TlsConfig::should_set_sni("example.com"));
        assert!(!TlsConfig::should_set_sni("127.0.0.1"));
        assert!(!TlsConfig::should_set_sni("[::1]"));
    }

    #[test]
    fn test_oversized_alpn_rejected() {
        let config = TlsConfig {
            alpn_protos: vec!["x".repeat(300)],
            ..TlsConfig::default()
        };
        assert!(config.alpn_wire().is_err());
    }
}
