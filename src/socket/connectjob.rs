use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use crate::socket::client::SocketType;
use crate::socket::tls::TlsConfig;
use boring::ssl::{SslConnector, SslMethod};
use std::io;
use std::net::SocketAddr;
use tokio::net::TcpStream;
use url::Url;

/// DNS, then TCP, then TLS for `https` URLs.
pub struct ConnectJob;

impl ConnectJob {
    pub async fn connect(url: &Url, tls: &TlsConfig) -> Result<SocketType, NetError> {
        let secure = match url.scheme() {
            "http" => false,
            "https" => true,
            _ => return Err(NetError::UnknownUrlScheme),
        };
        let host = url.host_str().ok_or(NetError::InvalidUrl)?;
        let port = url.port_or_known_default().ok_or(NetError::InvalidUrl)?;
        let bare_host = host.trim_start_matches('[').trim_end_matches(']');

        let addrs: Vec<SocketAddr> = tokio::net::lookup_host((bare_host, port))
            .await
            .dns_context(host)?
            .collect();
        if addrs.is_empty() {
            return Err(NetError::dns_failed(
                host,
                io::Error::new(io::ErrorKind::NotFound, "no addresses returned"),
            ));
        }
        tracing::trace!(host, port, addresses = addrs.len(), "resolved");

        let stream = Self::connect_any(&addrs).await.connection_context(host, port)?;
        if let Err(e) = stream.set_nodelay(true) {
            tracing::trace!(host, port, error = %e, "set_nodelay failed");
        }

        if !secure {
            tracing::debug!(host, port, "connected");
            return Ok(SocketType::Tcp(stream));
        }

        let mut builder =
            SslConnector::builder(SslMethod::tls()).map_err(|_| NetError::SslProtocolError)?;
        tls.apply_to_builder(&mut builder)?;
        let connector = builder.build();

        let mut config = connector.configure().map_err(|_| NetError::SslProtocolError)?;
        config.set_use_server_name_indication(TlsConfig::should_set_sni(host));
        config.set_verify_hostname(tls.verify);

        let tls_stream = tokio_boring::connect(config, bare_host, stream)
            .await
            .map_err(|e| NetError::ssl_handshake_failed(host, e.to_string()))?;

        tracing::debug!(host, port, verify = tls.verify, "tls connected");
        Ok(SocketType::Ssl(tls_stream))
    }

    /// Try each address in order, returning the last error if all fail.
    async fn connect_any(addrs: &[SocketAddr]) -> io::Result<TcpStream> {
        let mut last_error = None;
        for addr in addrs {
            match TcpStream::connect(addr).await {
                Ok(stream) => return Ok(stream),
                Err(e) => {
                    tracing::trace!(%addr, error = %e, "connect attempt failed");
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no addresses")))
    }
}
