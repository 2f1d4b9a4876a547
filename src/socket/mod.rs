//! Socket and connection setup.
//!
//! - [`connectjob`]: DNS → TCP → TLS connection flow
//! - [`client`]: the connected socket type
//! - [`tls`]: TLS configuration with BoringSSL
//!
//! There is no pool. Every exchange opens a fresh connection and closes it
//! when the response body has been read.

pub mod client;
pub mod connectjob;
pub mod tls;

pub use client::SocketType;
pub use connectjob::ConnectJob;
pub use tls::TlsConfig;
