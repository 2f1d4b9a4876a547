//! HTTP Digest Authentication (RFC 7616).
//!
//! Supports MD5 and SHA-256, their `-sess` variants, and `qop=auth`.
//! A challenge is answered once per dispatch; the nonce count still
//! increments so a challenge can be reused for later requests.

use crate::base::neterror::NetError;
use boring::hash::{hash, MessageDigest};
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DigestAlgorithm {
    /// Not named by the server; hashed as MD5 and omitted from the reply.
    #[default]
    Unspecified,
    Md5,
    Md5Sess,
    Sha256,
    Sha256Sess,
}

impl DigestAlgorithm {
    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "md5" => Some(Self::Md5),
            "md5-sess" => Some(Self::Md5Sess),
            "sha-256" => Some(Self::Sha256),
            "sha-256-sess" => Some(Self::Sha256Sess),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Unspecified => "",
            Self::Md5 => "MD5",
            Self::Md5Sess => "MD5-sess",
            Self::Sha256 => "SHA-256",
            Self::Sha256Sess => "SHA-256-sess",
        }
    }

    fn is_session(&self) -> bool {
        matches!(self, Self::Md5Sess | Self::Sha256Sess)
    }

    fn message_digest(&self) -> MessageDigest {
        match self {
            Self::Sha256 | Self::Sha256Sess => MessageDigest::sha256(),
            _ => MessageDigest::md5(),
        }
    }
}

/// A parsed `WWW-Authenticate: Digest ...` challenge.
#[derive(Debug, Clone)]
pub struct DigestChallenge {
    realm: String,
    nonce: String,
    opaque: Option<String>,
    algorithm: DigestAlgorithm,
    qop_auth: bool,
    stale: bool,
    userhash: bool,
    nonce_count: u32,
}

impl DigestChallenge {
    /// Find and parse the Digest challenge among `WWW-Authenticate` values.
    /// Returns `None` when the server offered no Digest scheme.
    pub fn from_www_authenticate<'a, I>(values: I) -> Option<Result<Self, NetError>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        values.into_iter().find_map(|value| {
            let value = value.trim_start();
            let (scheme, params) = value.split_once(' ').unwrap_or((value, ""));
            scheme
                .eq_ignore_ascii_case("digest")
                .then(|| Self::parse(params))
        })
    }

    /// Parse the parameter list following the `Digest` scheme token.
    pub fn parse(params: &str) -> Result<Self, NetError> {
        let mut challenge = Self {
            realm: String::new(),
            nonce: String::new(),
            opaque: None,
            algorithm: DigestAlgorithm::default(),
            qop_auth: false,
            stale: false,
            userhash: false,
            nonce_count: 0,
        };

        for param in split_params(params) {
            let (key, value) = parse_param(param)?;
            match key.to_ascii_lowercase().as_str() {
                "realm" => challenge.realm = value.to_string(),
                "nonce" => challenge.nonce = value.to_string(),
                "opaque" => challenge.opaque = Some(value.to_string()),
                "algorithm" => {
                    challenge.algorithm =
                        DigestAlgorithm::parse(value).ok_or(NetError::UnsupportedAuthScheme)?;
                }
                "qop" => {
                    challenge.qop_auth = value
                        .split(',')
                        .any(|qop| qop.trim().eq_ignore_ascii_case("auth"));
                }
                "stale" => challenge.stale = value.eq_ignore_ascii_case("true"),
                "userhash" => challenge.userhash = value.eq_ignore_ascii_case("true"),
                _ => {}
            }
        }

        if challenge.nonce.is_empty() {
            return Err(NetError::InvalidResponse);
        }

        Ok(challenge)
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Build the `Authorization` header value for one request.
    ///
    /// `uri` is the request target as sent on the wire (path and query).
    pub fn authorize(
        &mut self,
        method: &str,
        uri: &str,
        username: &str,
        password: &str,
    ) -> Result<String, NetError> {
        self.nonce_count += 1;
        let nc = format!("{:08x}", self.nonce_count);
        let cnonce = generate_cnonce()?;
        let response = self.response_digest(method, uri, username, password, &cnonce, &nc)?;
        let username = if self.userhash {
            self.hex_digest(&format!("{}:{}", username, self.realm))?
        } else {
            username.to_string()
        };
        Ok(self.credentials(&username, uri, &response, &cnonce, &nc))
    }

    fn response_digest(
        &self,
        method: &str,
        uri: &str,
        username: &str,
        password: &str,
        cnonce: &str,
        nc: &str,
    ) -> Result<String, NetError> {
        let mut ha1 = self.hex_digest(&format!("{username}:{}:{password}", self.realm))?;
        if self.algorithm.is_session() {
            ha1 = self.hex_digest(&format!("{ha1}:{}:{cnonce}", self.nonce))?;
        }
        let ha2 = self.hex_digest(&format!("{method}:{uri}"))?;

        let input = if self.qop_auth {
            format!("{ha1}:{}:{nc}:{cnonce}:auth:{ha2}", self.nonce)
        } else {
            format!("{ha1}:{}:{ha2}", self.nonce)
        };
        self.hex_digest(&input)
    }

    fn hex_digest(&self, input: &str) -> Result<String, NetError> {
        let digest = hash(self.algorithm.message_digest(), input.as_bytes())
            .map_err(|_| NetError::InvalidAuthCredentials)?;
        Ok(to_hex(&digest))
    }

    fn credentials(&self, username: &str, uri: &str, response: &str, cnonce: &str, nc: &str) -> String {
        let mut header = format!(
            "Digest username=\"{username}\", realm=\"{}\", nonce=\"{}\", uri=\"{uri}\"",
            self.realm, self.nonce
        );

        if self.algorithm != DigestAlgorithm::Unspecified {
            header.push_str(&format!(", algorithm={}", self.algorithm.as_str()));
        }
        header.push_str(&format!(", response=\"{response}\""));
        if let Some(ref opaque) = self.opaque {
            header.push_str(&format!(", opaque=\"{opaque}\""));
        }
        if self.qop_auth {
            header.push_str(&format!(", qop=auth, nc={nc}, cnonce=\"{cnonce}\""));
        }
        if self.userhash {
            header.push_str(", userhash=true");
        }

        header
    }
}

fn generate_cnonce() -> Result<String, NetError> {
    let mut bytes = [0u8; 8];
    boring::rand::rand_bytes(&mut bytes).map_err(|_| NetError::InvalidAuthCredentials)?;
    Ok(to_hex(&bytes))
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut hex, byte| {
        let _ = write!(hex, "{byte:02x}");
        hex
    })
}

/// Split on commas outside quoted strings.
fn split_params(header: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;

    for (i, c) in header.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                let part = header[start..i].trim();
                if !part.is_empty() {
                    parts.push(part);
                }
                start = i + 1;
            }
            _ => {}
        }
    }

    let part = header[start..].trim();
    if !part.is_empty() {
        parts.push(part);
    }
    parts
}

fn parse_param(param: &str) -> Result<(&str, &str), NetError> {
    let (key, value) = param.split_once('=').ok_or(NetError::InvalidResponse)?;
    let value = value.trim();
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);
    Ok((key.trim(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RFC2617: &str =
        r#"realm="testrealm@host.com", qop="auth,auth-int", nonce="dcd98b7102dd2f0e8b11d0f600bfb0c093", opaque="5ccc069c403ebaf9f0171e9517f40e41""#;

    #[test]
    fn test_parse_challenge() {
        let challenge = DigestChallenge::parse(RFC2617).unwrap();

        assert_eq!(challenge.realm(), "testrealm@host.com");
        assert_eq!(challenge.nonce, "dcd98b7102dd2f0e8b11d0f600bfb0c093");
        assert!(challenge.qop_auth);
        assert_eq!(challenge.opaque.as_deref(), Some("5ccc069c403ebaf9f0171e9517f40e41"));
    }

    #[test]
    fn test_rfc2617_response_vector() {
        let challenge = DigestChallenge::parse(RFC2617).unwrap();
        let response = challenge
            .response_digest(
                "GET",
                "/dir/index.html",
                "Mufasa",
                "Circle Of Life",
                "0a4f113b",
                "00000001",
            )
            .unwrap();

        assert_eq!(response, "6629fae49393a05397450978507c4ef1");
    }

    #[test]
    fn test_find_digest_among_schemes() {
        let values = ["Basic realm=\"x\"", "Digest realm=\"test\", nonce=\"abc\""];
        let challenge = DigestChallenge::from_www_authenticate(values)
            .unwrap()
            .unwrap();
        assert_eq!(challenge.realm(), "test");

        assert!(DigestChallenge::from_www_authenticate(["Basic realm=\"x\""]).is_none());
    }

    #[test]
    fn test_algorithms() {
        let challenge = DigestChallenge::parse(r#"nonce="abc", algorithm=SHA-256-sess"#).unwrap();
        assert_eq!(challenge.algorithm(), DigestAlgorithm::Sha256Sess);

        assert!(matches!(
            DigestChallenge::parse(r#"nonce="abc", algorithm=SHA-512"#),
            Err(NetError::UnsupportedAuthScheme)
        ));
    }

    #[test]
    fn test_stale() {
        let challenge = DigestChallenge::parse(r#"realm="test", nonce="abc", stale=true"#).unwrap();
        assert!(challenge.is_stale());
    }

    #[test]
    fn test_missing_nonce_fails() {
        assert!(DigestChallenge::parse(r#"realm="test""#).is_err());
    }

    #[test]
    fn test_authorize_header() {
        let mut challenge = DigestChallenge::parse(r#"realm="test", nonce="abc123", qop="auth""#).unwrap();

        let first = challenge.authorize("GET", "/path?x=1", "user", "pass").unwrap();
        let second = challenge.authorize("GET", "/path?x=1", "user", "pass").unwrap();

        assert!(first.starts_with("Digest username=\"user\""));
        assert!(first.contains("uri=\"/path?x=1\""));
        assert!(first.contains("qop=auth, nc=00000001, cnonce=\""));
        assert!(second.contains("nc=00000002"));
    }

    #[test]
    fn test_hex_digests() {
        let md5 = DigestChallenge::parse(r#"nonce="n", algorithm=MD5"#).unwrap();
        assert_eq!(md5.hex_digest("test").unwrap(), "098f6bcd4621d373cade4e832627b4f6");

        let sha = DigestChallenge::parse(r#"nonce="n", algorithm=SHA-256"#).unwrap();
        assert_eq!(
            sha.hex_digest("test").unwrap(),
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
        );
    }
}
