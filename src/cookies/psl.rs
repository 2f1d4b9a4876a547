//! Public Suffix List checks for cookie `Domain` attributes.
//!
//! A response from `shop.example.co.uk` may scope a cookie to
//! `example.co.uk`, but never to `co.uk`: that would hand the cookie to every
//! site under the suffix.

use psl::{List, Psl};

/// True if `domain` is itself a public suffix ("com", "co.uk", "github.io").
pub fn is_public_suffix(domain: &str) -> bool {
    let lower = domain.trim_end_matches('.').to_ascii_lowercase();
    List.suffix(lower.as_bytes())
        .is_some_and(|suffix| suffix.is_known() && suffix.as_bytes() == lower.as_bytes())
}

/// A cookie domain is acceptable when it is not a public suffix and the
/// request host equals it or is a subdomain of it. IP hosts only accept
/// their own literal.
pub fn is_valid_cookie_domain(cookie_domain: &str, url_host: &str) -> bool {
    let cookie_domain = cookie_domain.trim_start_matches('.').to_ascii_lowercase();
    let host = url_host.to_ascii_lowercase();

    if host.parse::<std::net::IpAddr>().is_ok() {
        return cookie_domain == host;
    }

    if is_public_suffix(&cookie_domain) {
        return false;
    }

    host == cookie_domain || host.ends_with(&format!(".{cookie_domain}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_suffixes() {
        assert!(is_public_suffix("com"));
        assert!(is_public_suffix("CO.UK"));
        assert!(is_public_suffix("github.io"));
    }

    #[test]
    fn test_registrable_domains_are_not_suffixes() {
        assert!(!is_public_suffix("example.com"));
        assert!(!is_public_suffix("sub.example.co.uk"));
    }

    #[test]
    fn test_cookie_domain_for_subdomain() {
        assert!(is_valid_cookie_domain("example.com", "example.com"));
        assert!(is_valid_cookie_domain(".example.com", "api.example.com"));
    }

    #[test]
    fn test_cookie_domain_rejections() {
        assert!(!is_valid_cookie_domain("co.uk", "example.co.uk"));
        assert!(!is_valid_cookie_domain("other.com", "example.com"));
        assert!(!is_valid_cookie_domain("ample.com", "example.com"));
    }

    #[test]
    fn test_ip_hosts() {
        assert!(is_valid_cookie_domain("127.0.0.1", "127.0.0.1"));
        assert!(!is_valid_cookie_domain("0.0.1", "127.0.0.1"));
    }
}
