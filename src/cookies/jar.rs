use crate::cookies::canonicalcookie::{CanonicalCookie, SameSite};
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use time::{OffsetDateTime, PrimitiveDateTime};
use url::Url;

/// Maximum cookies per domain (Chromium default).
const MAX_COOKIES_PER_DOMAIN: usize = 50;

/// Maximum total cookies.
/// Chromium uses 3300, but we use a slightly lower limit to keep memory usage predictable.
const MAX_COOKIES_TOTAL: usize = 3000;

/// A shareable cookie jar.
///
/// Cloning a `CookieJar` yields another handle onto the same storage, so a
/// jar captured from one response and handed to a later request keeps
/// accumulating cookies from both. Use [`CookieJar::snapshot`] for an
/// independent copy.
#[derive(Clone)]
pub struct CookieJar {
    // Store: Map<Domain, List<Cookie>>
    store: Arc<DashMap<String, Vec<CanonicalCookie>>>,
}

impl Default for CookieJar {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CookieJar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieJar")
            .field("domains", &self.store.len())
            .field("cookies", &self.total_cookie_count())
            .finish()
    }
}

impl CookieJar {
    pub fn new() -> Self {
        Self {
            store: Arc::new(DashMap::new()),
        }
    }

    /// True if both handles point at the same storage.
    pub fn same_jar(&self, other: &CookieJar) -> bool {
        Arc::ptr_eq(&self.store, &other.store)
    }

    /// Deep copy into a new, unshared jar.
    pub fn snapshot(&self) -> CookieJar {
        let copy = CookieJar::new();
        for cookie in self.cookies() {
            copy.set_canonical_cookie(cookie);
        }
        copy
    }

    pub fn set_canonical_cookie(&self, cookie: CanonicalCookie) {
        let mut entry = self.store.entry(cookie.domain.clone()).or_default();

        // Remove existing if name/path match
        entry.retain(|c| c.name != cookie.name || c.path != cookie.path);

        // Enforce per-domain limit with LRU eviction
        while entry.len() >= MAX_COOKIES_PER_DOMAIN {
            let Some(oldest_idx) = entry
                .iter()
                .enumerate()
                .min_by_key(|(_, c)| c.last_access_time)
                .map(|(i, _)| i)
            else {
                break;
            };
            entry.remove(oldest_idx);
        }

        entry.push(cookie);
        drop(entry); // Release lock before checking global count

        self.enforce_global_limit();
    }

    /// Remove a cookie by name/domain/path. Returns true if one was removed.
    pub fn delete_cookie(&self, name: &str, domain: &str, path: &str) -> bool {
        let Some(mut entry) = self.store.get_mut(domain) else {
            return false;
        };
        let before = entry.len();
        entry.retain(|c| c.name != name || c.path != path);
        before != entry.len()
    }

    /// Enforce the global cookie limit by evicting oldest cookies.
    fn enforce_global_limit(&self) {
        while self.total_cookie_count() > MAX_COOKIES_TOTAL {
            let mut oldest: Option<(String, usize, OffsetDateTime)> = None;

            for entry in self.store.iter() {
                for (idx, cookie) in entry.value().iter().enumerate() {
                    let older = oldest
                        .as_ref()
                        .map_or(true, |(_, _, t)| cookie.last_access_time < *t);
                    if older {
                        oldest = Some((entry.key().clone(), idx, cookie.last_access_time));
                    }
                }
            }

            let Some((domain, idx, _)) = oldest else {
                break;
            };
            if let Some(mut entry) = self.store.get_mut(&domain) {
                if idx < entry.len() {
                    entry.remove(idx);
                }
            }
        }
    }

    /// Get cookies matching the URL with proper domain suffix matching.
    /// Sorted by path length (longest first), then creation time.
    pub fn get_cookies_for_url(&self, url: &Url) -> Vec<CanonicalCookie> {
        let mut result = Vec::new();
        let host = url.host_str().unwrap_or("").to_lowercase();
        let now = OffsetDateTime::now_utc();

        for domain in Self::get_matching_domains(&host) {
            let Some(mut entry) = self.store.get_mut(&domain) else {
                continue;
            };
            entry.retain(|c| !c.is_expired(now));

            for cookie in entry.iter_mut() {
                if !Self::domain_matches(&cookie.domain, &host, cookie.host_only)
                    || !Self::path_matches(&cookie.path, url.path())
                    || (cookie.secure && url.scheme() != "https")
                {
                    continue;
                }

                cookie.last_access_time = now;
                result.push(cookie.clone());
            }
        }

        result.sort_by(|a, b| {
            b.path
                .len()
                .cmp(&a.path.len())
                .then_with(|| a.creation_time.cmp(&b.creation_time))
        });

        result
    }

    /// Value for the `Cookie` request header, or `None` when nothing matches.
    pub fn cookie_header_for_url(&self, url: &Url) -> Option<String> {
        let cookies = self.get_cookies_for_url(url);
        if cookies.is_empty() {
            return None;
        }
        Some(
            cookies
                .iter()
                .map(CanonicalCookie::to_pair)
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Check if cookie domain matches request host.
    /// Implements RFC 6265 domain matching.
    fn domain_matches(cookie_domain: &str, request_host: &str, host_only: bool) -> bool {
        if host_only {
            return cookie_domain.eq_ignore_ascii_case(request_host);
        }

        let cookie_domain = cookie_domain.trim_start_matches('.');
        if request_host.eq_ignore_ascii_case(cookie_domain) {
            return true;
        }

        request_host.len() > cookie_domain.len()
            && request_host
                .to_ascii_lowercase()
                .ends_with(&format!(".{}", cookie_domain.to_ascii_lowercase()))
    }

    /// Check if request path matches cookie path.
    /// Implements RFC 6265 path matching.
    fn path_matches(cookie_path: &str, request_path: &str) -> bool {
        if request_path == cookie_path {
            return true;
        }

        if let Some(rest) = request_path.strip_prefix(cookie_path) {
            return cookie_path.ends_with('/') || rest.starts_with('/');
        }

        false
    }

    /// RFC 6265 section 5.1.4 default-path.
    fn default_path(request_path: &str) -> String {
        match request_path.rfind('/') {
            Some(0) | None => "/".to_string(),
            Some(idx) => request_path[..idx].to_string(),
        }
    }

    /// Returns the host itself and all parent domains.
    /// IP literals have no parents.
    fn get_matching_domains(host: &str) -> Vec<String> {
        let mut domains = vec![host.to_string()];
        if host.parse::<std::net::IpAddr>().is_ok() || host.starts_with('[') {
            return domains;
        }

        // "foo.bar.example.com" also checks "bar.example.com", "example.com"
        let parts: Vec<&str> = host.split('.').collect();
        for i in 1..parts.len().saturating_sub(1) {
            domains.push(parts[i..].join("."));
        }

        domains
    }

    /// Parse a `Set-Cookie` header received from `url` and store the result.
    ///
    /// Returns false if the line was rejected: unparseable, a public-suffix
    /// or foreign `Domain`, or an invalid `__Secure-`/`__Host-` prefix.
    /// A cookie that is already expired deletes any stored match instead.
    pub fn parse_and_save_cookie(&self, url: &Url, cookie_line: &str) -> bool {
        use cookie::Cookie;

        let Ok(parsed) = Cookie::parse(cookie_line) else {
            tracing::debug!(line = %cookie_line, "failed to parse Set-Cookie");
            return false;
        };

        let now = OffsetDateTime::now_utc();
        let host = url.host_str().unwrap_or("").to_lowercase();

        let (domain, host_only) = match parsed.domain() {
            Some(d) if !d.is_empty() => {
                let d = d.trim_start_matches('.').to_lowercase();
                // PSL validation: reject cookies set on public suffixes
                if !crate::cookies::psl::is_valid_cookie_domain(&d, &host) {
                    tracing::debug!(domain = %d, host = %host, "rejected cookie domain");
                    return false;
                }
                (d, false)
            }
            _ => (host, true),
        };

        let path = match parsed.path() {
            Some(p) if p.starts_with('/') => p.to_string(),
            _ => Self::default_path(url.path()),
        };

        // Max-Age takes precedence over Expires
        let expiration_time = match parsed.max_age() {
            Some(age) => Some(
                now.checked_add(age)
                    .unwrap_or_else(|| PrimitiveDateTime::MAX.assume_utc()),
            ),
            None => parsed.expires().and_then(|e| e.datetime()),
        };

        let same_site = match parsed.same_site() {
            Some(cookie::SameSite::Lax) => SameSite::Lax,
            Some(cookie::SameSite::Strict) => SameSite::Strict,
            Some(cookie::SameSite::None) => SameSite::NoRestriction,
            None => SameSite::Unspecified,
        };

        let c = CanonicalCookie {
            name: parsed.name().to_string(),
            value: parsed.value().to_string(),
            domain,
            path,
            creation_time: now,
            expiration_time,
            last_access_time: now,
            secure: parsed.secure().unwrap_or(false),
            http_only: parsed.http_only().unwrap_or(false),
            host_only,
            same_site,
        };

        if !c.has_valid_prefix(url.scheme() == "https") {
            return false;
        }

        if c.is_expired(now) {
            self.delete_cookie(&c.name, &c.domain, &c.path);
            return true;
        }

        self.set_canonical_cookie(c);
        true
    }

    /// Get total cookie count.
    pub fn total_cookie_count(&self) -> usize {
        self.store.iter().map(|e| e.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_cookie_count() == 0
    }

    /// Clear all cookies.
    pub fn clear(&self) {
        self.store.clear();
    }

    /// Copy of every stored cookie.
    pub fn cookies(&self) -> Vec<CanonicalCookie> {
        self.store
            .iter()
            .flat_map(|entry| entry.value().clone())
            .collect()
    }

    /// First stored cookie with the given name, on any domain.
    pub fn get(&self, name: &str) -> Option<CanonicalCookie> {
        self.store
            .iter()
            .find_map(|entry| entry.value().iter().find(|c| c.name == name).cloned())
    }

    /// Export cookies to Netscape cookie format.
    ///
    /// The Netscape format is widely used by curl, wget, and other tools.
    /// Each line has the format:
    /// `domain\tinclude_subdomains\tpath\tsecure\texpiry\tname\tvalue`
    pub fn export_netscape(&self, domain_filter: Option<&str>) -> String {
        let mut lines = vec![
            "# Netscape HTTP Cookie File".to_string(),
            "# https://curl.se/docs/http-cookies.html".to_string(),
            "# This file was generated by fluentnet".to_string(),
            String::new(),
        ];

        for cookie in self.cookies() {
            if let Some(filter) = domain_filter {
                if !cookie.domain.contains(filter) && !filter.contains(&cookie.domain) {
                    continue;
                }
            }

            let include_subdomains = if cookie.host_only { "FALSE" } else { "TRUE" };
            let secure = if cookie.secure { "TRUE" } else { "FALSE" };
            let expiry = cookie
                .expiration_time
                .map(|t| t.unix_timestamp())
                .unwrap_or(0);

            // Domain should start with . for non-host-only cookies
            let domain = if !cookie.host_only && !cookie.domain.starts_with('.') {
                format!(".{}", cookie.domain)
            } else {
                cookie.domain.clone()
            };

            lines.push(format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                domain, include_subdomains, cookie.path, secure, expiry, cookie.name, cookie.value
            ));
        }

        lines.join("\n")
    }

    /// Import cookies from Netscape format file content.
    /// Returns the number of cookies imported.
    pub fn import_netscape(&self, content: &str) -> usize {
        let mut count = 0;
        let now = OffsetDateTime::now_utc();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parts: Vec<&str> = line.split('\t').collect();
            if parts.len() < 7 {
                continue;
            }

            let expiry: i64 = parts[4].parse().unwrap_or(0);
            let expiration_time = if expiry > 0 {
                OffsetDateTime::from_unix_timestamp(expiry).ok()
            } else {
                None
            };

            let cookie = CanonicalCookie {
                name: parts[5].to_string(),
                value: parts[6].to_string(),
                domain: parts[0].trim_start_matches('.').to_string(),
                path: parts[2].to_string(),
                creation_time: now,
                expiration_time,
                last_access_time: now,
                secure: parts[3].eq_ignore_ascii_case("TRUE"),
                http_only: false, // Netscape format doesn't include httpOnly
                host_only: parts[1].eq_ignore_ascii_case("FALSE"),
                same_site: SameSite::Lax,
            };

            self.set_canonical_cookie(cookie);
            count += 1;
        }

        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_cookie(name: &str, domain: &str) -> CanonicalCookie {
        CanonicalCookie {
            name: name.to_string(),
            value: "test_value".to_string(),
            domain: domain.to_string(),
            path: "/".to_string(),
            creation_time: OffsetDateTime::now_utc(),
            expiration_time: Some(OffsetDateTime::now_utc() + time::Duration::days(30)),
            last_access_time: OffsetDateTime::now_utc(),
            secure: true,
            http_only: false,
            host_only: false,
            same_site: SameSite::Lax,
        }
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_clones_share_storage() {
        let jar = CookieJar::new();
        let handle = jar.clone();
        handle.parse_and_save_cookie(&url("http://localhost/set"), "foo=bar");

        assert!(jar.same_jar(&handle));
        assert_eq!(jar.total_cookie_count(), 1);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let jar = CookieJar::new();
        jar.parse_and_save_cookie(&url("http://localhost/"), "foo=bar");
        let copy = jar.snapshot();
        jar.clear();

        assert!(!copy.same_jar(&jar));
        assert_eq!(copy.total_cookie_count(), 1);
    }

    #[test]
    fn test_host_only_cookie_on_ip() {
        let jar = CookieJar::new();
        let u = url("http://127.0.0.1:8080/set-cookie");
        assert!(jar.parse_and_save_cookie(&u, "foo=bar"));

        let header = jar.cookie_header_for_url(&url("http://127.0.0.1:8080/get"));
        assert_eq!(header.as_deref(), Some("foo=bar"));
        assert!(jar
            .cookie_header_for_url(&url("http://127.0.0.2:8080/get"))
            .is_none());
    }

    #[test]
    fn test_domain_cookie_matches_subdomain() {
        let jar = CookieJar::new();
        jar.parse_and_save_cookie(&url("https://www.example.com/"), "a=1; Domain=example.com");

        assert_eq!(jar.get_cookies_for_url(&url("https://api.example.com/")).len(), 1);
        assert!(jar.get_cookies_for_url(&url("https://example.org/")).is_empty());
    }

    #[test]
    fn test_public_suffix_domain_rejected() {
        let jar = CookieJar::new();
        assert!(!jar.parse_and_save_cookie(&url("https://example.co.uk/"), "evil=1; Domain=co.uk"));
        assert!(jar.is_empty());
    }

    #[test]
    fn test_secure_cookie_not_sent_over_http() {
        let jar = CookieJar::new();
        jar.parse_and_save_cookie(&url("https://example.com/"), "s=1; Secure");

        assert!(jar.get_cookies_for_url(&url("http://example.com/")).is_empty());
        assert_eq!(jar.get_cookies_for_url(&url("https://example.com/")).len(), 1);
    }

    #[test]
    fn test_default_path_and_path_matching() {
        let jar = CookieJar::new();
        jar.parse_and_save_cookie(&url("http://example.com/account/login"), "sid=1");

        assert!(jar.get_cookies_for_url(&url("http://example.com/")).is_empty());
        assert_eq!(
            jar.get_cookies_for_url(&url("http://example.com/account/settings")).len(),
            1
        );
        assert!(jar.get_cookies_for_url(&url("http://example.com/accounting")).is_empty());
    }

    #[test]
    fn test_max_age_zero_deletes() {
        let jar = CookieJar::new();
        let u = url("http://example.com/");
        jar.parse_and_save_cookie(&u, "foo=bar");
        jar.parse_and_save_cookie(&u, "foo=gone; Max-Age=0");

        assert!(jar.is_empty());
    }

    #[test]
    fn test_huge_max_age_saturates() {
        let jar = CookieJar::new();
        let u = url("http://example.com/");

        assert!(jar.parse_and_save_cookie(&u, "a=b; Max-Age=999999999999"));

        let cookie = jar.get("a").unwrap();
        assert_eq!(
            cookie.expiration_time,
            Some(PrimitiveDateTime::MAX.assume_utc())
        );
        assert_eq!(jar.cookie_header_for_url(&u).as_deref(), Some("a=b"));
    }

    #[test]
    fn test_replaces_same_name_and_path() {
        let jar = CookieJar::new();
        let u = url("http://example.com/");
        jar.parse_and_save_cookie(&u, "foo=one");
        jar.parse_and_save_cookie(&u, "foo=two");

        assert_eq!(jar.total_cookie_count(), 1);
        assert_eq!(jar.get("foo").unwrap().value, "two");
    }

    #[test]
    fn test_longer_path_sorted_first() {
        let jar = CookieJar::new();
        let u = url("http://example.com/a/b");
        jar.parse_and_save_cookie(&u, "root=1; Path=/");
        jar.parse_and_save_cookie(&u, "deep=2; Path=/a");

        let header = jar.cookie_header_for_url(&u).unwrap();
        assert_eq!(header, "deep=2; root=1");
    }

    #[test]
    fn test_per_domain_limit() {
        let jar = CookieJar::new();
        for i in 0..(MAX_COOKIES_PER_DOMAIN + 5) {
            jar.set_canonical_cookie(make_test_cookie(&format!("c{i}"), "example.com"));
        }
        assert_eq!(jar.total_cookie_count(), MAX_COOKIES_PER_DOMAIN);
    }

    #[test]
    fn test_export_netscape_basic() {
        let jar = CookieJar::new();
        jar.set_canonical_cookie(make_test_cookie("session", "example.com"));

        let netscape = jar.export_netscape(None);
        assert!(netscape.contains("# Netscape HTTP Cookie File"));
        assert!(netscape.contains(".example.com\tTRUE\t/\tTRUE"));
        assert!(netscape.contains("session"));
    }

    #[test]
    fn test_import_netscape_basic() {
        let content = "# Netscape HTTP Cookie File\n\
.example.com\tTRUE\t/\tTRUE\t4102444800\tsession\tabc123\n\
.test.com\tFALSE\t/path\tFALSE\t0\tuser\tjohn\n";

        let jar = CookieJar::new();
        let count = jar.import_netscape(content);

        assert_eq!(count, 2);
        assert_eq!(jar.total_cookie_count(), 2);
        assert!(jar.get("user").unwrap().is_session());
    }

    #[test]
    fn test_export_netscape_with_filter() {
        let jar = CookieJar::new();
        jar.set_canonical_cookie(make_test_cookie("a", "example.com"));
        jar.set_canonical_cookie(make_test_cookie("b", "other.com"));

        let filtered = jar.export_netscape(Some("example"));

        assert!(filtered.contains("example.com"));
        assert!(!filtered.contains("other.com"));
    }

    #[test]
    fn test_import_netscape_skips_comments() {
        let content = "# This is a comment\n# Another comment\n\n\
.example.com\tTRUE\t/\tTRUE\t0\ttest\tvalue\n# More comments\n";

        let jar = CookieJar::new();
        assert_eq!(jar.import_netscape(content), 1);
    }
}
