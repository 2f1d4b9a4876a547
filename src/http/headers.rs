use crate::base::neterror::NetError;
use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;

/// An ordered, multi-valued header collection.
///
/// Names keep the case they were given and compare case-insensitively.
/// [`append`](Self::append) never replaces: adding `Accept` twice keeps both
/// values, in insertion order. Validation is deferred to
/// [`to_header_map`](Self::to_header_map) so building a request never fails
/// half-way through a chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderBag {
    entries: Vec<(String, String)>,
}

impl HeaderBag {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a value, keeping any existing values for the same name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Replace every value for `name` with a single one.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.remove(&name);
        self.entries.push((name, value.into()));
    }

    /// Union-merge: every entry of `other` is appended after ours.
    pub fn merge(&mut self, other: HeaderBag) {
        self.entries.extend(other.entries);
    }

    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
    }

    /// First value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Every value for `name`, in insertion order.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// One entry per distinct name (first spelling, first value), in the
    /// order names first appeared.
    pub fn first_values(&self) -> Vec<(String, String)> {
        let mut seen: Vec<(String, String)> = Vec::new();
        for (name, value) in &self.entries {
            if !seen.iter().any(|(n, _)| n.eq_ignore_ascii_case(name)) {
                seen.push((name.clone(), value.clone()));
            }
        }
        seen
    }

    /// Validate and convert into an `http::HeaderMap`, preserving repeats.
    pub fn to_header_map(&self) -> Result<HeaderMap, NetError> {
        let mut map = HeaderMap::with_capacity(self.entries.len());
        for (name, value) in &self.entries {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| NetError::InvalidHeader)?;
            let value = HeaderValue::from_str(value).map_err(|_| NetError::InvalidHeader)?;
            map.append(name, value);
        }
        Ok(map)
    }
}

impl<N, V> FromIterator<(N, V)> for HeaderBag
where
    N: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut bag = HeaderBag::new();
        for (name, value) in iter {
            bag.append(name, value);
        }
        bag
    }
}

impl<N, V> Extend<(N, V)> for HeaderBag
where
    N: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (N, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.append(name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_keeps_both_values() {
        let mut headers = HeaderBag::new();
        headers.append("A", "1");
        headers.append("a", "2");

        assert_eq!(headers.get_all("A"), vec!["1", "2"]);
        assert_eq!(headers.get("A"), Some("1"));
    }

    #[test]
    fn test_set_replaces() {
        let mut headers = HeaderBag::new();
        headers.append("Host", "example.com");
        headers.set("host", "updated.com");

        assert_eq!(headers.get_all("HOST"), vec!["updated.com"]);
    }

    #[test]
    fn test_merge_is_union() {
        let mut left: HeaderBag = [("Accept", "text/xml")].into_iter().collect();
        let right: HeaderBag = [("Accept", "application/json"), ("X-Id", "7")]
            .into_iter()
            .collect();
        left.merge(right);

        assert_eq!(left.get_all("accept"), vec!["text/xml", "application/json"]);
        assert_eq!(left.len(), 3);
    }

    #[test]
    fn test_first_values_keeps_spelling_and_order() {
        let headers: HeaderBag = [("User-Agent", "x"), ("Z-Status", "200"), ("user-agent", "y")]
            .into_iter()
            .collect();

        assert_eq!(
            headers.first_values(),
            vec![
                ("User-Agent".to_string(), "x".to_string()),
                ("Z-Status".to_string(), "200".to_string()),
            ]
        );
    }

    #[test]
    fn test_header_map_preserves_repeats() {
        let headers: HeaderBag = [("A", "1"), ("A", "2")].into_iter().collect();
        let map = headers.to_header_map().unwrap();

        assert_eq!(map.get_all("a").iter().count(), 2);
    }

    #[test]
    fn test_invalid_header_name() {
        let headers: HeaderBag = [("Invalid Header", "value")].into_iter().collect();
        assert!(matches!(headers.to_header_map(), Err(NetError::InvalidHeader)));
    }

    #[test]
    fn test_invalid_header_value() {
        let headers: HeaderBag = [("Valid", "invalid\nvalue")].into_iter().collect();
        assert!(headers.to_header_map().is_err());
    }
}
