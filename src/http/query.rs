//! Query-string parameters.
//!
//! A [`QueryMap`] is an ordered list of `name=value` pairs. Merging appends,
//! so a name given both in the URL and in explicit parameters is sent twice
//! (URL value first).

use serde::Serialize;
use serde_json::Value;
use url::form_urlencoded;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryMap {
    pairs: Vec<(String, String)>,
}

impl QueryMap {
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Parse a raw query string (`a=1&b=2`, no leading `?`).
    pub fn parse(query: &str) -> Self {
        Self {
            pairs: form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    /// Flatten any serializable value into pairs.
    ///
    /// `null` yields an empty map. Objects flatten with bracket keys
    /// (`filter[status]=open`, `ids[0]=4`). Other top-level values are
    /// rejected.
    pub fn from_serialize<T: Serialize + ?Sized>(params: &T) -> Result<Self, String> {
        let value = serde_json::to_value(params).map_err(|e| e.to_string())?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, String> {
        let mut pairs = Vec::new();
        match value {
            Value::Null => {}
            Value::Object(map) => {
                for (key, value) in map {
                    flatten_into(key.clone(), value, &mut pairs);
                }
            }
            Value::Array(items) if items.iter().all(is_pair) => {
                for item in items {
                    if let Value::Array(pair) = item {
                        flatten_into(scalar_to_string(&pair[0]), &pair[1], &mut pairs);
                    }
                }
            }
            other => {
                return Err(format!(
                    "expected a map of parameters, got {}",
                    kind_of(other)
                ))
            }
        }
        Ok(Self { pairs })
    }

    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((name.into(), value.into()));
    }

    pub fn merge(&mut self, other: QueryMap) {
        self.pairs.extend(other.pairs);
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.pairs
    }

    /// `application/x-www-form-urlencoded` serialization.
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

impl<N, V> FromIterator<(N, V)> for QueryMap
where
    N: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        }
    }
}

/// Flatten `value` under `prefix` using bracket keys. `null` leaves are
/// skipped, booleans become `1`/`0`.
pub(crate) fn flatten_into(prefix: String, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (key, nested) in map {
                flatten_into(format!("{prefix}[{key}]"), nested, out);
            }
        }
        Value::Array(items) => {
            for (index, nested) in items.iter().enumerate() {
                flatten_into(format!("{prefix}[{index}]"), nested, out);
            }
        }
        scalar => out.push((prefix, scalar_to_string(scalar))),
    }
}

pub(crate) fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => "0".to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// Vec<(K, V)> serializes as an array of two-element arrays.
fn is_pair(value: &Value) -> bool {
    matches!(value, Value::Array(pair) if pair.len() == 2 && !pair[0].is_array() && !pair[0].is_object())
}
