//! Query parameters and their wire encoding.
//!
//! The API rejects explicit false-equivalents such as `use_cache=0`, so
//! boolean `false` is never sent. `true` is sent as `1`. Absent values and
//! empty strings are dropped as well.

use std::collections::BTreeMap;
use std::fmt;

/// A scalar query parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Explicitly absent; never encoded.
    Null,
}

impl ParamValue {
    /// Wire form of the value, or `None` if the key must be omitted.
    #[must_use]
    pub fn encode(&self) -> Option<String> {
        match self {
            Self::Str(s) if s.is_empty() => None,
            Self::Str(s) => Some(s.clone()),
            Self::Int(n) => Some(n.to_string()),
            Self::Float(n) => Some(n.to_string()),
            Self::Bool(true) => Some("1".to_string()),
            Self::Bool(false) | Self::Null => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Null => write!(f, "null"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    Self::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Unordered set of query parameters, keyed by name.
///
/// Each key holds a single value; inserting an existing key replaces it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestParams {
    values: BTreeMap<String, ParamValue>,
}

impl RequestParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.values.remove(key)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Encoded `(key, value)` pairs, skipping everything that must be omitted.
    #[must_use]
    pub fn encode(&self) -> Vec<(String, String)> {
        self.values
            .iter()
            .filter_map(|(key, value)| value.encode().map(|v| (key.clone(), v)))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for RequestParams
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(params: &RequestParams) -> BTreeMap<String, String> {
        params.encode().into_iter().collect()
    }

    #[test]
    fn test_false_is_omitted() {
        let params = RequestParams::new()
            .with("query", "pizza")
            .with("use_cache", false);
        let pairs = encoded(&params);
        assert!(!pairs.contains_key("use_cache"));
        assert_eq!(pairs.get("query").map(String::as_str), Some("pizza"));
    }

    #[test]
    fn test_true_encodes_as_one() {
        let params = RequestParams::new().with("use_cache", true);
        assert_eq!(
            params.encode(),
            vec![("use_cache".to_string(), "1".to_string())]
        );
    }

    #[test]
    fn test_absent_and_empty_are_omitted() {
        let params = RequestParams::new()
            .with("gl", None::<String>)
            .with("hl", "")
            .with("lat", ParamValue::Null)
            .with("query", "coffee");
        assert_eq!(
            params.encode(),
            vec![("query".to_string(), "coffee".to_string())]
        );
    }

    #[test]
    fn test_numbers_stringify() {
        let params = RequestParams::new()
            .with("zoom", 13_u32)
            .with("lat", 40.7128)
            .with("whole", 13.0)
            .with("start", -1_i64);
        let pairs = encoded(&params);
        assert_eq!(pairs["zoom"], "13");
        assert_eq!(pairs["lat"], "40.7128");
        assert_eq!(pairs["whole"], "13");
        assert_eq!(pairs["start"], "-1");
    }

    #[test]
    fn test_insert_replaces_existing_key() {
        let mut params = RequestParams::new().with("zoom", 10);
        params.insert("zoom", 13);
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("zoom"), Some(&ParamValue::Int(13)));
    }

    #[test]
    fn test_every_scalar_key_appears_once() {
        let params: RequestParams = [("a", "1"), ("b", "two"), ("c", "3.5")]
            .into_iter()
            .collect();
        let pairs = params.encode();
        assert_eq!(pairs.len(), 3);
        for key in ["a", "b", "c"] {
            assert_eq!(pairs.iter().filter(|(k, _)| k == key).count(), 1);
        }
    }
}
