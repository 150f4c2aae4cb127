//! Query parameters for API requests.

use std::collections::BTreeMap;
use std::fmt::Display;

use url::Url;

/// Name of the query parameter carrying the API key.
pub const API_KEY_PARAM: &str = "apiKey";

/// Named query arguments for one request, kept sorted by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: BTreeMap<String, String>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter, replacing any earlier value for the same key.
    pub fn with(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Display) {
        self.params.insert(key.into(), value.to_string());
    }

    #[cfg(test)]
    fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Returns a copy carrying `api_key` under [`API_KEY_PARAM`] unless the
    /// caller already supplied one.
    pub fn with_default_api_key(&self, api_key: &str) -> Self {
        let mut merged = self.clone();
        merged
            .params
            .entry(API_KEY_PARAM.to_string())
            .or_insert_with(|| api_key.to_string());
        merged
    }

    /// Renders `key=value` pairs joined by `&`, percent-encoded.
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.iter())
            .finish()
    }

    /// Replaces the query of `url` with these parameters.
    pub fn apply_to(&self, url: &mut Url) {
        if self.params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut()
                .clear()
                .extend_pairs(self.params.iter());
        }
    }
}

impl<K: Into<String>, V: Display> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

/// Parses a `KEY=VALUE` command line argument.
pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got {raw:?}")),
    }
}
