//! Authorization request parameters
//!
//! A mapping from parameter name to value where a key can also carry an
//! explicit omit marker. Omitted keys never reach the query string, so a
//! provider can suppress a parameter a caller passed in.

use std::collections::BTreeMap;
use url::Url;

/// Query parameters for an authorization redirect, plus the requested scopes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizationParams {
    values: BTreeMap<String, Option<String>>,
    scopes: Vec<String>,
}

impl AuthorizationParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set`](Self::set)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Builder form of [`set_scopes`](Self::set_scopes)
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_scopes(scopes.into_iter().map(Into::into).collect());
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), Some(value.into()));
    }

    /// Mark a key so it is dropped from the serialized query
    pub fn omit(&mut self, key: impl Into<String>) {
        self.values.insert(key.into(), None);
    }

    /// Value of a key, `None` when absent or omitted
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(|v| v.as_deref())
    }

    pub fn is_omitted(&self, key: &str) -> bool {
        matches!(self.values.get(key), Some(None))
    }

    /// True when the key is absent, omitted, or holds a falsy string (`""` or `"0"`)
    pub fn is_blank(&self, key: &str) -> bool {
        match self.get(key) {
            None => true,
            Some(value) => value.is_empty() || value == "0",
        }
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    pub fn set_scopes(&mut self, scopes: Vec<String>) {
        self.scopes = scopes;
    }

    /// Serialize into query pairs, skipping omitted keys.
    ///
    /// Scopes are joined with `separator` into a single `scope` pair, which
    /// replaces any raw `scope` value set through [`set`](Self::set).
    pub fn query_pairs(&self, separator: &str) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .values
            .iter()
            .filter(|(key, _)| !(key.as_str() == "scope" && !self.scopes.is_empty()))
            .filter_map(|(key, value)| value.as_ref().map(|v| (key.clone(), v.clone())))
            .collect();

        if !self.scopes.is_empty() {
            pairs.push(("scope".to_string(), self.scopes.join(separator)));
        }

        pairs
    }

    /// Append the serialized parameters to `url`'s query string
    pub fn append_to(&self, url: &mut Url, separator: &str) {
        let pairs = self.query_pairs(separator);
        url.query_pairs_mut().extend_pairs(pairs);
    }
}
