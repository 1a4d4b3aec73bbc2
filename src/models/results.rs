use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Raw or normalized values for one test, keyed by parameter name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet(BTreeMap<String, String>);

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, parameter: &str) -> Option<&str> {
        self.0.get(parameter).map(String::as_str)
    }

    pub fn insert(&mut self, parameter: impl Into<String>, value: impl Into<String>) {
        self.0.insert(parameter.into(), value.into());
    }

    pub fn remove(&mut self, parameter: &str) -> Option<String> {
        self.0.remove(parameter)
    }

    /// True when the parameter holds something other than whitespace.
    pub fn is_filled(&self, parameter: &str) -> bool {
        self.get(parameter).is_some_and(|v| !v.trim().is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ResultSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_is_not_filled() {
        let results: ResultSet = [("a", "  "), ("b", "80")].into_iter().collect();
        assert!(!results.is_filled("a"));
        assert!(results.is_filled("b"));
        assert!(!results.is_filled("c"));
    }

    #[test]
    fn serializes_as_plain_map() {
        let results: ResultSet = [("S. Typhi - TO", "1:160")].into_iter().collect();
        let json = serde_json::to_string(&results).unwrap();
        assert_eq!(json, r#"{"S. Typhi - TO":"1:160"}"#);
    }
}
