//! Opaque environment snapshot
//!
//! Passed through verbatim into the report. The schema belongs to the target
//! system (runtime, loader version, installed mods, ...), so no keys are
//! interpreted here. Keys are kept sorted for deterministic output.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Flat key/value mapping with opaque JSON values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Environment(BTreeMap<String, Value>);

impl Environment {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry (builder style)
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn values_pass_through_untouched() {
        let env = Environment::new()
            .with("java", "17.0.8")
            .with("mods", json!(["embeddium", "rubidium"]));

        assert_eq!(env.len(), 2);
        assert_eq!(env.get("mods"), Some(&json!(["embeddium", "rubidium"])));
    }

    #[test]
    fn serializes_as_sorted_map() {
        let env: Environment = [("zeta", "1"), ("alpha", "2")].into_iter().collect();
        let text = serde_json::to_string(&env).unwrap();
        assert_eq!(text, r#"{"alpha":"2","zeta":"1"}"#);
    }
}
