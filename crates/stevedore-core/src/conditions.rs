//! Condition matching against context attributes
//!
//! A [`Conditions`] set is satisfied when every key equals the corresponding
//! attribute exactly. A [`Matcher`] is a list of condition sets joined by OR.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Flat attribute map of a context (label name -> value)
pub type Attributes = BTreeMap<String, String>;

/// Attribute predicate: all keys must match (logical AND)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conditions(pub BTreeMap<String, String>);

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition (builder style)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Check whether every condition is satisfied by the attributes.
    ///
    /// Comparison is case-sensitive. An attribute that is not set never
    /// matches, even against an empty expected value.
    pub fn matches(&self, attributes: &Attributes) -> bool {
        self.0
            .iter()
            .all(|(key, expected)| attributes.get(key) == Some(expected))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Conditions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self
            .0
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect();
        write!(f, "{{{}}}", pairs.join(", "))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Conditions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Ordered alternatives of [`Conditions`] (logical OR)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Matcher(pub Vec<Conditions>);

impl Matcher {
    /// True when any entry matches. An empty matcher matches nothing.
    pub fn matches(&self, attributes: &Attributes) -> bool {
        self.0.iter().any(|conditions| conditions.matches(attributes))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Conditions>> for Matcher {
    fn from(entries: Vec<Conditions>) -> Self {
        Self(entries)
    }
}
