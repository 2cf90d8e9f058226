//! Label precedence table
//!
//! Overrides and env specifications are merged from the most general label
//! (first entry) to the most specific one (last entry). A rule is classified
//! by the most specific table label its conditions key on.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::conditions::Conditions;
use crate::error::{CoreError, Result};

/// Labels used when a configuration does not declare its own table
pub const DEFAULT_LABELS: &[&str] = &[
    "environmentType",
    "environment",
    "contextType",
    "contextName",
    "applicationName",
];

/// Ordered, validated list of attribute names (general -> specific)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Labels(Vec<String>);

impl Labels {
    /// Build a table, rejecting empty tables, blank names and duplicates
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();

        if names.is_empty() {
            return Err(CoreError::InvalidLabels {
                message: "at least one label is required".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for name in &names {
            if name.trim().is_empty() {
                return Err(CoreError::InvalidLabels {
                    message: "label names must not be blank".to_string(),
                });
            }
            if !seen.insert(name.as_str()) {
                return Err(CoreError::InvalidLabels {
                    message: format!("label '{}' is listed more than once", name),
                });
            }
        }

        Ok(Self(names))
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// Precedence index of the most specific label the conditions key on
    pub fn weight(&self, conditions: &Conditions) -> Option<usize> {
        self.0
            .iter()
            .rposition(|label| conditions.contains_key(label))
    }

    /// Stable-sort items by weight, general first.
    ///
    /// Returns the items that could not be classified separately, in source order.
    pub fn sort_by_weight<T, F>(&self, items: Vec<T>, conditions: F) -> (Vec<T>, Vec<T>)
    where
        F: Fn(&T) -> &Conditions,
    {
        let mut weighted = Vec::with_capacity(items.len());
        let mut unclassified = Vec::new();

        for item in items {
            match self.weight(conditions(&item)) {
                Some(weight) => weighted.push((weight, item)),
                None => unclassified.push(item),
            }
        }

        weighted.sort_by_key(|(weight, _)| *weight);
        (
            weighted.into_iter().map(|(_, item)| item).collect(),
            unclassified,
        )
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self(DEFAULT_LABELS.iter().map(|l| l.to_string()).collect())
    }
}

impl TryFrom<Vec<String>> for Labels {
    type Error = CoreError;

    fn try_from(names: Vec<String>) -> Result<Self> {
        Self::new(names)
    }
}

impl From<Labels> for Vec<String> {
    fn from(labels: Labels) -> Self {
        labels.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let labels = Labels::default();
        assert_eq!(labels.names().len(), 5);
        assert_eq!(labels.names()[0], "environmentType");
        assert_eq!(labels.names()[4], "applicationName");
    }

    #[test]
    fn test_rejects_invalid_tables() {
        assert!(matches!(
            Labels::new(Vec::<String>::new()),
            Err(CoreError::InvalidLabels { .. })
        ));
        assert!(matches!(
            Labels::new(["environment", " "]),
            Err(CoreError::InvalidLabels { .. })
        ));
        let err = Labels::new(["environment", "contextName", "environment"]).unwrap_err();
        assert!(err.to_string().contains("'environment' is listed more than once"));
    }

    #[test]
    fn test_weight_uses_most_specific_key() {
        let labels = Labels::default();

        let conditions = Conditions::new().with("environmentType", "staging");
        assert_eq!(labels.weight(&conditions), Some(0));

        let conditions = Conditions::new()
            .with("environmentType", "staging")
            .with("contextName", "components-staging");
        assert_eq!(labels.weight(&conditions), Some(3));

        let conditions = Conditions::new().with("team", "core");
        assert_eq!(labels.weight(&conditions), None);
        assert_eq!(labels.weight(&Conditions::new()), None);
    }

    #[test]
    fn test_sort_by_weight_is_stable() {
        let labels = Labels::default();
        let items = vec![
            ("ctx-1", Conditions::new().with("contextName", "a")),
            ("env-type", Conditions::new().with("environmentType", "staging")),
            ("foreign", Conditions::new().with("team", "core")),
            ("ctx-2", Conditions::new().with("contextName", "b")),
            ("env", Conditions::new().with("environment", "env")),
        ];

        let (sorted, unclassified) = labels.sort_by_weight(items, |(_, c)| c);
        let names: Vec<_> = sorted.iter().map(|(n, _)| *n).collect();

        assert_eq!(names, vec!["env-type", "env", "ctx-1", "ctx-2"]);
        assert_eq!(unclassified.len(), 1);
        assert_eq!(unclassified[0].0, "foreign");
    }

    #[test]
    fn test_deserialize_validates() {
        let labels: Labels = serde_yaml::from_str("[environment, contextName]").unwrap();
        assert_eq!(labels.names(), ["environment", "contextName"]);

        let err = serde_yaml::from_str::<Labels>("[environment, environment]");
        assert!(err.is_err());
    }
}
