//! Context-dependent override patches
//!
//! ```yaml
//! overrides:
//!   - matches:
//!       environmentType: staging
//!     values:
//!       ENVIRONMENT_TYPE: test
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::conditions::Conditions;
use crate::context::Context;
use crate::labels::Labels;

/// A value patch applied when its conditions match the context
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverrideSpecification {
    #[serde(default)]
    pub matches: Conditions,

    /// Patch values; strings may contain `${NAME}` tokens
    #[serde(default)]
    pub values: IndexMap<String, JsonValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Overrides(pub Vec<OverrideSpecification>);

/// Merged patch for a context plus the specifications that produced it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedOverrides {
    pub values: IndexMap<String, JsonValue>,

    /// Applied specifications, in application order
    pub applied: Vec<OverrideSpecification>,
}

impl Overrides {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merge every matching override for the context.
    ///
    /// Labels are walked from general to specific; for each label the
    /// overrides keyed on it are applied in source order, overwriting keys
    /// written earlier. Overrides keyed on no known label are skipped.
    pub fn resolve(&self, context: &Context, labels: &Labels) -> ResolvedOverrides {
        let attributes = context.attributes();
        let mut resolved = ResolvedOverrides::default();

        for (weight, label) in labels.names().iter().enumerate() {
            for spec in &self.0 {
                if labels.weight(&spec.matches) != Some(weight) || !spec.matches.matches(&attributes) {
                    continue;
                }

                tracing::debug!(
                    label = %label,
                    matches = %spec.matches,
                    keys = spec.values.len(),
                    "applying override"
                );
                for (key, value) in &spec.values {
                    resolved.values.insert(key.clone(), value.clone());
                }
                resolved.applied.push(spec.clone());
            }
        }

        for spec in self.0.iter().filter(|s| labels.weight(&s.matches).is_none()) {
            tracing::warn!(
                matches = %spec.matches,
                "override does not key on any known label, skipping"
            );
        }

        resolved
    }
}

impl ResolvedOverrides {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
