//! Environment specifications
//!
//! Env files contribute substitution values for the contexts they match.
//! Applicable specifications are folded onto the process environment from
//! the most general label to the most specific one.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::conditions::Conditions;
use crate::context::Context;
use crate::error::{CoreError, Result};
use crate::labels::Labels;
use crate::substitute::Substitute;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvSpecification {
    #[serde(default)]
    pub matches: Conditions,

    #[serde(default)]
    pub env: IndexMap<String, JsonValue>,

    /// File the specification was read from, for diagnostics
    #[serde(skip)]
    pub origin: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvSpecifications(pub Vec<EnvSpecification>);

impl EnvSpecifications {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keep only the specifications applicable to the context
    pub fn filter(&self, context: &Context) -> EnvSpecifications {
        let attributes = context.attributes();
        Self(
            self.0
                .iter()
                .filter(|spec| spec.matches.matches(&attributes))
                .cloned()
                .collect(),
        )
    }

    /// Fold the specifications onto `base`, general labels first.
    ///
    /// Fails when a specification keys on no label of the table.
    pub fn sort_and_merge(self, base: Substitute, labels: &Labels) -> Result<Substitute> {
        let (sorted, unclassified) = labels.sort_by_weight(self.0, |spec| &spec.matches);

        if let Some(spec) = unclassified.into_iter().next() {
            return Err(CoreError::UnclassifiedEnv {
                conditions: spec.matches.to_string(),
                labels: labels.names().join(", "),
                origin: spec.origin,
            });
        }

        let mut substitute = base;
        for spec in sorted {
            tracing::debug!(
                matches = %spec.matches,
                keys = spec.env.len(),
                "merging env specification"
            );
            substitute.extend(spec.env);
        }

        Ok(substitute)
    }
}
