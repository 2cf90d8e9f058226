//! Release exclusion rules
//!
//! ```yaml
//! ignores:
//!   - matches:
//!       contextName: components-staging
//!     releases:
//!       - name: y-stevedore
//!         reason: not ready for staging
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::conditions::Conditions;
use crate::context::Context;

/// A release excluded from the output, with the reason it was excluded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoredRelease {
    pub name: String,

    #[serde(default)]
    pub reason: String,
}

impl IgnoredRelease {
    pub fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Exclusion generated for a manifest whose `deployTo` does not match
    pub fn not_applicable(name: impl Into<String>, context: &Context) -> Self {
        Self::new(name, not_applicable_reason(&context.name))
    }
}

/// Reason recorded for releases of a manifest not deployable to the context
pub fn not_applicable_reason(context_name: &str) -> String {
    format!("Not applicable for the context '{}'", context_name)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IgnoreSpecification {
    #[serde(default)]
    pub matches: Conditions,

    #[serde(default)]
    pub releases: Vec<IgnoredRelease>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ignores(pub Vec<IgnoreSpecification>);

/// Releases excluded for one context (name -> reason), in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoredReleases(IndexMap<String, String>);

impl Ignores {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Union of the releases of every rule matching the context.
    ///
    /// When several matching rules name the same release, the reason of the
    /// first declared rule is kept.
    pub fn resolve(&self, context: &Context) -> IgnoredReleases {
        let attributes = context.attributes();
        let mut ignored = IgnoredReleases::default();

        for spec in self.0.iter().filter(|s| s.matches.matches(&attributes)) {
            for release in &spec.releases {
                if ignored.0.contains_key(&release.name) {
                    tracing::debug!(
                        release = %release.name,
                        "release ignored by several rules, keeping the first reason"
                    );
                    continue;
                }
                ignored.0.insert(release.name.clone(), release.reason.clone());
            }
        }

        ignored
    }
}

impl IgnoredReleases {
    /// Reason for an ignored release, `None` if the release is not ignored
    pub fn reason(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Exclusion entry for `name`, if a rule ignores it
    pub fn release(&self, name: &str) -> Option<IgnoredRelease> {
        self.reason(name).map(|reason| IgnoredRelease::new(name, reason))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
