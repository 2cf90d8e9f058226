//! Deployment context

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::conditions::Attributes;
use crate::error::{CoreError, Result};

/// Attribute under which the context name is exposed to matchers
pub const CONTEXT_NAME: &str = "contextName";

/// A named deployment target (cluster + environment labels)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    /// Context name, unique within a configuration
    pub name: String,

    /// Kubernetes context (cluster) this target deploys to
    #[serde(default)]
    pub kubernetes_context: String,

    /// Labels such as `environment`, `environmentType`, `contextType`
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

impl Context {
    /// Create a context without labels
    pub fn new(name: impl Into<String>, kubernetes_context: impl Into<String>) -> Result<Self> {
        let context = Self {
            name: name.into(),
            kubernetes_context: kubernetes_context.into(),
            labels: BTreeMap::new(),
        };
        context.validate()?;
        Ok(context)
    }

    /// Add a label (builder style)
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::InvalidContext {
                message: "context name must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Attribute map used by every matcher: labels plus `contextName`
    pub fn attributes(&self) -> Attributes {
        let mut attributes = self.labels.clone();
        attributes.insert(CONTEXT_NAME.to_string(), self.name.clone());
        attributes
    }
}
