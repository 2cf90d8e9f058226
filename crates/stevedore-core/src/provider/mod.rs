//! Provider contracts and registry
//!
//! Providers supply data the pipeline cannot compute itself:
//! - **Config providers** return substitution values for a release, on demand
//! - **Manifest providers** return the raw manifest files for a context
//!
//! How a provider is reached (in-process, external plugin) is hidden behind
//! the traits. A [`ProviderRegistry`] is built once per run and passed to the
//! pipeline by reference.

mod file;
mod mock;

pub use file::{FileConfigProvider, FileManifestProvider, StoreEntry};
pub use mock::{FetchCall, MockConfigProvider};

use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::conditions::Attributes;
use crate::error::{CoreError, Result};
use crate::manifest::{ConfigOptions, ManifestFile};

/// Values returned by a config provider
pub type ConfigValues = serde_json::Map<String, JsonValue>;

/// Failure reported by a provider implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ProviderError {
    pub message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<CoreError> for ProviderError {
    fn from(err: CoreError) -> Self {
        Self::new(err.to_string())
    }
}

/// Source of substitution values (secret stores, config services, ...)
pub trait ConfigProvider: Send + Sync {
    /// Fetch values for the given context attributes and option sets
    fn fetch(
        &self,
        context: &Attributes,
        options: &[ConfigOptions],
    ) -> std::result::Result<ConfigValues, ProviderError>;
}

/// Source of raw manifest files
pub trait ManifestProvider: Send + Sync {
    fn manifests(&self, context: &Attributes) -> std::result::Result<Vec<ManifestFile>, ProviderError>;
}

/// Named providers available to one run
#[derive(Default)]
pub struct ProviderRegistry {
    configs: IndexMap<String, Box<dyn ConfigProvider>>,
    manifests: Option<Box<dyn ManifestProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a config provider (builder style)
    pub fn with_config(mut self, name: impl Into<String>, provider: impl ConfigProvider + 'static) -> Self {
        self.register_config(name, provider);
        self
    }

    /// Register the manifest provider (builder style)
    pub fn with_manifests(mut self, provider: impl ManifestProvider + 'static) -> Self {
        self.manifests = Some(Box::new(provider));
        self
    }

    /// Register a config provider, replacing any provider of the same name
    pub fn register_config(&mut self, name: impl Into<String>, provider: impl ConfigProvider + 'static) {
        let name = name.into();
        if self.configs.insert(name.clone(), Box::new(provider)).is_some() {
            tracing::warn!(provider = %name, "config provider registered twice, keeping the last one");
        }
    }

    /// Look up a config provider by name
    pub fn config(&self, name: &str) -> Result<&dyn ConfigProvider> {
        self.configs
            .get(name)
            .map(Box::as_ref)
            .ok_or_else(|| CoreError::UnknownProvider {
                name: name.to_string(),
            })
    }

    pub fn config_names(&self) -> impl Iterator<Item = &str> {
        self.configs.keys().map(String::as_str)
    }

    /// Fetch manifests for a context from the registered manifest provider
    pub fn manifests(&self, context: &Attributes) -> Result<Vec<ManifestFile>> {
        let provider = self.manifests.as_ref().ok_or(CoreError::NoManifestProvider)?;
        provider.manifests(context).map_err(|e| CoreError::Provider {
            name: "manifests".to_string(),
            message: e.message,
        })
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("configs", &self.configs.keys().collect::<Vec<_>>())
            .field("manifests", &self.manifests.is_some())
            .finish()
    }
}
