//! CLI configuration
//!
//! Stored in `~/.config/stevedore/config.yaml` unless `--config` (or
//! `STEVEDORE_CONFIG`) points elsewhere. Declares the deployment contexts,
//! the label precedence table and the config providers.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use stevedore_core::{Context, FileConfigProvider, Labels, ProviderRegistry};

use crate::error::{CliError, Result};

/// Configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StevedoreConfig {
    /// Context used when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<String>,

    #[serde(default)]
    pub labels: Labels,

    #[serde(default)]
    pub contexts: Vec<Context>,

    #[serde(default)]
    pub providers: Vec<ProviderConfig>,

    /// Directory relative provider paths resolve against
    #[serde(skip)]
    base_dir: PathBuf,
}

/// Config provider declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Name manifests refer to in their `configs`
    pub name: String,

    #[serde(default)]
    pub kind: ProviderKind,

    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// YAML store file
    #[default]
    File,
}

impl StevedoreConfig {
    /// Load the configuration from `path`, or from the default location.
    ///
    /// An explicit path must exist; a missing default file yields an empty
    /// configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from(path);
        }

        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            tracing::debug!(path = %path.display(), "no configuration file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let mut config: Self = serde_yaml::from_str(&content).map_err(|e| {
            CliError::config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(config)
    }

    /// Get default configuration path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CliError::config("Could not determine config directory"))?;
        Ok(config_dir.join("stevedore").join("config.yaml"))
    }

    pub fn context(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == name)
    }

    /// Name of the context a command runs for: `requested`, else `current`
    pub fn selected<'a>(&'a self, requested: Option<&'a str>) -> Option<&'a str> {
        requested.or(self.current.as_deref())
    }

    /// Select the context a command runs for
    pub fn select_context(&self, requested: Option<&str>) -> Result<&Context> {
        let name = self.selected(requested).ok_or_else(|| {
            CliError::config_with_help(
                "No context selected",
                "Pass --context, set STEVEDORE_CONTEXT or set `current` in the configuration",
            )
        })?;

        self.context(name).ok_or_else(|| {
            let known: Vec<&str> = self.contexts.iter().map(|c| c.name.as_str()).collect();
            let help = if known.is_empty() {
                "No contexts are configured".to_string()
            } else {
                format!("Known contexts: {}", known.join(", "))
            };
            CliError::config_with_help(format!("Unknown context '{}'", name), help)
        })
    }

    /// Provider path, resolved against the configuration directory
    pub fn provider_path(&self, provider: &ProviderConfig) -> PathBuf {
        if provider.path.is_absolute() {
            provider.path.clone()
        } else {
            self.base_dir.join(&provider.path)
        }
    }

    /// Build the provider registry for a run
    pub fn registry(&self) -> Result<ProviderRegistry> {
        let mut registry = ProviderRegistry::new();

        for provider in &self.providers {
            match provider.kind {
                ProviderKind::File => {
                    let path = self.provider_path(provider);
                    tracing::debug!(provider = %provider.name, path = %path.display(), "loading file provider");
                    registry.register_config(&provider.name, FileConfigProvider::load(&path)?);
                }
            }
        }

        Ok(registry)
    }
}
