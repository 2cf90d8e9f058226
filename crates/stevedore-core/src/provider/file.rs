//! File-backed providers
//!
//! The config store is a YAML document of conditional entries:
//!
//! ```yaml
//! entries:
//!   - matches:
//!       name: x-stevedore
//!       contextType: components
//!     values:
//!       COMPONENT: x-component
//! ```
//!
//! An entry contributes its values when its conditions match the context
//! attributes combined with one option set. Later entries win.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};

use super::{ConfigProvider, ConfigValues, ManifestProvider, ProviderError};
use crate::conditions::{Attributes, Conditions};
use crate::error::Result;
use crate::files;
use crate::manifest::{ConfigOptions, ManifestFile};
use crate::substitute::string_form;
use crate::values::Values;

/// One conditional entry of a config store file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreEntry {
    #[serde(default)]
    pub matches: Conditions,

    #[serde(default)]
    pub values: Values,
}

#[derive(Debug, Default, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    entries: Vec<StoreEntry>,
}

/// Config provider reading a YAML store file
#[derive(Debug, Clone)]
pub struct FileConfigProvider {
    path: PathBuf,
    entries: Vec<StoreEntry>,
}

impl FileConfigProvider {
    /// Load the store file eagerly
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let document: StoreDocument = files::read_document(path)?;
        tracing::debug!(
            path = %path.display(),
            entries = document.entries.len(),
            "loaded config store"
        );
        Ok(Self {
            path: path.to_path_buf(),
            entries: document.entries,
        })
    }

    pub fn from_entries(entries: Vec<StoreEntry>) -> Self {
        Self {
            path: PathBuf::from("<memory>"),
            entries,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lookup(&self, attributes: &Attributes, result: &mut Values) {
        for entry in &self.entries {
            if !entry.values.is_empty() && entry.matches.matches(attributes) {
                result.merge(&entry.values);
            }
        }
    }
}

/// Context attributes extended with the scalar entries of an option set
fn with_options(context: &Attributes, options: &ConfigOptions) -> Attributes {
    let mut attributes = context.clone();
    for (key, value) in options {
        if !matches!(value, JsonValue::Array(_) | JsonValue::Object(_)) {
            attributes.insert(key.clone(), string_form(value));
        }
    }
    attributes
}

impl ConfigProvider for FileConfigProvider {
    fn fetch(
        &self,
        context: &Attributes,
        options: &[ConfigOptions],
    ) -> std::result::Result<ConfigValues, ProviderError> {
        let mut result = Values::new();

        if options.is_empty() {
            self.lookup(context, &mut result);
        }
        for option_set in options {
            self.lookup(&with_options(context, option_set), &mut result);
        }

        match result.into_inner() {
            JsonValue::Object(map) => Ok(map),
            other => Err(ProviderError::new(format!(
                "store {} produced non-mapping values: {}",
                self.path.display(),
                other
            ))),
        }
    }
}

/// Manifest provider reading YAML files from a file or directory
#[derive(Debug, Clone)]
pub struct FileManifestProvider {
    path: PathBuf,
}

impl FileManifestProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ManifestProvider for FileManifestProvider {
    fn manifests(&self, _context: &Attributes) -> std::result::Result<Vec<ManifestFile>, ProviderError> {
        Ok(files::load_manifests(&self.path)?)
    }
}
