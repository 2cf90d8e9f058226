//! YAML loaders for rule and manifest files
//!
//! Every loader accepts either a single file or a directory, in which case
//! all `*.yaml`/`*.yml` files below it are read in path order. Files may
//! contain several YAML documents; empty documents are skipped.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::env::{EnvSpecification, EnvSpecifications};
use crate::error::{CoreError, Result};
use crate::ignores::Ignores;
use crate::manifest::{Manifest, ManifestFile};
use crate::overrides::Overrides;

#[derive(Debug, Default, Deserialize)]
struct OverridesDocument {
    #[serde(default)]
    overrides: Overrides,
}

#[derive(Debug, Default, Deserialize)]
struct IgnoresDocument {
    #[serde(default)]
    ignores: Ignores,
}

/// YAML files at `path`, sorted. A plain file is returned as-is.
pub fn yaml_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.map_err(|e| CoreError::Io(e.into()))?;
        let is_yaml = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == "yaml" || ext == "yml");
        if entry.file_type().is_file() && is_yaml {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Read a single-document YAML file
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&content).map_err(|e| invalid_document(path, e))
}

/// Read every non-empty document of a YAML file
pub fn read_documents<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = std::fs::read_to_string(path)?;
    let mut documents = Vec::new();

    for document in serde_yaml::Deserializer::from_str(&content) {
        let value = serde_yaml::Value::deserialize(document).map_err(|e| invalid_document(path, e))?;
        if value.is_null() {
            continue;
        }
        documents.push(serde_yaml::from_value(value).map_err(|e| invalid_document(path, e))?);
    }

    Ok(documents)
}

fn invalid_document(path: &Path, err: serde_yaml::Error) -> CoreError {
    CoreError::InvalidDocument {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

/// Load manifest files; a missing path is an error
pub fn load_manifests(path: &Path) -> Result<Vec<ManifestFile>> {
    if !path.exists() {
        return Err(CoreError::ManifestNotFound {
            path: path.display().to_string(),
        });
    }

    let mut manifests = Vec::new();
    for file in yaml_files(path)? {
        let documents: Vec<Manifest> = read_documents(&file)?;
        let multiple = documents.len() > 1;
        for (index, manifest) in documents.into_iter().enumerate() {
            let name = if multiple {
                format!("{}#{}", file.display(), index + 1)
            } else {
                file.display().to_string()
            };
            manifests.push(ManifestFile::new(name, manifest));
        }
    }

    tracing::debug!(path = %path.display(), count = manifests.len(), "loaded manifests");
    Ok(manifests)
}

/// Load override rules; a missing path yields no overrides
pub fn load_overrides(path: &Path) -> Result<Overrides> {
    let mut overrides = Overrides::default();
    for file in optional_files(path)? {
        for document in read_documents::<OverridesDocument>(&file)? {
            overrides.0.extend(document.overrides.0);
        }
    }
    Ok(overrides)
}

/// Load ignore rules; a missing path yields no ignores
pub fn load_ignores(path: &Path) -> Result<Ignores> {
    let mut ignores = Ignores::default();
    for file in optional_files(path)? {
        for document in read_documents::<IgnoresDocument>(&file)? {
            ignores.0.extend(document.ignores.0);
        }
    }
    Ok(ignores)
}

/// Load env specifications, one per document; a missing path yields none
pub fn load_envs(path: &Path) -> Result<EnvSpecifications> {
    let mut envs = EnvSpecifications::default();
    for file in optional_files(path)? {
        for mut spec in read_documents::<EnvSpecification>(&file)? {
            spec.origin = Some(file.display().to_string());
            envs.0.push(spec);
        }
    }
    Ok(envs)
}

fn optional_files(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "path does not exist, skipping");
        return Ok(Vec::new());
    }
    yaml_files(path)
}
