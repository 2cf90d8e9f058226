//! Manifest files and release specifications
//!
//! A manifest file declares which contexts it may be deployed to (`deployTo`)
//! and the releases it contains:
//!
//! ```yaml
//! deployTo:
//!   - contextName: components-staging
//! spec:
//!   - release:
//!       name: x-stevedore
//!       namespace: default
//!       chart: chart/x-stevedore
//!       values:
//!         COMPONENT: ${COMPONENT}
//!     configs:
//!       store:
//!         - name: x-stevedore
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::conditions::Matcher;
use crate::values::Values;

/// Options passed to a config provider for a single lookup
pub type ConfigOptions = serde_json::Map<String, JsonValue>;

/// Config provider calls declared by a release (provider name -> option sets)
pub type Configs = IndexMap<String, Vec<ConfigOptions>>;

/// Helm release definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    pub name: String,

    #[serde(default)]
    pub namespace: String,

    pub chart: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_version: Option<String>,

    #[serde(default)]
    pub values: Values,
}

/// A release plus the config provider calls it depends on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseSpecification {
    pub release: Release,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub configs: Configs,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Contexts this manifest may be deployed to
    #[serde(default)]
    pub deploy_to: Matcher,

    #[serde(default)]
    pub spec: Vec<ReleaseSpecification>,
}

/// A manifest together with the file it was read from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestFile {
    pub file: String,
    pub manifest: Manifest,
}

impl ManifestFile {
    pub fn new(file: impl Into<String>, manifest: Manifest) -> Self {
        Self {
            file: file.into(),
            manifest,
        }
    }

    /// Names of every release declared in the file
    pub fn release_names(&self) -> impl Iterator<Item = &str> {
        self.manifest
            .spec
            .iter()
            .map(|spec| spec.release.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest() {
        let manifest: Manifest = serde_yaml::from_str(
            r#"
deployTo:
  - contextName: components-staging
spec:
  - release:
      name: x-stevedore
      namespace: default
      chart: chart/x-stevedore
      chartVersion: 1.2.0
      values:
        COMPONENT: ${COMPONENT}
        replicas: 2
    configs:
      store:
        - name: x-stevedore
          tags: [server]
  - release:
      name: y-stevedore
      chart: chart/y-stevedore
"#,
        )
        .unwrap();

        assert_eq!(manifest.deploy_to.0.len(), 1);
        assert_eq!(manifest.spec.len(), 2);

        let x = &manifest.spec[0];
        assert_eq!(x.release.chart_version.as_deref(), Some("1.2.0"));
        assert_eq!(x.release.values.inner()["replicas"], 2);
        assert_eq!(x.configs["store"][0]["name"], "x-stevedore");

        let y = &manifest.spec[1];
        assert_eq!(y.release.namespace, "");
        assert!(y.release.values.is_empty());
        assert!(y.configs.is_empty());
    }

    #[test]
    fn test_release_names() {
        let file = ManifestFile::new(
            "a.yaml",
            serde_yaml::from_str(
                r#"
spec:
  - release: {name: one, chart: c}
  - release: {name: two, chart: c}
"#,
            )
            .unwrap(),
        );
        assert_eq!(file.release_names().collect::<Vec<_>>(), vec!["one", "two"]);
        assert!(file.manifest.deploy_to.is_empty());
    }
}
