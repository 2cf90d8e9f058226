//! Manifest enrichment
//!
//! Resolves a set of manifest files for one context: drops manifests and
//! releases that do not apply, merges overrides and env values, and
//! substitutes every release. Substitution failures are collected per file
//! so a single run reports every broken manifest.

use serde::{Deserialize, Serialize};

use crate::conditions::Attributes;
use crate::context::Context;
use crate::env::EnvSpecifications;
use crate::error::{EnrichError, Result, SubstitutionReport};
use crate::ignores::{IgnoredRelease, Ignores};
use crate::labels::Labels;
use crate::manifest::{Manifest, ManifestFile};
use crate::overrides::Overrides;
use crate::provider::ProviderRegistry;
use crate::report::{Reporter, RuleCounts};
use crate::substitute::{Substitute, Substitution, SubstitutionEngine};

/// Result of a successful enrichment run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    pub manifest_files: Vec<ManifestFile>,
    pub ignored: Vec<IgnoredRelease>,
}

/// Enricher builder
pub struct EnricherBuilder {
    context: Context,
    labels: Labels,
    overrides: Overrides,
    ignores: Ignores,
    envs: EnvSpecifications,
    base_env: Substitute,
}

impl EnricherBuilder {
    pub fn new(context: Context) -> Self {
        Self {
            context,
            labels: Labels::default(),
            overrides: Overrides::default(),
            ignores: Ignores::default(),
            envs: EnvSpecifications::default(),
            base_env: Substitute::default(),
        }
    }

    /// Label precedence table (defaults to [`Labels::default`])
    pub fn labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }

    pub fn overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn ignores(mut self, ignores: Ignores) -> Self {
        self.ignores = ignores;
        self
    }

    pub fn envs(mut self, envs: EnvSpecifications) -> Self {
        self.envs = envs;
        self
    }

    /// Base environment the env specifications are merged onto
    pub fn base_env(mut self, base_env: Substitute) -> Self {
        self.base_env = base_env;
        self
    }

    pub fn build(self) -> Enricher {
        Enricher {
            context: self.context,
            labels: self.labels,
            overrides: self.overrides,
            ignores: self.ignores,
            envs: self.envs,
            base_env: self.base_env,
        }
    }
}

/// Resolves manifest files for one context
pub struct Enricher {
    context: Context,
    labels: Labels,
    overrides: Overrides,
    ignores: Ignores,
    envs: EnvSpecifications,
    base_env: Substitute,
}

impl Enricher {
    pub fn builder(context: Context) -> EnricherBuilder {
        EnricherBuilder::new(context)
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Releases the context leaves out, in manifest order.
    ///
    /// Only `deployTo` and the ignore rules are evaluated: nothing is
    /// substituted and no provider is called.
    pub fn ignored(&self, files: &[ManifestFile]) -> Result<Vec<IgnoredRelease>> {
        self.context.validate()?;
        let attributes = self.context.attributes();
        let ignore_set = self.ignores.resolve(&self.context);

        let mut ignored = Vec::new();
        for file in files {
            match self.undeployable(file, &attributes) {
                Some(releases) => ignored.extend(releases),
                None => ignored.extend(file.release_names().filter_map(|name| ignore_set.release(name))),
            }
        }
        Ok(ignored)
    }

    /// Every release of `file` when its `deployTo` does not match the context
    fn undeployable(&self, file: &ManifestFile, attributes: &Attributes) -> Option<Vec<IgnoredRelease>> {
        if file.manifest.deploy_to.matches(attributes) {
            return None;
        }

        tracing::debug!(
            file = %file.file,
            context = %self.context.name,
            "manifest not deployable to context"
        );
        Some(
            file.release_names()
                .map(|name| IgnoredRelease::not_applicable(name, &self.context))
                .collect(),
        )
    }

    /// Resolve the files sequentially.
    ///
    /// Configuration and provider errors abort the run. Unresolved tokens are
    /// collected per file; the run fails with every offending file once all
    /// files were evaluated.
    pub fn enrich(
        &self,
        files: Vec<ManifestFile>,
        registry: &ProviderRegistry,
        reporter: &dyn Reporter,
    ) -> std::result::Result<Info, EnrichError> {
        let context = &self.context;
        context.validate()?;
        reporter.context(context);

        let applicable_envs = self.envs.filter(context);
        let env_count = applicable_envs.len();
        let substitute = applicable_envs.sort_and_merge(self.base_env.clone(), &self.labels)?;
        let ignore_set = self.ignores.resolve(context);
        let overrides = self.overrides.resolve(context, &self.labels);

        reporter.rules(RuleCounts {
            overrides: overrides.applied.len(),
            ignores: ignore_set.len(),
            envs: env_count,
        });

        let attributes = context.attributes();
        let mut report = SubstitutionReport::new();
        let mut ignored = Vec::new();
        let mut manifest_files = Vec::new();

        for file in files {
            if let Some(releases) = self.undeployable(&file, &attributes) {
                ignored.extend(releases);
                continue;
            }

            let engine = SubstitutionEngine::new(&substitute, &overrides.values, registry, &attributes);

            let ManifestFile { file: name, manifest } = file;
            let mut spec = Vec::with_capacity(manifest.spec.len());
            let mut failed = false;

            for mut release_spec in manifest.spec {
                if let Some(excluded) = ignore_set.release(&release_spec.release.name) {
                    tracing::debug!(release = %excluded.name, "release ignored by rule");
                    ignored.push(excluded);
                    continue;
                }

                match engine.substitute(&release_spec)? {
                    Substitution::Resolved(values) => {
                        release_spec.release.values = values;
                        spec.push(release_spec);
                    }
                    Substitution::Unresolved(err) => {
                        tracing::warn!(file = %name, "{}", err);
                        report.add_error(name.clone(), err);
                        failed = true;
                    }
                }
            }

            if failed || spec.is_empty() {
                continue;
            }

            manifest_files.push(ManifestFile::new(
                name,
                Manifest {
                    deploy_to: manifest.deploy_to,
                    spec,
                },
            ));
        }

        reporter.ignored(&ignored);

        if report.has_errors() {
            return Err(EnrichError::Substitution(report));
        }

        tracing::info!(
            context = %context.name,
            manifests = manifest_files.len(),
            ignored = ignored.len(),
            "manifests enriched"
        );
        reporter.manifests(&manifest_files);

        Ok(Info {
            manifest_files,
            ignored,
        })
    }
}
