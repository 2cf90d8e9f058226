//! Stevedore Core - manifest resolution for context-aware Helm deployments
//!
//! This crate turns declarative release manifests into their concrete form
//! for one deployment context:
//! - `Conditions` / `Matcher`: attribute predicates used by every rule
//! - `Labels`: label precedence table (general -> specific)
//! - `Overrides`, `EnvSpecifications`, `Ignores`: context-dependent rules
//! - `SubstitutionEngine`: `${NAME}` replacement with lazy provider lookups
//! - `Enricher`: runs the whole pipeline over a set of manifest files

pub mod conditions;
pub mod context;
pub mod enrich;
pub mod env;
pub mod error;
pub mod files;
pub mod ignores;
pub mod labels;
pub mod manifest;
pub mod overrides;
pub mod provider;
pub mod report;
pub mod substitute;
pub mod values;

pub use conditions::{Attributes, Conditions, Matcher};
pub use context::Context;
pub use enrich::{Enricher, EnricherBuilder, Info};
pub use env::{EnvSpecification, EnvSpecifications};
pub use error::{CoreError, EnrichError, SubstitutionError, SubstitutionReport};
pub use ignores::{IgnoreSpecification, IgnoredRelease, IgnoredReleases, Ignores};
pub use labels::{DEFAULT_LABELS, Labels};
pub use manifest::{ConfigOptions, Configs, Manifest, ManifestFile, Release, ReleaseSpecification};
pub use overrides::{OverrideSpecification, Overrides, ResolvedOverrides};
pub use provider::{
    ConfigProvider, ConfigValues, FileConfigProvider, FileManifestProvider, ManifestProvider,
    MockConfigProvider, ProviderError, ProviderRegistry,
};
pub use report::{NoopReporter, Reporter, RuleCounts};
pub use substitute::{Substitute, Substitution, SubstitutionEngine};
pub use values::Values;
