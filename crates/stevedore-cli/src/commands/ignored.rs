//! Ignored command - list the releases a context leaves out
//!
//! Evaluates `deployTo` and the ignore rules only; no value is substituted
//! and no config provider is called.

use std::io::{self, Write};
use std::path::Path;
use stevedore_core::{Enricher, FileManifestProvider, ProviderRegistry, files};

use crate::config::StevedoreConfig;
use crate::display::format_ignored;
use crate::error::Result;

pub fn run(
    config: &StevedoreConfig,
    context_name: Option<&str>,
    manifests: &Path,
    ignores: Option<&Path>,
    json_output: bool,
) -> Result<()> {
    let context = config.select_context(context_name)?;

    let registry = ProviderRegistry::new().with_manifests(FileManifestProvider::new(manifests));
    let files = registry.manifests(&context.attributes())?;
    let rules = match ignores {
        Some(path) => files::load_ignores(path)?,
        None => Default::default(),
    };

    let ignored = Enricher::builder(context.clone())
        .labels(config.labels.clone())
        .ignores(rules)
        .build()
        .ignored(&files)?;

    let mut stdout = io::stdout().lock();
    if json_output {
        writeln!(stdout, "{}", serde_json::to_string_pretty(&ignored)?)?;
    } else if ignored.is_empty() {
        writeln!(stdout, "No releases ignored for context {}", context.name)?;
    } else {
        for release in &ignored {
            writeln!(stdout, "{}", format_ignored(release))?;
        }
    }

    Ok(())
}
