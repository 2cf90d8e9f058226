//! Render command - resolve manifests for a context

use std::io::{self, Write};
use std::path::Path;
use stevedore_core::{EnrichError, FileManifestProvider, ManifestFile};

use super::RulePaths;
use crate::config::StevedoreConfig;
use crate::display::{ConsoleReporter, display_substitution_report};
use crate::error::{CliError, Result};

pub fn run(
    config: &StevedoreConfig,
    context_name: Option<&str>,
    manifests: &Path,
    rules: RulePaths<'_>,
    json_output: bool,
) -> Result<()> {
    let context = config.select_context(context_name)?;
    let registry = config
        .registry()?
        .with_manifests(FileManifestProvider::new(manifests));
    let files = registry.manifests(&context.attributes())?;
    let enricher = super::enricher(config, context, rules)?;

    let info = match enricher.enrich(files, &registry, &ConsoleReporter) {
        Ok(info) => info,
        Err(EnrichError::Substitution(report)) => {
            display_substitution_report(&report);
            return Err(CliError::substitution(&report));
        }
        Err(err) => return Err(err.into()),
    };

    let mut stdout = io::stdout().lock();
    if json_output {
        writeln!(stdout, "{}", serde_json::to_string_pretty(&info)?)?;
    } else {
        write!(stdout, "{}", to_yaml_documents(&info.manifest_files)?)?;
    }

    Ok(())
}

/// Multi-document YAML, one document per manifest file
pub fn to_yaml_documents(files: &[ManifestFile]) -> Result<String> {
    let mut output = String::new();
    for file in files {
        output.push_str("---\n");
        output.push_str(&format!("# Source: {}\n", file.file));
        output.push_str(&serde_yaml::to_string(&file.manifest)?);
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use stevedore_core::Manifest;

    fn manifest(file: &str, release: &str) -> ManifestFile {
        ManifestFile::new(
            file,
            serde_yaml::from_str(&format!(
                "deployTo: [{{environment: env}}]\nspec:\n  - release: {{name: {release}, chart: c, values: {{A: b}}}}\n"
            ))
            .unwrap(),
        )
    }

    #[test]
    fn test_yaml_documents() {
        let files = vec![manifest("a.yaml", "a"), manifest("b.yaml", "b")];
        let output = to_yaml_documents(&files).unwrap();

        assert!(output.starts_with("---\n# Source: a.yaml\n"));
        assert!(output.contains("# Source: b.yaml\n"));

        let documents: Vec<Manifest> = serde_yaml::Deserializer::from_str(&output)
            .map(|doc| Manifest::deserialize(doc).unwrap())
            .collect();
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0], files[0].manifest);
        assert_eq!(documents[1].spec[0].release.name, "b");
    }

    #[test]
    fn test_no_documents() {
        assert_eq!(to_yaml_documents(&[]).unwrap(), "");
    }
}
