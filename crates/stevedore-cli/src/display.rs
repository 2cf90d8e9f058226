//! Display formatting for CLI output
//!
//! Progress and reports go to stderr so stdout only carries the resolved
//! manifests.

use console::style;
use stevedore_core::{Context, IgnoredRelease, ManifestFile, Reporter, RuleCounts, SubstitutionReport};

/// Reporter printing pipeline progress to the terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn context(&self, context: &Context) {
        eprintln!(
            "{} Resolving manifests for context {} ({})",
            style("→").blue(),
            style(&context.name).bold(),
            context.kubernetes_context
        );
    }

    fn rules(&self, counts: RuleCounts) {
        eprintln!(
            "  {} {} overrides applied, {} releases ignored by rule, {} env specifications",
            style("→").blue(),
            counts.overrides,
            counts.ignores,
            counts.envs
        );
    }

    fn manifests(&self, files: &[ManifestFile]) {
        let releases: usize = files.iter().map(|f| f.manifest.spec.len()).sum();
        eprintln!(
            "{} Resolved {} releases in {} manifests",
            style("✓").green(),
            releases,
            files.len()
        );
    }

    fn ignored(&self, ignored: &[IgnoredRelease]) {
        if ignored.is_empty() {
            return;
        }
        eprintln!("  {} Ignored releases:", style("⚠").yellow());
        for release in ignored {
            eprintln!("    {}", format_ignored(release));
        }
    }
}

/// One ignored release, `name (reason)`
pub fn format_ignored(release: &IgnoredRelease) -> String {
    if release.reason.is_empty() {
        release.name.clone()
    } else {
        format!("{} ({})", release.name, release.reason)
    }
}

/// Display every file and token the substitution left unresolved
pub fn display_substitution_report(report: &SubstitutionReport) {
    eprintln!(
        "  {} Substitution failed: {}",
        style("✗").red(),
        style(report.summary()).bold()
    );
    eprintln!();

    for (file, errors) in &report.errors_by_file {
        eprintln!(
            "  {} {} ({} {})",
            style("→").blue(),
            style(file).yellow(),
            errors.len(),
            if errors.len() == 1 { "release" } else { "releases" }
        );

        for error in errors {
            eprintln!("    {} {}", style("✗").red(), error);
        }
    }
    eprintln!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_ignored() {
        assert_eq!(format_ignored(&IgnoredRelease::new("app", "")), "app");
        assert_eq!(
            format_ignored(&IgnoredRelease::new("app", "paused for migration")),
            "app (paused for migration)"
        );
    }
}
