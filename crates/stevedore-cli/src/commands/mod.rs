//! CLI commands

pub mod contexts;
pub mod ignored;
pub mod render;

use std::path::Path;
use stevedore_core::{Context, Enricher, Substitute, files};

use crate::config::StevedoreConfig;
use crate::error::Result;

/// Rule files given on the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct RulePaths<'a> {
    pub overrides: Option<&'a Path>,
    pub ignores: Option<&'a Path>,
    pub envs: Option<&'a Path>,
}

/// Build the enricher for `context` from the rule files
pub fn enricher(config: &StevedoreConfig, context: &Context, rules: RulePaths<'_>) -> Result<Enricher> {
    let mut builder = Enricher::builder(context.clone())
        .labels(config.labels.clone())
        .base_env(Substitute::from_process_env());

    if let Some(path) = rules.overrides {
        builder = builder.overrides(files::load_overrides(path)?);
    }
    if let Some(path) = rules.ignores {
        builder = builder.ignores(files::load_ignores(path)?);
    }
    if let Some(path) = rules.envs {
        builder = builder.envs(files::load_envs(path)?);
    }

    Ok(builder.build())
}
