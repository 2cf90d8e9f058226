//! Progress reporting hooks
//!
//! The pipeline notifies a [`Reporter`] of what it resolved. All methods
//! default to no-ops so implementations only override what they display.

use crate::context::Context;
use crate::ignores::IgnoredRelease;
use crate::manifest::ManifestFile;

/// Rules that apply to the context of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleCounts {
    /// Override specifications merged into the patch
    pub overrides: usize,
    /// Releases named by matching ignore rules
    pub ignores: usize,
    pub envs: usize,
}

pub trait Reporter {
    /// Context selected for the run
    fn context(&self, _context: &Context) {}

    fn rules(&self, _counts: RuleCounts) {}

    /// Successfully resolved manifests
    fn manifests(&self, _files: &[ManifestFile]) {}

    /// Releases left out of the output
    fn ignored(&self, _ignored: &[IgnoredRelease]) {}
}

/// Reporter that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl Reporter for NoopReporter {}
