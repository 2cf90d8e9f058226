//! Core error types

use indexmap::IndexMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid context: {message}")]
    InvalidContext { message: String },

    #[error("Invalid label precedence table: {message}")]
    InvalidLabels { message: String },

    #[error(
        "Env specification{} matches on {conditions}, none of which is a known label ({labels})",
        origin_suffix(.origin)
    )]
    UnclassifiedEnv {
        conditions: String,
        labels: String,
        origin: Option<String>,
    },

    #[error("Config provider '{name}' is not registered")]
    UnknownProvider { name: String },

    #[error("No manifest provider is registered")]
    NoManifestProvider,

    #[error("Provider '{name}' failed: {message}")]
    Provider { name: String, message: String },

    #[error("Manifests not found: {path}")]
    ManifestNotFound { path: String },

    #[error("Invalid document {path}: {message}")]
    InvalidDocument { path: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn origin_suffix(origin: &Option<String>) -> String {
    origin
        .as_ref()
        .map(|s| format!(" in {}", s))
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, CoreError>;

/// A release whose values still reference tokens after substitution
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("release '{release}' has unresolved {}", format_tokens(.tokens))]
pub struct SubstitutionError {
    /// Name of the offending release
    pub release: String,

    /// Unresolved token names, sorted and deduplicated
    pub tokens: Vec<String>,
}

fn format_tokens(tokens: &[String]) -> String {
    let rendered: Vec<String> = tokens.iter().map(|t| format!("${{{}}}", t)).collect();
    let word = if tokens.len() == 1 { "token" } else { "tokens" };
    format!("{} {}", word, rendered.join(", "))
}

/// Aggregated substitution failures, grouped by manifest file
#[derive(Debug, Clone, Default)]
pub struct SubstitutionReport {
    /// Errors grouped by manifest file (insertion order)
    pub errors_by_file: IndexMap<String, Vec<SubstitutionError>>,

    /// Total number of unresolved tokens across all files
    pub total_tokens: usize,
}

impl SubstitutionReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failed release under its manifest file
    pub fn add_error(&mut self, file: String, error: SubstitutionError) {
        self.total_tokens += error.tokens.len();
        self.errors_by_file.entry(file).or_default().push(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors_by_file.is_empty()
    }

    pub fn files_with_errors(&self) -> usize {
        self.errors_by_file.len()
    }

    /// Every `(file, token)` pair, in report order
    pub fn unresolved(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors_by_file.iter().flat_map(|(file, errors)| {
            errors
                .iter()
                .flat_map(move |e| e.tokens.iter().map(move |t| (file.as_str(), t.as_str())))
        })
    }

    /// Summary message: "3 unresolved tokens in 2 files"
    pub fn summary(&self) -> String {
        let token_word = if self.total_tokens == 1 {
            "token"
        } else {
            "tokens"
        };
        let file_word = if self.files_with_errors() == 1 {
            "file"
        } else {
            "files"
        };
        format!(
            "{} unresolved {} in {} {}",
            self.total_tokens,
            token_word,
            self.files_with_errors(),
            file_word
        )
    }
}

/// Failure of a whole enrichment run
#[derive(Error, Debug)]
pub enum EnrichError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Substitution failed: {}", .0.summary())]
    Substitution(SubstitutionReport),
}
