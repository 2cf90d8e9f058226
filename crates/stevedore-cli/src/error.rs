//! CLI error types with exit code handling
//!
//! Every failure of a command is turned into a [`CliError`], which carries
//! the exit code the process terminates with.

use miette::Diagnostic;
use stevedore_core::{CoreError, EnrichError, SubstitutionReport};
use thiserror::Error;

use crate::exit_codes;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Configuration file, context, label table or rule files are invalid
    #[error("Configuration error: {message}")]
    #[diagnostic(code(stevedore::cli::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Some releases kept unresolved tokens
    #[error("Substitution failed: {summary}")]
    #[diagnostic(
        code(stevedore::cli::substitution),
        help("Define the missing names in the environment, an override or a config provider")
    )]
    Substitution { summary: String },

    /// Manifest or rule file malformed
    #[error("Input error: {message}")]
    #[diagnostic(code(stevedore::cli::input))]
    Input { message: String },

    /// Config provider unknown or failing
    #[error("Provider error: {message}")]
    #[diagnostic(code(stevedore::cli::provider))]
    Provider {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(stevedore::cli::io))]
    Io { message: String },

    /// Wrapped error for passthrough (stores the formatted message)
    #[error("{message}")]
    #[diagnostic(code(stevedore::cli::error))]
    Other { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config { .. } => exit_codes::CONFIG_ERROR,
            CliError::Substitution { .. } => exit_codes::SUBSTITUTION_ERROR,
            CliError::Input { .. } => exit_codes::INPUT_ERROR,
            CliError::Provider { .. } => exit_codes::PROVIDER_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Other { .. } => exit_codes::ERROR,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a configuration error with help text
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    pub fn substitution(report: &SubstitutionReport) -> Self {
        Self::Substitution {
            summary: report.summary(),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::InvalidContext { .. }
            | CoreError::InvalidLabels { .. }
            | CoreError::UnclassifiedEnv { .. } => CliError::Config {
                message,
                help: None,
            },
            CoreError::UnknownProvider { .. } => CliError::Provider {
                message,
                help: Some("Declare the provider under `providers` in the configuration".to_string()),
            },
            CoreError::NoManifestProvider | CoreError::Provider { .. } => CliError::Provider {
                message,
                help: None,
            },
            CoreError::ManifestNotFound { .. }
            | CoreError::InvalidDocument { .. }
            | CoreError::YamlParse(_)
            | CoreError::JsonParse(_) => CliError::Input { message },
            CoreError::Io(_) => CliError::Io { message },
        }
    }
}

impl From<EnrichError> for CliError {
    fn from(err: EnrichError) -> Self {
        match err {
            EnrichError::Core(e) => e.into(),
            EnrichError::Substitution(report) => CliError::substitution(&report),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(err: serde_yaml::Error) -> Self {
        CliError::Other {
            message: format!("YAML error: {}", err),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Other {
            message: format!("JSON error: {}", err),
        }
    }
}
