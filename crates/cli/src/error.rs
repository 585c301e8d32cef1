//! Error types for the Aspector command line.

use aspector_analysis::error::AnalysisError;
use thiserror::Error;

/// Errors surfaced to the user by CLI commands.
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration loading or lookup failed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An analyzer backend failed.
    #[error("Analyzer error: {0}")]
    Analysis(String),

    /// Dataset loading or validation failed.
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Filesystem access failed.
    #[error("Filesystem error: {0}")]
    FileSystem(String),

    /// A command could not complete.
    #[error("Command failed: {0}")]
    Command(String),

    /// An argument combination is not valid.
    #[error("Invalid argument: {0}")]
    Argument(String),

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or parsing failed.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<aspector_core::Error> for CliError {
    fn from(err: aspector_core::Error) -> Self {
        match err {
            aspector_core::Error::Config(msg) => CliError::Config(msg),
            aspector_core::Error::FileSystem(msg) => CliError::FileSystem(msg),
            aspector_core::Error::Parse(msg) => CliError::Parse(msg),
            aspector_core::Error::Io(err) => CliError::Io(err),
        }
    }
}

impl From<AnalysisError> for CliError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::Dataset(msg) => CliError::Dataset(msg),
            AnalysisError::Io(err) => CliError::Io(err),
            other => CliError::Analysis(other.to_string()),
        }
    }
}

/// Result alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;
