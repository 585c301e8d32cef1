//! Error types shared across the Aspector crates.

use thiserror::Error;

/// Error type covering configuration and data handling in the core crate.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration could not be resolved or loaded.
    #[error("configuration error: {0}")]
    Config(String),
    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("filesystem error: {0}")]
    FileSystem(String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;
