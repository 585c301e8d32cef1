use thiserror::Error;

/// Errors produced by analyzer backends and dataset handling.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Model assets could not be fetched or loaded.
    #[error("Model loading failed: {0}")]
    ModelLoading(String),
    /// Tokenizer construction or encoding failure.
    #[error("Tokenization failed: {0}")]
    Tokenization(String),
    /// Forward pass or scoring failure.
    #[error("Inference error: {0}")]
    Inference(String),
    /// Required external service is unreachable.
    #[error("Service unavailable: {0}")]
    Unavailable(String),
    /// Dataset format or content error.
    #[error("Dataset error: {0}")]
    Dataset(String),
    /// Invalid analyzer configuration.
    #[error("Analyzer configuration error: {0}")]
    Config(String),
    /// Unknown analyzer backend.
    #[error("Unknown analyzer: {0}")]
    UnknownAnalyzer(String),
    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<aspector_core::Error> for AnalysisError {
    fn from(err: aspector_core::Error) -> Self {
        AnalysisError::Config(err.to_string())
    }
}

/// Result alias used across the analysis crate.
pub type AnalysisResult<T> = Result<T, AnalysisError>;
