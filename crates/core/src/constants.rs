//! Application constants and scoring defaults.

/// Normalization constant for compound scores: v / sqrt(v^2 + ALPHA).
pub const COMPOUND_ALPHA: f64 = 15.0;

/// Compound scores above this threshold classify as positive.
pub const POSITIVE_THRESHOLD: f64 = 0.05;

/// Compound scores below this threshold classify as negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

/// Default multiplier applied by intensifying adverbs.
pub const DEFAULT_INTENSIFIER_BOOST: f64 = 1.2;

/// Default multiplier applied by softening adverbs.
pub const DEFAULT_SOFTENER_DAMPING: f64 = 0.8;

/// Default token window for adverb modifiers around an aspect.
pub const DEFAULT_ADVERB_WINDOW: usize = 3;

/// Default token window for pairing aspects with opinion words.
pub const DEFAULT_OPINION_WINDOW: usize = 4;

/// Default token window scanned backwards for negators.
pub const DEFAULT_NEGATION_WINDOW: usize = 3;

/// Minimum character length for an aspect candidate.
pub const MIN_ASPECT_LEN: usize = 3;

/// Default transformer checkpoint on the Hugging Face hub.
pub const DEFAULT_TRANSFORMER_MODEL: &str = "clapAI/modernBERT-base-multilingual-sentiment";

/// Default Ollama server address.
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";

/// Default Ollama model tag.
pub const DEFAULT_OLLAMA_MODEL: &str = "deepseek-v3.1:671b-cloud";

/// Default sampling temperature for LLM requests.
pub const DEFAULT_OLLAMA_TEMPERATURE: f64 = 0.2;

/// Default request timeout for LLM calls in seconds.
pub const DEFAULT_OLLAMA_TIMEOUT: u64 = 30;

/// Timeout for the Ollama reachability check in seconds.
pub const OLLAMA_HEALTH_TIMEOUT: u64 = 5;

/// Default number of re-attempts after a failed LLM request.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Base backoff delay between LLM re-attempts in milliseconds.
pub const RETRY_BACKOFF_MS: u64 = 500;

/// Default gold dataset path, relative to the working directory.
pub const DEFAULT_DATASET_PATH: &str = "data/test_samples.json";

/// Maximum dataset file size accepted by the loader (10 MB).
pub const MAX_DATASET_FILE_SIZE: u64 = 10 * 1024 * 1024;
