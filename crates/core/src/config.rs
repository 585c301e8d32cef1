use crate::constants;
use crate::Error;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for Aspector.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AspectorConfig {
    /// Path to the data directory (datasets, reports).
    pub data_dir: PathBuf,

    /// Path to the cache directory (downloaded model artifacts).
    pub cache_dir: PathBuf,

    /// Rule-based analyzer configuration.
    pub lexicon: LexiconConfig,

    /// Local transformer analyzer configuration.
    pub transformer: TransformerConfig,

    /// Ollama analyzer configuration.
    pub ollama: OllamaConfig,

    /// Evaluation harness configuration.
    pub evaluation: EvaluationConfig,
}

/// Rule-based analyzer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexiconConfig {
    /// Multiplier applied by intensifying adverbs.
    pub intensifier_boost: f64,

    /// Multiplier applied by softening adverbs.
    pub softener_damping: f64,

    /// Token window for adverb modifiers around an aspect.
    pub adverb_window: usize,

    /// Token window for pairing aspects with opinion words.
    pub opinion_window: usize,

    /// Token window scanned backwards for negators.
    pub negation_window: usize,
}

/// Local transformer analyzer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformerConfig {
    /// Hugging Face model id of the sequence classification checkpoint.
    pub model_id: String,

    /// Run inference on a CUDA device when compiled with GPU support.
    pub enable_gpu: bool,
}

/// Ollama analyzer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Model tag served by the Ollama instance.
    pub model: String,

    /// Base URL of the Ollama server.
    pub host: String,

    /// Sampling temperature for chat requests.
    pub temperature: f64,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Number of re-attempts after a failed request.
    pub max_retries: u32,
}

/// Evaluation harness configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Default gold dataset path.
    pub dataset_path: PathBuf,

    /// Print a result line per sample during evaluation.
    pub per_sample_output: bool,
}

impl AspectorConfig {
    /// Create default configuration.
    pub fn default() -> Result<Self> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| Error::Config("Cannot find data directory".to_string()))?
            .join("aspector");

        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| Error::Config("Cannot find cache directory".to_string()))?
            .join("aspector");

        Ok(Self {
            data_dir,
            cache_dir,
            lexicon: LexiconConfig::default(),
            transformer: TransformerConfig::default(),
            ollama: OllamaConfig::default(),
            evaluation: EvaluationConfig::default(),
        })
    }

    /// Load configuration from file.
    pub fn load(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::FileSystem(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Parse(format!("Failed to parse config: {}", e)))?;

        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save configuration to file.
    pub fn save(&self, path: &PathBuf) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Parse(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| Error::FileSystem(format!("Failed to write config file: {}", e)))
    }
}

impl Default for LexiconConfig {
    fn default() -> Self {
        Self {
            intensifier_boost: constants::DEFAULT_INTENSIFIER_BOOST,
            softener_damping: constants::DEFAULT_SOFTENER_DAMPING,
            adverb_window: constants::DEFAULT_ADVERB_WINDOW,
            opinion_window: constants::DEFAULT_OPINION_WINDOW,
            negation_window: constants::DEFAULT_NEGATION_WINDOW,
        }
    }
}

impl Default for TransformerConfig {
    fn default() -> Self {
        Self {
            model_id: constants::DEFAULT_TRANSFORMER_MODEL.to_string(),
            enable_gpu: false,
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            model: constants::DEFAULT_OLLAMA_MODEL.to_string(),
            host: constants::DEFAULT_OLLAMA_HOST.to_string(),
            temperature: constants::DEFAULT_OLLAMA_TEMPERATURE,
            timeout_secs: constants::DEFAULT_OLLAMA_TIMEOUT,
            max_retries: constants::DEFAULT_MAX_RETRIES,
        }
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(constants::DEFAULT_DATASET_PATH),
            per_sample_output: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_defaults() {
        let lexicon = LexiconConfig::default();
        assert!((lexicon.intensifier_boost - 1.2).abs() < 1e-9);
        assert!((lexicon.softener_damping - 0.8).abs() < 1e-9);
        assert_eq!(lexicon.opinion_window, 4);

        let ollama = OllamaConfig::default();
        assert_eq!(ollama.host, "http://localhost:11434");
        assert_eq!(ollama.max_retries, 2);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = AspectorConfig {
            data_dir: PathBuf::from("/tmp/aspector-data"),
            cache_dir: PathBuf::from("/tmp/aspector-cache"),
            lexicon: LexiconConfig::default(),
            transformer: TransformerConfig::default(),
            ollama: OllamaConfig::default(),
            evaluation: EvaluationConfig::default(),
        };
        config.ollama.model = "llama3.2:3b".to_string();

        let path = std::env::temp_dir().join("aspector-config-test.toml");
        config.save(&path).expect("save config");

        let loaded = AspectorConfig::load(&path).expect("load config");
        assert_eq!(loaded.ollama.model, "llama3.2:3b");
        assert_eq!(loaded.transformer.model_id, config.transformer.model_id);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_rejects_invalid_toml() {
        let path = std::env::temp_dir().join("aspector-config-invalid.toml");
        std::fs::write(&path, "not valid = [toml").expect("write file");

        let result = AspectorConfig::load(&path);
        assert!(matches!(result, Err(Error::Parse(_))));

        std::fs::remove_file(&path).ok();
    }
}
