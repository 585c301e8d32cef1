use std::collections::{HashMap, HashSet};

use candle_core::{DType, Device, Tensor, D};
use candle_nn::{ops::softmax, VarBuilder};
use candle_transformers::models::modernbert::{Config, ModernBertForSequenceClassification};
use hf_hub::{api::sync::Api, Repo, RepoType};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tokenizers::Tokenizer;
use tracing::{info, warn};

use aspector_core::config::TransformerConfig;
use aspector_core::constants::MIN_ASPECT_LEN;
use aspector_core::{AspectSentiment, Sentiment};

use crate::analyzer::AspectAnalyzer;
use crate::error::{AnalysisError, AnalysisResult};

static WORD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z']+").expect("valid word pattern"));

/// Words never proposed as aspect candidates.
static EXTRACTION_STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "and", "was", "were", "are", "but", "this", "that", "these", "those", "there",
        "here", "what", "which", "with", "for", "have", "has", "had", "not", "you", "your",
        "they", "them", "its", "our", "his", "her", "very", "really", "quite", "just", "from",
        "into", "about", "been", "being", "would", "could", "should",
    ]
    .into_iter()
    .collect()
});

/// Label maps read from the checkpoint's `config.json` alongside the
/// architecture config.
#[derive(Deserialize)]
struct ClassifierConfigJson {
    #[serde(default)]
    id2label: HashMap<String, String>,
}

/// Analyzer running a local ModernBERT sequence-pair classifier.
///
/// Aspects are extracted heuristically, then each (text, aspect) pair is
/// classified on-device. The checkpoint downloads from the Hugging Face hub
/// on first use and is cached by `hf-hub` afterwards.
pub struct TransformerAnalyzer {
    model: ModernBertForSequenceClassification,
    tokenizer: Tokenizer,
    id2label: HashMap<String, String>,
    device: Device,
    name_str: String,
}

impl TransformerAnalyzer {
    /// Downloads (or reuses) the configured checkpoint and prepares it for
    /// inference. Fails fast when the model cannot be fetched or loaded.
    pub fn new(config: TransformerConfig) -> AnalysisResult<Self> {
        let device = if config.enable_gpu {
            match Device::new_cuda(0) {
                Ok(device) => device,
                Err(e) => {
                    warn!("CUDA unavailable ({}), falling back to CPU", e);
                    Device::Cpu
                }
            }
        } else {
            Device::Cpu
        };

        info!("Loading transformer checkpoint {}", config.model_id);
        let (model, id2label) = load_classifier(&config.model_id, &device)?;
        let tokenizer = load_tokenizer(&config.model_id)?;

        if id2label.is_empty() {
            return Err(AnalysisError::ModelLoading(format!(
                "checkpoint {} has no id2label map in config.json",
                config.model_id
            )));
        }

        Ok(Self {
            model,
            tokenizer,
            id2label,
            device,
            name_str: "transformer".to_string(),
        })
    }

    /// Classifies a single (text, aspect) pair, returning the predicted
    /// label and its softmax probability.
    pub fn classify_pair(&self, text: &str, aspect: &str) -> AnalysisResult<(String, f64)> {
        let encoding = self
            .tokenizer
            .encode((text, aspect), true)
            .map_err(|e| AnalysisError::Tokenization(e.to_string()))?;

        let (pred_id, probs) = self
            .forward_scores(&encoding)
            .map_err(|e| AnalysisError::Inference(e.to_string()))?;

        let label = self
            .id2label
            .get(&pred_id.to_string())
            .ok_or_else(|| {
                AnalysisError::Inference(format!("predicted id {} not in id2label", pred_id))
            })?
            .clone();
        let confidence = probs.get(pred_id as usize).copied().unwrap_or(0.0) as f64;

        Ok((label, confidence))
    }

    fn forward_scores(
        &self,
        encoding: &tokenizers::Encoding,
    ) -> candle_core::Result<(u32, Vec<f32>)> {
        let input_ids = Tensor::new(encoding.get_ids(), &self.device)?.unsqueeze(0)?;
        let attention_mask =
            Tensor::new(encoding.get_attention_mask(), &self.device)?.unsqueeze(0)?;

        let logits = self.model.forward(&input_ids, &attention_mask)?;
        let pred_id = logits.argmax(D::Minus1)?.squeeze(0)?.to_scalar::<u32>()?;
        let probs = softmax(&logits, D::Minus1)?.squeeze(0)?.to_vec1::<f32>()?;

        Ok((pred_id, probs))
    }

    /// Classifies the given aspects against the text. Pairs that fail to
    /// classify or come back with an unknown label are skipped with a
    /// warning rather than failing the whole call.
    pub fn analyze_with_aspects(
        &self,
        text: &str,
        aspects: &[String],
    ) -> AnalysisResult<Vec<AspectSentiment>> {
        let mut results = Vec::new();

        for aspect in aspects {
            if aspect.trim().is_empty() {
                continue;
            }

            let (label, confidence) = match self.classify_pair(text, aspect) {
                Ok(pair) => pair,
                Err(e) => {
                    warn!("Classification failed for aspect '{}': {}", aspect, e);
                    continue;
                }
            };

            let Some(sentiment) = Sentiment::from_label(&label) else {
                warn!("Model returned unknown label '{}' for '{}'", label, aspect);
                continue;
            };

            results.push(AspectSentiment::new(aspect.clone(), sentiment, confidence));
        }

        results.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(results)
    }
}

impl AspectAnalyzer for TransformerAnalyzer {
    fn name(&self) -> &str {
        &self.name_str
    }

    fn analyze(&mut self, text: &str) -> AnalysisResult<Vec<AspectSentiment>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let aspects = extract_aspects(text);
        if aspects.is_empty() {
            return Ok(Vec::new());
        }

        self.analyze_with_aspects(text, &aspects)
    }
}

/// Proposes aspect candidates from raw text: lowercased words, minus
/// stopwords, contractions, and anything shorter than the minimum length.
/// First occurrence wins, later duplicates are dropped.
pub fn extract_aspects(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut aspects = Vec::new();

    for found in WORD_PATTERN.find_iter(text) {
        let word = found.as_str().to_lowercase();
        if word.chars().count() < MIN_ASPECT_LEN
            || EXTRACTION_STOPWORDS.contains(word.as_str())
            || word.ends_with("n't")
        {
            continue;
        }
        if seen.insert(word.clone()) {
            aspects.push(word);
        }
    }

    aspects
}

fn load_classifier(
    model_id: &str,
    device: &Device,
) -> AnalysisResult<(ModernBertForSequenceClassification, HashMap<String, String>)> {
    let api = Api::new().map_err(|e| AnalysisError::ModelLoading(e.to_string()))?;
    let repo = api.repo(Repo::new(model_id.to_string(), RepoType::Model));

    let config_path = repo
        .get("config.json")
        .map_err(|e| AnalysisError::ModelLoading(e.to_string()))?;
    let weights_path = repo
        .get("model.safetensors")
        .or_else(|_| repo.get("pytorch_model.bin"))
        .map_err(|e| AnalysisError::ModelLoading(e.to_string()))?;

    let config_str = std::fs::read_to_string(&config_path)?;
    let config: Config = serde_json::from_str(&config_str)
        .map_err(|e| AnalysisError::ModelLoading(format!("bad config.json: {}", e)))?;
    let class_cfg: ClassifierConfigJson = serde_json::from_str(&config_str)
        .map_err(|e| AnalysisError::ModelLoading(format!("bad label maps: {}", e)))?;

    let vb = load_weights(&weights_path, device)
        .map_err(|e| AnalysisError::ModelLoading(e.to_string()))?;
    let model = ModernBertForSequenceClassification::load(vb, &config)
        .map_err(|e| AnalysisError::ModelLoading(e.to_string()))?;

    Ok((model, class_cfg.id2label))
}

// Safetensors loading memory-maps the weight file.
#[allow(unsafe_code)]
fn load_weights(
    weights_path: &std::path::Path,
    device: &Device,
) -> candle_core::Result<VarBuilder<'static>> {
    if weights_path.extension().is_some_and(|e| e == "safetensors") {
        unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device) }
    } else {
        VarBuilder::from_pth(weights_path, DType::F32, device)
    }
}

fn load_tokenizer(model_id: &str) -> AnalysisResult<Tokenizer> {
    let api = Api::new().map_err(|e| AnalysisError::ModelLoading(e.to_string()))?;
    let repo = api.repo(Repo::new(model_id.to_string(), RepoType::Model));
    let tokenizer_path = repo
        .get("tokenizer.json")
        .map_err(|e| AnalysisError::ModelLoading(e.to_string()))?;

    Tokenizer::from_file(tokenizer_path)
        .map_err(|e| AnalysisError::ModelLoading(format!("failed to load tokenizer: {}", e)))
}
