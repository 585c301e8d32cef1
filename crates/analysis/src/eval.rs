use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;

use once_cell::sync::Lazy;
use serde::Serialize;
use tracing::{info, warn};

use aspector_core::constants::MAX_DATASET_FILE_SIZE;
use aspector_core::{AspectSentiment, DatasetSample, Sentiment};

use crate::analyzer::AspectAnalyzer;
use crate::error::{AnalysisError, AnalysisResult};

/// Tokens ignored when comparing aspect names. Gold annotations often
/// carry article or category noise ("the app", "delivery team") that
/// should not defeat a match.
static FILLER_TOKENS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["the", "a", "an", "app", "system", "team", "product", "item"]
        .into_iter()
        .collect()
});

/// Loads and validates a gold dataset from disk.
pub fn load_dataset(path: &Path) -> AnalysisResult<Vec<DatasetSample>> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        AnalysisError::Dataset(format!("cannot read {}: {}", path.display(), e))
    })?;
    if metadata.len() > MAX_DATASET_FILE_SIZE {
        return Err(AnalysisError::Dataset(format!(
            "{} is larger than the {} byte dataset limit",
            path.display(),
            MAX_DATASET_FILE_SIZE
        )));
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        AnalysisError::Dataset(format!("cannot read {}: {}", path.display(), e))
    })?;

    parse_dataset(&content)
}

/// Parses dataset JSON: a non-empty array of samples, each with non-blank
/// text and at least one non-blank expected aspect.
pub fn parse_dataset(content: &str) -> AnalysisResult<Vec<DatasetSample>> {
    let samples: Vec<DatasetSample> = serde_json::from_str(content)
        .map_err(|e| AnalysisError::Dataset(format!("invalid dataset JSON: {}", e)))?;

    if samples.is_empty() {
        return Err(AnalysisError::Dataset("dataset contains no samples".to_string()));
    }

    for (index, sample) in samples.iter().enumerate() {
        if sample.text.trim().is_empty() {
            return Err(AnalysisError::Dataset(format!(
                "sample {} has empty text",
                index
            )));
        }
        if sample.expected.is_empty() {
            return Err(AnalysisError::Dataset(format!(
                "sample {} has no expected aspects",
                index
            )));
        }
        for gold in &sample.expected {
            if gold.aspect.trim().is_empty() {
                return Err(AnalysisError::Dataset(format!(
                    "sample {} has an empty expected aspect",
                    index
                )));
            }
        }
    }

    Ok(samples)
}

/// Canonicalizes an aspect name for comparison: lowercase, hyphens and
/// underscores to spaces, filler tokens removed. Falls back to the plain
/// lowercased form when every token is filler, so "app" stays matchable.
pub fn normalize_aspect(aspect: &str) -> String {
    let lowered = aspect.trim().to_lowercase().replace(['-', '_'], " ");
    let kept: Vec<&str> = lowered
        .split_whitespace()
        .filter(|token| !FILLER_TOKENS.contains(*token))
        .collect();

    if kept.is_empty() {
        lowered.split_whitespace().collect::<Vec<&str>>().join(" ")
    } else {
        kept.join(" ")
    }
}

/// Whether a predicted aspect counts as a hit for an expected one:
/// normalized equality or substring containment in either direction.
pub fn aspects_match(predicted: &str, expected: &str) -> bool {
    let predicted = normalize_aspect(predicted);
    let expected = normalize_aspect(expected);

    if predicted.is_empty() || expected.is_empty() {
        return false;
    }

    predicted == expected || predicted.contains(&expected) || expected.contains(&predicted)
}

/// One matched gold aspect with the polarity comparison.
#[derive(Debug, Clone, Serialize)]
pub struct AspectHit {
    /// Gold aspect name.
    pub aspect: String,

    /// Annotated polarity.
    pub expected: Sentiment,

    /// Polarity of the matching prediction.
    pub predicted: Sentiment,
}

impl AspectHit {
    /// Whether the predicted polarity agrees with the annotation.
    pub fn sentiment_correct(&self) -> bool {
        self.expected == self.predicted
    }
}

/// Per-sample evaluation record.
#[derive(Debug, Clone, Serialize)]
pub struct SampleOutcome {
    /// Input text.
    pub text: String,

    /// Everything the analyzer returned for this sample.
    pub predictions: Vec<AspectSentiment>,

    /// Gold aspects that matched a prediction.
    pub hits: Vec<AspectHit>,

    /// Gold aspects with no matching prediction.
    pub misses: Vec<String>,

    /// Analyzer error, when the sample could not be analyzed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Wall-clock time spent on this sample.
    pub elapsed_ms: u64,
}

/// Aggregated evaluation results for one analyzer over one dataset.
#[derive(Debug, Clone, Serialize)]
pub struct EvalReport {
    /// Analyzer that produced the predictions.
    pub analyzer: String,

    /// Dataset the report was computed on.
    pub dataset: String,

    /// RFC 3339 timestamp of the run.
    pub generated_at: String,

    /// Number of samples in the dataset.
    pub total_samples: usize,

    /// Samples the analyzer returned an error for.
    pub failed_samples: usize,

    /// Gold aspects across all successfully analyzed samples.
    pub total_expected: usize,

    /// Gold aspects matched by some prediction.
    pub matched_aspects: usize,

    /// Matched aspects whose polarity also agreed.
    pub correct_sentiments: usize,

    /// Predictions emitted across all successfully analyzed samples.
    pub total_predictions: usize,

    /// Wall-clock time for the whole run.
    pub elapsed_ms: u64,

    /// Per-sample records, in dataset order.
    pub outcomes: Vec<SampleOutcome>,
}

impl EvalReport {
    /// Fraction of gold aspects matched by a prediction.
    pub fn aspect_accuracy(&self) -> f64 {
        if self.total_expected == 0 {
            0.0
        } else {
            self.matched_aspects as f64 / self.total_expected as f64
        }
    }

    /// Fraction of gold aspects matched with the correct polarity.
    pub fn sentiment_accuracy(&self) -> f64 {
        if self.total_expected == 0 {
            0.0
        } else {
            self.correct_sentiments as f64 / self.total_expected as f64
        }
    }

    /// Mean per-sample wall-clock time.
    pub fn mean_sample_ms(&self) -> f64 {
        if self.outcomes.is_empty() {
            0.0
        } else {
            let total: u64 = self.outcomes.iter().map(|o| o.elapsed_ms).sum();
            total as f64 / self.outcomes.len() as f64
        }
    }
}

/// Runs the analyzer over every sample and scores it against the gold
/// annotations.
///
/// A sample the analyzer errors on counts as failed and its gold aspects
/// join no denominator. An empty prediction list is a valid answer: its
/// gold aspects count as misses. Each gold aspect matches the first
/// prediction that satisfies [`aspects_match`]; predictions are not
/// consumed, so one prediction may satisfy several golds.
pub fn evaluate(
    analyzer: &mut dyn AspectAnalyzer,
    samples: &[DatasetSample],
    dataset_name: &str,
) -> EvalReport {
    let analyzer_name = analyzer.name().to_string();
    let started = Instant::now();

    let mut outcomes = Vec::with_capacity(samples.len());
    let mut failed_samples = 0usize;
    let mut total_expected = 0usize;
    let mut matched_aspects = 0usize;
    let mut correct_sentiments = 0usize;
    let mut total_predictions = 0usize;

    for (index, sample) in samples.iter().enumerate() {
        let sample_started = Instant::now();
        let predictions = match analyzer.analyze(&sample.text) {
            Ok(predictions) => predictions,
            Err(e) => {
                warn!("Analyzer failed on sample {}: {}", index, e);
                failed_samples += 1;
                outcomes.push(SampleOutcome {
                    text: sample.text.clone(),
                    predictions: Vec::new(),
                    hits: Vec::new(),
                    misses: Vec::new(),
                    error: Some(e.to_string()),
                    elapsed_ms: sample_started.elapsed().as_millis() as u64,
                });
                continue;
            }
        };
        total_predictions += predictions.len();

        let mut hits = Vec::new();
        let mut misses = Vec::new();
        for gold in &sample.expected {
            total_expected += 1;
            match predictions
                .iter()
                .find(|p| aspects_match(&p.aspect, &gold.aspect))
            {
                Some(matched) => {
                    matched_aspects += 1;
                    if matched.sentiment == gold.sentiment {
                        correct_sentiments += 1;
                    }
                    hits.push(AspectHit {
                        aspect: gold.aspect.clone(),
                        expected: gold.sentiment,
                        predicted: matched.sentiment,
                    });
                }
                None => misses.push(gold.aspect.clone()),
            }
        }

        outcomes.push(SampleOutcome {
            text: sample.text.clone(),
            predictions,
            hits,
            misses,
            error: None,
            elapsed_ms: sample_started.elapsed().as_millis() as u64,
        });
    }

    let report = EvalReport {
        analyzer: analyzer_name,
        dataset: dataset_name.to_string(),
        generated_at: chrono::Utc::now().to_rfc3339(),
        total_samples: samples.len(),
        failed_samples,
        total_expected,
        matched_aspects,
        correct_sentiments,
        total_predictions,
        elapsed_ms: started.elapsed().as_millis() as u64,
        outcomes,
    };

    info!(
        "Evaluated {} samples with {}: aspect accuracy {:.3}, sentiment accuracy {:.3}",
        report.total_samples,
        report.analyzer,
        report.aspect_accuracy(),
        report.sentiment_accuracy()
    );

    report
}
