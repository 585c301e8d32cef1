use serde::{Deserialize, Serialize};

use crate::constants::{NEGATIVE_THRESHOLD, POSITIVE_THRESHOLD};

/// Sentiment polarity assigned to an aspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    /// Favorable opinion.
    Positive,

    /// Unfavorable opinion.
    Negative,

    /// No clear polarity either way.
    Neutral,
}

impl Sentiment {
    /// All polarity classes, in display order.
    pub fn all() -> [Sentiment; 3] {
        [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral]
    }

    /// Canonical lowercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }

    /// Parse a label case-insensitively, ignoring surrounding whitespace.
    pub fn from_label(label: &str) -> Option<Sentiment> {
        match label.trim().to_lowercase().as_str() {
            "positive" => Some(Sentiment::Positive),
            "negative" => Some(Sentiment::Negative),
            "neutral" => Some(Sentiment::Neutral),
            _ => None,
        }
    }

    /// Classify a compound score using the shared polarity thresholds.
    pub fn from_compound(score: f64) -> Sentiment {
        if score > POSITIVE_THRESHOLD {
            Sentiment::Positive
        } else if score < NEGATIVE_THRESHOLD {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw sub-scores behind a lexicon classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Negative mass.
    #[serde(rename = "neg")]
    pub negative: f64,

    /// Neutral mass.
    #[serde(rename = "neu")]
    pub neutral: f64,

    /// Positive mass.
    #[serde(rename = "pos")]
    pub positive: f64,

    /// Normalized signed score in [-1, 1].
    pub compound: f64,
}

impl ScoreBreakdown {
    /// Build a breakdown from a signed compound score.
    pub fn from_compound(compound: f64) -> Self {
        let positive = compound.max(0.0);
        let negative = (-compound).max(0.0);

        Self {
            negative,
            neutral: (1.0 - positive - negative).max(0.0),
            positive,
            compound,
        }
    }
}

/// One aspect together with its classified sentiment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AspectSentiment {
    /// Aspect term as it appears in the analyzed text.
    pub aspect: String,

    /// Classified polarity.
    pub sentiment: Sentiment,

    /// Classifier confidence in [0, 1].
    pub confidence: f64,

    /// Byte range of the aspect in the analyzed text, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_span: Option<(usize, usize)>,

    /// Raw sub-scores, emitted by the lexicon backend only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ScoreBreakdown>,
}

impl AspectSentiment {
    /// Create a record. Confidence is clamped to [0, 1].
    pub fn new(aspect: impl Into<String>, sentiment: Sentiment, confidence: f64) -> Self {
        Self {
            aspect: aspect.into(),
            sentiment,
            confidence: confidence.clamp(0.0, 1.0),
            text_span: None,
            breakdown: None,
        }
    }

    /// Attach the byte range of the aspect in the analyzed text.
    pub fn with_span(mut self, start: usize, end: usize) -> Self {
        self.text_span = Some((start, end));
        self
    }

    /// Attach raw sub-scores.
    pub fn with_breakdown(mut self, breakdown: ScoreBreakdown) -> Self {
        self.breakdown = Some(breakdown);
        self
    }
}

/// Expected annotation for one aspect in a gold dataset record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldAspect {
    /// Expected aspect term.
    pub aspect: String,

    /// Expected polarity.
    pub sentiment: Sentiment,
}

/// One gold dataset record: input text plus its expected annotations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSample {
    /// Input text.
    pub text: String,

    /// Expected aspect annotations.
    pub expected: Vec<GoldAspect>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_labels() {
        assert_eq!(Sentiment::Positive.as_str(), "positive");
        assert_eq!(Sentiment::Negative.to_string(), "negative");
        assert_eq!(
            serde_json::to_string(&Sentiment::Neutral).expect("serialize"),
            "\"neutral\""
        );

        let parsed: Sentiment = serde_json::from_str("\"positive\"").expect("deserialize");
        assert_eq!(parsed, Sentiment::Positive);
    }

    #[test]
    fn test_sentiment_from_label() {
        assert_eq!(Sentiment::from_label("Positive"), Some(Sentiment::Positive));
        assert_eq!(Sentiment::from_label(" NEGATIVE "), Some(Sentiment::Negative));
        assert_eq!(Sentiment::from_label("neutral"), Some(Sentiment::Neutral));
        assert_eq!(Sentiment::from_label("mixed"), None);
        assert_eq!(Sentiment::from_label(""), None);
    }

    #[test]
    fn test_sentiment_from_compound_thresholds() {
        assert_eq!(Sentiment::from_compound(0.4), Sentiment::Positive);
        assert_eq!(Sentiment::from_compound(-0.4), Sentiment::Negative);
        assert_eq!(Sentiment::from_compound(0.05), Sentiment::Neutral);
        assert_eq!(Sentiment::from_compound(-0.05), Sentiment::Neutral);
        assert_eq!(Sentiment::from_compound(0.0), Sentiment::Neutral);
    }

    #[test]
    fn test_confidence_clamped() {
        let high = AspectSentiment::new("battery", Sentiment::Positive, 1.3);
        assert_eq!(high.confidence, 1.0);

        let low = AspectSentiment::new("battery", Sentiment::Negative, -0.2);
        assert_eq!(low.confidence, 0.0);
    }

    #[test]
    fn test_breakdown_from_compound() {
        let pos = ScoreBreakdown::from_compound(0.6);
        assert!((pos.positive - 0.6).abs() < 1e-9);
        assert_eq!(pos.negative, 0.0);
        assert!((pos.neutral - 0.4).abs() < 1e-9);

        let neg = ScoreBreakdown::from_compound(-0.25);
        assert_eq!(neg.positive, 0.0);
        assert!((neg.negative - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_optional_fields_skipped() {
        let plain = AspectSentiment::new("screen", Sentiment::Neutral, 0.0);
        let json = serde_json::to_string(&plain).expect("serialize");
        assert!(!json.contains("text_span"));
        assert!(!json.contains("breakdown"));

        let spanned = plain.with_span(4, 10);
        let json = serde_json::to_string(&spanned).expect("serialize");
        assert!(json.contains("text_span"));
    }

    #[test]
    fn test_dataset_sample_deserialization() {
        let raw = r#"{
            "text": "The pizza was great.",
            "expected": [{ "aspect": "pizza", "sentiment": "positive" }]
        }"#;

        let sample: DatasetSample = serde_json::from_str(raw).expect("deserialize");
        assert_eq!(sample.expected.len(), 1);
        assert_eq!(sample.expected[0].aspect, "pizza");
        assert_eq!(sample.expected[0].sentiment, Sentiment::Positive);
    }
}
