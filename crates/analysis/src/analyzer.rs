use std::fmt;
use std::str::FromStr;

use aspector_core::{AspectSentiment, AspectorConfig};

use crate::error::{AnalysisError, AnalysisResult};
use crate::lexicon::LexiconAnalyzer;
use crate::ollama::OllamaAnalyzer;
use crate::transformer::TransformerAnalyzer;

/// Trait for aspect-level sentiment analyzers.
pub trait AspectAnalyzer: Send {
    /// Returns the name of the analyzer backend.
    fn name(&self) -> &str;
    /// Extract aspects from the text and classify each one.
    ///
    /// Empty or whitespace-only input returns an empty list.
    fn analyze(&mut self, text: &str) -> AnalysisResult<Vec<AspectSentiment>>;
}

/// Analyzer backends known to Aspector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalyzerKind {
    /// Deterministic rule-based scoring over a weighted lexicon.
    Lexicon,
    /// Local transformer sequence classifier.
    Transformer,
    /// Model served by a local Ollama instance.
    Ollama,
}

impl AnalyzerKind {
    /// Stable identifier used on the command line and in reports.
    pub fn id(&self) -> &'static str {
        match self {
            AnalyzerKind::Lexicon => "lexicon",
            AnalyzerKind::Transformer => "transformer",
            AnalyzerKind::Ollama => "ollama",
        }
    }

    /// All known backends, in registration order.
    pub fn all() -> [AnalyzerKind; 3] {
        [
            AnalyzerKind::Lexicon,
            AnalyzerKind::Transformer,
            AnalyzerKind::Ollama,
        ]
    }
}

impl fmt::Display for AnalyzerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for AnalyzerKind {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lexicon" => Ok(AnalyzerKind::Lexicon),
            "transformer" => Ok(AnalyzerKind::Transformer),
            "ollama" => Ok(AnalyzerKind::Ollama),
            other => Err(AnalysisError::UnknownAnalyzer(other.to_string())),
        }
    }
}

/// Build the analyzer backend for `kind`.
///
/// Construction is fail-fast: backends acquire their external resources here,
/// so a missing model or an unreachable server surfaces immediately instead
/// of on the first `analyze` call. Only the requested backend is built.
pub fn build_analyzer(
    kind: AnalyzerKind,
    config: &AspectorConfig,
) -> AnalysisResult<Box<dyn AspectAnalyzer>> {
    match kind {
        AnalyzerKind::Lexicon => Ok(Box::new(LexiconAnalyzer::new(config.lexicon.clone())?)),
        AnalyzerKind::Transformer => Ok(Box::new(TransformerAnalyzer::new(
            config.transformer.clone(),
        )?)),
        AnalyzerKind::Ollama => Ok(Box::new(OllamaAnalyzer::new(config.ollama.clone())?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_ids_round_trip() {
        for kind in AnalyzerKind::all() {
            let parsed: AnalyzerKind = kind.id().parse().expect("parse id");
            assert_eq!(parsed, kind);
        }
        assert_eq!(AnalyzerKind::Lexicon.to_string(), "lexicon");
    }

    #[test]
    fn test_kind_parse_is_case_insensitive() {
        let parsed: AnalyzerKind = " Transformer ".parse().expect("parse");
        assert_eq!(parsed, AnalyzerKind::Transformer);
    }

    #[test]
    fn test_kind_parse_rejects_unknown() {
        let result = "bayes".parse::<AnalyzerKind>();
        assert!(matches!(result, Err(AnalysisError::UnknownAnalyzer(_))));
    }

    #[test]
    fn test_build_lexicon_analyzer() {
        let config = AspectorConfig {
            data_dir: std::path::PathBuf::from("."),
            cache_dir: std::path::PathBuf::from("."),
            lexicon: Default::default(),
            transformer: Default::default(),
            ollama: Default::default(),
            evaluation: Default::default(),
        };

        let mut analyzer = build_analyzer(AnalyzerKind::Lexicon, &config).expect("build");
        assert_eq!(analyzer.name(), "lexicon");
        assert!(analyzer.analyze("   ").expect("analyze").is_empty());
    }
}
