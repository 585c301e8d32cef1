//! CLI application entry point and configuration.
//!
//! This module provides the main CLI application logic, including argument parsing,
//! configuration loading, and command dispatch.

use crate::commands::{
    AnalyzeArgs, AnalyzerChoice, Cli, Commands, CompareArgs, DatasetArgs, DatasetCommand,
    EvalArgs, OutputFormat,
};
use crate::error::{CliError, Result};
use aspector_analysis::analyzer::{build_analyzer, AnalyzerKind, AspectAnalyzer};
use aspector_analysis::eval::{evaluate, load_dataset, EvalReport, SampleOutcome};
use aspector_analysis::transformer::TransformerAnalyzer;
use aspector_core::{AspectSentiment, AspectorConfig, DatasetSample, Sentiment};
use clap::Parser;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Configuration for the CLI application.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Path to configuration file.
    pub config_path: Option<PathBuf>,
    /// Logging verbosity level.
    pub verbosity: u8,
    /// Analyzer and evaluation settings.
    pub settings: AspectorConfig,
}

/// Main CLI application.
#[derive(Debug)]
pub struct App {
    /// Application configuration.
    pub config: AppConfig,
    /// Parsed CLI arguments.
    pub cli: Cli,
}

impl App {
    /// Create a new application instance from command line arguments.
    pub fn new() -> Result<Self> {
        let cli = Cli::parse();
        let config = Self::load_config(&cli)?;
        Ok(Self { config, cli })
    }

    /// Load configuration from file and environment.
    fn load_config(cli: &Cli) -> Result<AppConfig> {
        let mut config = AppConfig::default();
        config.verbosity = cli.verbose;

        // Load configuration file if specified
        if let Some(config_path) = &cli.config {
            if config_path.exists() {
                config.settings = AspectorConfig::load(config_path)?;
                config.config_path = Some(config_path.clone());
            } else {
                return Err(CliError::Config(format!(
                    "Configuration file not found: {}",
                    config_path.display()
                )));
            }
        } else {
            config.settings = AspectorConfig::default()?;
        }

        // Override with environment variables
        if let Ok(host) = std::env::var("ASPECTOR_OLLAMA_HOST") {
            config.settings.ollama.host = host;
        }

        Ok(config)
    }

    /// Run the application.
    pub fn run(self) -> Result<()> {
        // Set up logging based on verbosity
        self.setup_logging();

        // Dispatch command
        match &self.cli.command {
            Commands::Analyze(args) => self.handle_analyze(args),
            Commands::Eval(args) => self.handle_eval(args),
            Commands::Compare(args) => self.handle_compare(args),
            Commands::Dataset(args) => self.handle_dataset(args),
        }
    }

    /// Set up logging based on verbosity level.
    fn setup_logging(&self) {
        let level = match self.config.verbosity {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        env_logger::Builder::new()
            .filter_level(level)
            .format_module_path(false)
            .format_target(false)
            .format_timestamp(None)
            .try_init()
            .ok(); // Ignore errors if logger already initialized
    }

    fn handle_analyze(&self, args: &AnalyzeArgs) -> Result<()> {
        if !args.aspects.is_empty() && args.analyzer != AnalyzerChoice::Transformer {
            return Err(CliError::Argument(format!(
                "--aspects is only supported by the transformer analyzer, not '{}'",
                args.analyzer
            )));
        }

        let settings = resolve_settings(
            &self.config.settings,
            &args.analyzer,
            args.model.as_deref(),
            args.host.as_deref(),
        )?;

        let results = if args.aspects.is_empty() {
            let mut analyzer = build_analyzer(analyzer_kind(&args.analyzer), &settings)?;
            analyzer.analyze(&args.text)?
        } else {
            let analyzer = TransformerAnalyzer::new(settings.transformer.clone())?;
            analyzer.analyze_with_aspects(&args.text, &args.aspects)?
        };

        print_analysis(&args.analyzer.to_string(), &args.text, &results, &args.format)
    }

    fn handle_eval(&self, args: &EvalArgs) -> Result<()> {
        let settings = resolve_settings(
            &self.config.settings,
            &args.analyzer,
            args.model.as_deref(),
            args.host.as_deref(),
        )?;

        let dataset_path = resolve_dataset_path(&args.dataset, &settings);
        let samples = apply_limit(load_dataset(&dataset_path)?, args.limit);

        let mut analyzer = build_analyzer(analyzer_kind(&args.analyzer), &settings)?;
        let report = evaluate(
            analyzer.as_mut(),
            &samples,
            &dataset_path.display().to_string(),
        );

        print_report(&report, settings.evaluation.per_sample_output, &args.format)
    }

    fn handle_compare(&self, args: &CompareArgs) -> Result<()> {
        let dataset_path = resolve_dataset_path(&args.dataset, &self.config.settings);
        let samples = apply_limit(load_dataset(&dataset_path)?, args.limit);
        let dataset_name = dataset_path.display().to_string();

        let mut reports = Vec::new();
        for choice in &args.analyzers {
            let mut analyzer = match build_analyzer(analyzer_kind(choice), &self.config.settings) {
                Ok(analyzer) => analyzer,
                Err(e) => {
                    log::warn!("Skipping {} backend: {}", choice, e);
                    continue;
                }
            };
            reports.push(evaluate(analyzer.as_mut(), &samples, &dataset_name));
        }

        if reports.is_empty() {
            return Err(CliError::Command(
                "no analyzer backend could be built".to_string(),
            ));
        }

        print_comparison(&reports, &args.format)
    }

    fn handle_dataset(&self, args: &DatasetArgs) -> Result<()> {
        match &args.command {
            DatasetCommand::Validate { path } => {
                let dataset_path = resolve_dataset_path(path, &self.config.settings);
                let samples = load_dataset(&dataset_path)?;
                let gold_aspects: usize = samples.iter().map(|s| s.expected.len()).sum();
                println!(
                    "{}: OK ({} samples, {} gold aspects)",
                    dataset_path.display(),
                    samples.len(),
                    gold_aspects
                );
                Ok(())
            }
            DatasetCommand::Stats { path, format } => {
                let dataset_path = resolve_dataset_path(path, &self.config.settings);
                let samples = load_dataset(&dataset_path)?;
                let stats = DatasetStats::collect(&dataset_path, &samples);
                print_dataset_stats(&stats, format)
            }
        }
    }
}

/// Per-analyzer summary row of a comparison run.
#[derive(Debug, Serialize)]
struct CompareSummary {
    analyzer: String,
    aspect_accuracy: f64,
    sentiment_accuracy: f64,
    failed_samples: usize,
    mean_sample_ms: f64,
}

impl CompareSummary {
    fn from_report(report: &EvalReport) -> Self {
        Self {
            analyzer: report.analyzer.clone(),
            aspect_accuracy: report.aspect_accuracy(),
            sentiment_accuracy: report.sentiment_accuracy(),
            failed_samples: report.failed_samples,
            mean_sample_ms: report.mean_sample_ms(),
        }
    }
}

/// Aggregate statistics over one dataset file.
#[derive(Debug, Serialize)]
struct DatasetStats {
    dataset: String,
    samples: usize,
    gold_aspects: usize,
    positive: usize,
    negative: usize,
    neutral: usize,
    unique_aspects: usize,
    mean_aspects_per_sample: f64,
}

impl DatasetStats {
    fn collect(path: &Path, samples: &[DatasetSample]) -> Self {
        let mut positive = 0;
        let mut negative = 0;
        let mut neutral = 0;
        let mut gold_aspects = 0;
        let mut unique = HashSet::new();

        for sample in samples {
            for gold in &sample.expected {
                gold_aspects += 1;
                unique.insert(gold.aspect.to_lowercase());
                match gold.sentiment {
                    Sentiment::Positive => positive += 1,
                    Sentiment::Negative => negative += 1,
                    Sentiment::Neutral => neutral += 1,
                }
            }
        }

        let mean_aspects_per_sample = if samples.is_empty() {
            0.0
        } else {
            gold_aspects as f64 / samples.len() as f64
        };

        Self {
            dataset: path.display().to_string(),
            samples: samples.len(),
            gold_aspects,
            positive,
            negative,
            neutral,
            unique_aspects: unique.len(),
            mean_aspects_per_sample,
        }
    }
}

/// Map the CLI backend selector onto the analysis crate's kind.
fn analyzer_kind(choice: &AnalyzerChoice) -> AnalyzerKind {
    match choice {
        AnalyzerChoice::Lexicon => AnalyzerKind::Lexicon,
        AnalyzerChoice::Transformer => AnalyzerKind::Transformer,
        AnalyzerChoice::Ollama => AnalyzerKind::Ollama,
    }
}

/// Apply per-command model and host overrides on top of the loaded settings.
fn resolve_settings(
    base: &AspectorConfig,
    analyzer: &AnalyzerChoice,
    model: Option<&str>,
    host: Option<&str>,
) -> Result<AspectorConfig> {
    let mut settings = base.clone();

    if let Some(model) = model {
        match analyzer {
            AnalyzerChoice::Transformer => settings.transformer.model_id = model.to_string(),
            AnalyzerChoice::Ollama => settings.ollama.model = model.to_string(),
            AnalyzerChoice::Lexicon => {
                return Err(CliError::Argument(
                    "--model is not supported by the lexicon analyzer".to_string(),
                ))
            }
        }
    }

    if let Some(host) = host {
        settings.ollama.host = host.to_string();
    }

    Ok(settings)
}

fn resolve_dataset_path(path: &Option<PathBuf>, settings: &AspectorConfig) -> PathBuf {
    path.clone()
        .unwrap_or_else(|| settings.evaluation.dataset_path.clone())
}

fn apply_limit(mut samples: Vec<DatasetSample>, limit: Option<usize>) -> Vec<DatasetSample> {
    if let Some(limit) = limit {
        samples.truncate(limit);
    }
    samples
}

fn print_analysis(
    analyzer: &str,
    text: &str,
    results: &[AspectSentiment],
    format: &OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "analyzer": analyzer,
                    "text": text,
                    "aspects": results,
                }))
                .map_err(|e| CliError::Parse(e.to_string()))?
            );
        }
        OutputFormat::Csv => {
            println!("aspect,sentiment,confidence");
            for result in results {
                println!(
                    "{},{},{:.4}",
                    csv_escape(&result.aspect),
                    result.sentiment,
                    result.confidence
                );
            }
        }
        OutputFormat::Text => {
            if results.is_empty() {
                println!("No aspects detected.");
                return Ok(());
            }
            println!("analyzer: {}", analyzer);
            println!("aspects: {}", results.len());
            println!();
            for result in results {
                println!(
                    "  {:<24} {:<10} {:.3}",
                    result.aspect,
                    result.sentiment.as_str(),
                    result.confidence
                );
            }
        }
    }
    Ok(())
}

fn print_report(report: &EvalReport, per_sample: bool, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(report).map_err(|e| CliError::Parse(e.to_string()))?
            );
        }
        OutputFormat::Csv => {
            println!("sample,expected,hits,correct,elapsed_ms,error");
            for (index, outcome) in report.outcomes.iter().enumerate() {
                let expected = outcome.hits.len() + outcome.misses.len();
                let correct = outcome
                    .hits
                    .iter()
                    .filter(|hit| hit.sentiment_correct())
                    .count();
                println!(
                    "{},{},{},{},{},{}",
                    index + 1,
                    expected,
                    outcome.hits.len(),
                    correct,
                    outcome.elapsed_ms,
                    csv_escape(outcome.error.as_deref().unwrap_or(""))
                );
            }
        }
        OutputFormat::Text => {
            if per_sample {
                for (index, outcome) in report.outcomes.iter().enumerate() {
                    print_outcome_line(index + 1, report.outcomes.len(), outcome);
                }
                println!();
            }
            println!("analyzer: {}", report.analyzer);
            println!("dataset: {}", report.dataset);
            println!(
                "samples: {} ({} failed)",
                report.total_samples, report.failed_samples
            );
            println!(
                "aspect accuracy: {} ({}/{})",
                format_pct(report.aspect_accuracy()),
                report.matched_aspects,
                report.total_expected
            );
            println!(
                "sentiment accuracy: {} ({}/{})",
                format_pct(report.sentiment_accuracy()),
                report.correct_sentiments,
                report.total_expected
            );
            println!("predictions: {}", report.total_predictions);
            println!(
                "elapsed: {} ms ({:.1} ms/sample)",
                report.elapsed_ms,
                report.mean_sample_ms()
            );
        }
    }
    Ok(())
}

fn print_outcome_line(index: usize, total: usize, outcome: &SampleOutcome) {
    if let Some(error) = &outcome.error {
        println!(
            "[{}/{}] failed: {}  '{}'",
            index,
            total,
            error,
            truncate_text(&outcome.text, 48)
        );
        return;
    }

    let expected = outcome.hits.len() + outcome.misses.len();
    let correct = outcome
        .hits
        .iter()
        .filter(|hit| hit.sentiment_correct())
        .count();
    println!(
        "[{}/{}] {}/{} aspects, {}/{} sentiments  '{}'",
        index,
        total,
        outcome.hits.len(),
        expected,
        correct,
        expected,
        truncate_text(&outcome.text, 48)
    );
}

fn print_comparison(reports: &[EvalReport], format: &OutputFormat) -> Result<()> {
    let summaries: Vec<CompareSummary> = reports.iter().map(CompareSummary::from_report).collect();

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&summaries)
                    .map_err(|e| CliError::Parse(e.to_string()))?
            );
        }
        OutputFormat::Csv => {
            println!("analyzer,aspect_accuracy,sentiment_accuracy,failed_samples,mean_sample_ms");
            for summary in &summaries {
                println!(
                    "{},{:.4},{:.4},{},{:.1}",
                    csv_escape(&summary.analyzer),
                    summary.aspect_accuracy,
                    summary.sentiment_accuracy,
                    summary.failed_samples,
                    summary.mean_sample_ms
                );
            }
        }
        OutputFormat::Text => {
            println!(
                "{:<14} {:>10} {:>12} {:>8} {:>12}",
                "analyzer", "aspect", "sentiment", "failed", "ms/sample"
            );
            for summary in &summaries {
                println!(
                    "{:<14} {:>10} {:>12} {:>8} {:>12.1}",
                    summary.analyzer,
                    format_pct(summary.aspect_accuracy),
                    format_pct(summary.sentiment_accuracy),
                    summary.failed_samples,
                    summary.mean_sample_ms
                );
            }
        }
    }
    Ok(())
}

fn print_dataset_stats(stats: &DatasetStats, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(stats).map_err(|e| CliError::Parse(e.to_string()))?
            );
        }
        OutputFormat::Csv => {
            println!(
                "dataset,samples,gold_aspects,positive,negative,neutral,unique_aspects,mean_aspects_per_sample"
            );
            println!(
                "{},{},{},{},{},{},{},{:.2}",
                csv_escape(&stats.dataset),
                stats.samples,
                stats.gold_aspects,
                stats.positive,
                stats.negative,
                stats.neutral,
                stats.unique_aspects,
                stats.mean_aspects_per_sample
            );
        }
        OutputFormat::Text => {
            println!("dataset: {}", stats.dataset);
            println!("samples: {}", stats.samples);
            println!("gold aspects: {}", stats.gold_aspects);
            println!("  positive: {}", stats.positive);
            println!("  negative: {}", stats.negative);
            println!("  neutral: {}", stats.neutral);
            println!("unique aspects: {}", stats.unique_aspects);
            println!(
                "mean aspects/sample: {:.2}",
                stats.mean_aspects_per_sample
            );
        }
    }
    Ok(())
}

fn format_pct(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

fn truncate_text(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let truncated: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", truncated)
    } else {
        truncated
    }
}

fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Parse command line arguments and run the application.
pub fn run() -> Result<()> {
    let app = App::new()?;
    app.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use aspector_core::GoldAspect;

    fn test_settings() -> AspectorConfig {
        AspectorConfig {
            data_dir: PathBuf::from("/tmp/aspector-test"),
            cache_dir: PathBuf::from("/tmp/aspector-test"),
            ..Default::default()
        }
    }

    fn sample(text: &str, golds: &[(&str, Sentiment)]) -> DatasetSample {
        DatasetSample {
            text: text.to_string(),
            expected: golds
                .iter()
                .map(|(aspect, sentiment)| GoldAspect {
                    aspect: aspect.to_string(),
                    sentiment: *sentiment,
                })
                .collect(),
        }
    }

    #[test]
    fn csv_escape_quotes_fields_with_commas() {
        assert_eq!(csv_escape("battery life"), "battery life");
        assert_eq!(csv_escape("cheap, cheerful"), "\"cheap, cheerful\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn truncate_text_respects_char_boundaries() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("0123456789", 10), "0123456789");
        assert_eq!(truncate_text("0123456789a", 10), "0123456789...");
        assert_eq!(truncate_text("héllo wörld", 5), "héllo...");
    }

    #[test]
    fn analyzer_choice_maps_to_kind() {
        assert_eq!(
            analyzer_kind(&AnalyzerChoice::Lexicon),
            AnalyzerKind::Lexicon
        );
        assert_eq!(
            analyzer_kind(&AnalyzerChoice::Transformer),
            AnalyzerKind::Transformer
        );
        assert_eq!(analyzer_kind(&AnalyzerChoice::Ollama), AnalyzerKind::Ollama);
    }

    #[test]
    fn model_override_routes_by_analyzer() {
        let base = test_settings();

        let resolved = resolve_settings(&base, &AnalyzerChoice::Ollama, Some("mistral"), None)
            .expect("resolve");
        assert_eq!(resolved.ollama.model, "mistral");
        assert_eq!(resolved.transformer.model_id, base.transformer.model_id);

        let resolved =
            resolve_settings(&base, &AnalyzerChoice::Transformer, Some("org/model"), None)
                .expect("resolve");
        assert_eq!(resolved.transformer.model_id, "org/model");

        let rejected = resolve_settings(&base, &AnalyzerChoice::Lexicon, Some("x"), None);
        assert!(matches!(rejected, Err(CliError::Argument(_))));
    }

    #[test]
    fn host_override_applies_to_ollama_settings() {
        let base = test_settings();
        let resolved = resolve_settings(
            &base,
            &AnalyzerChoice::Lexicon,
            None,
            Some("http://10.0.0.2:11434"),
        )
        .expect("resolve");
        assert_eq!(resolved.ollama.host, "http://10.0.0.2:11434");
    }

    #[test]
    fn limit_truncates_samples() {
        let samples = vec![
            sample("one", &[("a", Sentiment::Positive)]),
            sample("two", &[("b", Sentiment::Negative)]),
            sample("three", &[("c", Sentiment::Neutral)]),
        ];

        assert_eq!(apply_limit(samples.clone(), Some(2)).len(), 2);
        assert_eq!(apply_limit(samples.clone(), Some(10)).len(), 3);
        assert_eq!(apply_limit(samples, None).len(), 3);
    }

    #[test]
    fn dataset_path_falls_back_to_configured_default() {
        let settings = test_settings();
        let resolved = resolve_dataset_path(&None, &settings);
        assert_eq!(resolved, settings.evaluation.dataset_path);

        let explicit = resolve_dataset_path(&Some(PathBuf::from("other.json")), &settings);
        assert_eq!(explicit, PathBuf::from("other.json"));
    }

    #[test]
    fn dataset_stats_counts_sentiments() {
        let samples = vec![
            sample(
                "The pasta was great but the service was slow.",
                &[
                    ("pasta", Sentiment::Positive),
                    ("service", Sentiment::Negative),
                ],
            ),
            sample("The decor was okay.", &[("decor", Sentiment::Neutral)]),
            sample(
                "Great pasta.",
                &[("pasta", Sentiment::Positive)],
            ),
        ];

        let stats = DatasetStats::collect(Path::new("test.json"), &samples);
        assert_eq!(stats.samples, 3);
        assert_eq!(stats.gold_aspects, 4);
        assert_eq!(stats.positive, 2);
        assert_eq!(stats.negative, 1);
        assert_eq!(stats.neutral, 1);
        assert_eq!(stats.unique_aspects, 3);
        assert!((stats.mean_aspects_per_sample - 4.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn cli_parses_analyze_invocation() {
        let cli = Cli::try_parse_from(["aspector", "analyze", "The pizza was great"])
            .expect("parse");
        match cli.command {
            Commands::Analyze(args) => {
                assert_eq!(args.text, "The pizza was great");
                assert_eq!(args.analyzer, AnalyzerChoice::Lexicon);
                assert!(args.aspects.is_empty());
            }
            _ => panic!("expected analyze command"),
        }
    }

    #[test]
    fn cli_splits_aspect_list() {
        let cli = Cli::try_parse_from([
            "aspector",
            "analyze",
            "text",
            "--analyzer",
            "transformer",
            "--aspects",
            "battery life,screen",
        ])
        .expect("parse");
        match cli.command {
            Commands::Analyze(args) => {
                assert_eq!(args.analyzer, AnalyzerChoice::Transformer);
                assert_eq!(args.aspects, vec!["battery life", "screen"]);
            }
            _ => panic!("expected analyze command"),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
