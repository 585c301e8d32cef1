//! CLI command definitions for Aspector.
//!
//! Provides the command-line interface for running analyzer backends over
//! ad-hoc text, evaluating them against gold datasets, and inspecting
//! dataset files.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Main CLI application.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Logging verbosity
    #[arg(short, long, default_value_t = 0, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, env = "ASPECTOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze one piece of text with a single backend
    Analyze(AnalyzeArgs),

    /// Evaluate a backend against a gold dataset
    Eval(EvalArgs),

    /// Evaluate several backends and print a side-by-side summary
    Compare(CompareArgs),

    /// Inspect and validate dataset files
    Dataset(DatasetArgs),
}

/// Text analysis arguments.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Text to analyze
    pub text: String,

    /// Analyzer backend
    #[arg(short, long, value_enum, default_value_t = AnalyzerChoice::Lexicon)]
    pub analyzer: AnalyzerChoice,

    /// Classify these comma-separated aspects instead of extracting them (transformer only)
    #[arg(long, value_delimiter = ',', value_name = "ASPECTS")]
    pub aspects: Vec<String>,

    /// Model override (transformer checkpoint id or Ollama model tag)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Ollama server URL
    #[arg(long, value_name = "URL")]
    pub host: Option<String>,

    /// Output format
    #[arg(short, long, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Backend evaluation arguments.
#[derive(Args, Debug)]
pub struct EvalArgs {
    /// Gold dataset path (defaults to the configured dataset)
    #[arg(short, long, env = "ASPECTOR_DATASET")]
    pub dataset: Option<PathBuf>,

    /// Analyzer backend
    #[arg(short, long, value_enum, default_value_t = AnalyzerChoice::Lexicon)]
    pub analyzer: AnalyzerChoice,

    /// Evaluate only the first N samples
    #[arg(short, long, value_name = "N")]
    pub limit: Option<usize>,

    /// Model override (transformer checkpoint id or Ollama model tag)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Ollama server URL
    #[arg(long, value_name = "URL")]
    pub host: Option<String>,

    /// Output format
    #[arg(short, long, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Backend comparison arguments.
#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Gold dataset path (defaults to the configured dataset)
    #[arg(short, long, env = "ASPECTOR_DATASET")]
    pub dataset: Option<PathBuf>,

    /// Analyzer backends to compare (comma separated)
    #[arg(short, long, value_enum, value_delimiter = ',', default_values_t = vec![AnalyzerChoice::Lexicon])]
    pub analyzers: Vec<AnalyzerChoice>,

    /// Evaluate only the first N samples
    #[arg(short, long, value_name = "N")]
    pub limit: Option<usize>,

    /// Output format
    #[arg(short, long, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Dataset inspection arguments.
#[derive(Args, Debug)]
pub struct DatasetArgs {
    /// Dataset subcommand
    #[command(subcommand)]
    pub command: DatasetCommand,
}

/// Dataset subcommands.
#[derive(Subcommand, Debug)]
pub enum DatasetCommand {
    /// Parse a dataset file and report whether it is well formed
    Validate {
        /// Dataset path (defaults to the configured dataset)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Print record counts and sentiment distribution for a dataset
    Stats {
        /// Dataset path (defaults to the configured dataset)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// Analyzer backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AnalyzerChoice {
    /// Rule-based weighted lexicon
    #[value(alias = "rules")]
    Lexicon,
    /// Local transformer sequence classifier
    Transformer,
    /// Model served by a local Ollama instance
    #[value(alias = "llm")]
    Ollama,
}

impl std::fmt::Display for AnalyzerChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalyzerChoice::Lexicon => write!(f, "lexicon"),
            AnalyzerChoice::Transformer => write!(f, "transformer"),
            AnalyzerChoice::Ollama => write!(f, "ollama"),
        }
    }
}

/// Output format.
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Plain text
    Text,
    /// JSON format
    Json,
    /// CSV format
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
