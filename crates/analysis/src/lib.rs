//! Aspect-based sentiment analysis backends for Aspector.
//!
//! This crate provides the three analyzer backends (lexicon, local
//! transformer, Ollama), the shared analyzer trait, and the evaluation
//! harness that scores analyzers against gold datasets.

#![deny(missing_docs, unsafe_code)]

/// Analyzer trait, backend selection, and construction.
pub mod analyzer;

/// Error types for analysis operations.
pub mod error;

/// Evaluation harness scoring analyzers against gold datasets.
pub mod eval;

/// Rule-based analyzer backed by a weighted lexicon.
pub mod lexicon;

/// Analyzer delegating to an Ollama-served model.
pub mod ollama;

/// Local transformer analyzer running on candle.
pub mod transformer;
