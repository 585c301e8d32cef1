//! Command-line interface for Aspector.
//!
//! This crate provides CLI commands for running analyzer backends over
//! ad-hoc text, evaluating them against gold datasets, and inspecting
//! dataset files.

#![deny(missing_docs, unsafe_code)]

/// CLI command definitions and parsing.
pub mod commands;

/// CLI application entry point and configuration.
pub mod app;

/// Error types for CLI operations.
pub mod error;
