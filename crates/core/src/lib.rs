//! Core types, errors, and configuration for Aspector
//!
//! This crate provides the foundational types and error handling used throughout
//! Aspector, which pairs aspect extraction with per-aspect sentiment
//! classification across interchangeable analyzer backends.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;

// Re-exports for convenience
pub use config::AspectorConfig;
pub use error::{Error, Result};
pub use types::*;
