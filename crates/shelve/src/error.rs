//! Error types for Shelve operations.
//!
//! This module provides the main error type [`ShelveError`] which wraps
//! the error conditions that can occur while resolving and writing files.

use std::{io, path::PathBuf};

use thiserror::Error;

use shelve_core::policy::InvalidPolicy;
use shelve_pattern::{PatternError, error::ParseError};

/// The main error type for Shelve operations.
///
/// # Diagnostic Variants
///
/// The `Pattern` variant carries structured diagnostics with spans into the
/// offending pattern text, which is kept alongside for rich reporting.
#[derive(Debug, Error)]
pub enum ShelveError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Pattern { err: ParseError, src: String },

    #[error("no path pattern could be resolved from the given entities ({tried} tried)")]
    NoPatternResolved { tried: usize },

    #[error("A file at path {} already exists.", .0.display())]
    DestinationExists(PathBuf),

    #[error(transparent)]
    InvalidPolicy(#[from] InvalidPolicy),

    #[error("no free file name next to {} after {attempts} attempts", .path.display())]
    AppendExhausted { path: PathBuf, attempts: usize },

    #[error("cannot write into directory {}: nothing to take a file name from", .0.display())]
    MissingFileName(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<PatternError> for ShelveError {
    fn from(error: PatternError) -> Self {
        let (src, err) = error.into_parts();
        Self::Pattern { err, src }
    }
}

impl ShelveError {
    /// Create a new `Pattern` error with the associated pattern text.
    pub fn new_pattern_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Pattern {
            err,
            src: src.into(),
        }
    }
}
