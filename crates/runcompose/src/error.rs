//! Error types for runcompose operations.
//!
//! This module provides the main error type [`RunComposeError`] which wraps
//! the error conditions that can occur while translating commands.

use std::io;

use thiserror::Error;

use runcompose_core::dialect::DialectError;
use runcompose_parser::error::ParseError;

/// Message reported when the input holds no translatable command.
pub const NO_INVOCATION_MESSAGE: &str =
    "must have at least a valid docker run/create/service create/container run command";

/// The main error type for runcompose operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant contains structured error information with source code
/// spans. This provides detailed error information that can be used for rich
/// error reporting.
#[derive(Debug, Error)]
pub enum RunComposeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error(transparent)]
    Dialect(#[from] DialectError),

    #[error("existing compose document is not usable: {0}")]
    ExistingDocument(String),

    #[error("{}", NO_INVOCATION_MESSAGE)]
    NoInvocation,
}

impl RunComposeError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
