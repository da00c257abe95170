//! The error returned when command text cannot be translated.
//!
//! [`ParseError`] wraps every [`Diagnostic`] reported while lexing the
//! commands or transforming flag values.

use thiserror::Error;

use crate::error::{Diagnostic, ErrorCode};

/// One or more diagnostics from a failed parse.
///
/// Displays as the first diagnostic plus a count of the others.
#[derive(Debug, Error)]
#[error("{}", summary(.diagnostics))]
pub struct ParseError {
    diagnostics: Vec<Diagnostic>,
}

impl ParseError {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    /// Returns the diagnostics in the order they were reported.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Returns the error codes of all diagnostics that have one.
    pub fn codes(&self) -> impl Iterator<Item = ErrorCode> + '_ {
        self.diagnostics.iter().filter_map(Diagnostic::code)
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

fn summary(diagnostics: &[Diagnostic]) -> String {
    match diagnostics {
        [] => String::new(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (+{} more)", rest.len()),
    }
}

impl From<Diagnostic> for ParseError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self::new(vec![diagnostic])
    }
}

impl From<Vec<Diagnostic>> for ParseError {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self::new(diagnostics)
    }
}
