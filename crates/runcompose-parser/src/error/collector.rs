//! Accumulates diagnostics so a phase can report every problem at once.

use crate::error::{Diagnostic, ParseError};

/// A collector for diagnostics emitted while lexing or transforming.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity().is_error() {
            self.has_errors = true;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Move every diagnostic of a failed phase into this collector.
    pub fn absorb(&mut self, err: ParseError) {
        for diagnostic in err.into_diagnostics() {
            self.emit(diagnostic);
        }
    }

    /// Returns `true` if an error has been emitted.
    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    /// Finish collection.
    ///
    /// Returns `Err` carrying every diagnostic when at least one is an error.
    /// Warnings alone are dropped.
    pub fn finish(self) -> Result<(), ParseError> {
        if self.has_errors {
            Err(ParseError::new(self.diagnostics))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorCode, span::Span};

    #[test]
    fn test_empty_collector_finishes_ok() {
        assert!(DiagnosticCollector::new().finish().is_ok());
    }

    #[test]
    fn test_warnings_only_finish_ok() {
        let mut collector = DiagnosticCollector::new();
        collector.emit(Diagnostic::warning("warning 1"));

        assert!(!collector.has_errors());
        assert!(collector.finish().is_ok());
    }

    #[test]
    fn test_errors_keep_all_diagnostics() {
        let mut collector = DiagnosticCollector::new();
        collector.emit(
            Diagnostic::error("unterminated single quote")
                .with_code(ErrorCode::E001)
                .with_label(Span::new(10..20), "opened here"),
        );
        collector.emit(Diagnostic::warning("warning"));

        let err = collector.finish().unwrap_err();
        assert_eq!(err.diagnostics().len(), 2);
        assert_eq!(err.diagnostics()[0].message(), "unterminated single quote");
    }

    #[test]
    fn test_absorb() {
        let mut collector = DiagnosticCollector::new();
        collector.absorb(ParseError::new(vec![
            Diagnostic::error("first"),
            Diagnostic::error("second"),
        ]));

        assert!(collector.has_errors());
        assert_eq!(collector.finish().unwrap_err().diagnostics().len(), 2);
    }
}
