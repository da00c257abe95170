//! A single problem found in command text.

use std::fmt;

use crate::{
    error::{Severity, error_code::ErrorCode, label::Label},
    span::Span,
};

/// An error or warning tied to locations in the command text.
///
/// Rendered by the CLI roughly as:
///
/// ```text
/// error[E203]: invalid number `two` for `--cpus`
///   |
/// 1 | docker run --cpus two nginx
///   |                   ^^^ expected a number
///   |
///   = help: `--cpus` takes a decimal value such as `1.5`
/// ```
///
/// Built with chained `with_*` calls:
///
/// ```
/// # use runcompose_parser::error::{Diagnostic, ErrorCode};
/// # use runcompose_parser::Span;
/// let diag = Diagnostic::error("invalid ulimit `nofile`")
///     .with_code(ErrorCode::E200)
///     .with_label(Span::new(20..26), "missing `=`")
///     .with_help("use `<type>=<soft limit>[:<hard limit>]`");
///
/// assert_eq!(diag.to_string(), "error[E200]: invalid ulimit `nofile`");
/// ```
#[derive(Debug, Clone)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Error, message.into())
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Warning, message.into())
    }

    fn with_severity(severity: Severity, message: String) -> Self {
        Self {
            severity,
            code: None,
            message,
            labels: vec![],
            help: None,
        }
    }

    pub fn with_code(self, code: ErrorCode) -> Self {
        Self {
            code: Some(code),
            ..self
        }
    }

    /// Point at the offending text.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Point at related text, such as the flag a bad value belongs to.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    pub fn with_help(self, help: impl Into<String>) -> Self {
        Self {
            help: Some(help.into()),
            ..self
        }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Primary labels come first in the order they were added.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{}[{code}]: {}", self.severity, self.message),
            None => write!(f, "{}: {}", self.severity, self.message),
        }
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_error() {
        let diag = Diagnostic::error("unterminated quote");

        assert!(diag.severity().is_error());
        assert_eq!(diag.code(), None);
        assert_eq!(diag.labels().len(), 0);
        assert_eq!(diag.help(), None);
    }

    #[test]
    fn test_device_rate_diagnostic() {
        let diag = Diagnostic::error("invalid device rate `/dev/sda`")
            .with_code(ErrorCode::E201)
            .with_label(Span::new(30..38), "missing `:<rate>`")
            .with_secondary_label(Span::new(11..28), "for this flag")
            .with_help("use `<device path>:<rate>`");

        assert_eq!(diag.code(), Some(ErrorCode::E201));
        let primary: Vec<_> = diag.labels().iter().map(Label::is_primary).collect();
        assert_eq!(primary, vec![true, false]);
        assert_eq!(diag.help(), Some("use `<device path>:<rate>`"));
    }

    #[test]
    fn test_display_includes_code_when_present() {
        let gpus = Diagnostic::error("invalid gpu request `some`").with_code(ErrorCode::E204);
        assert_eq!(gpus.to_string(), "error[E204]: invalid gpu request `some`");

        let empty = Diagnostic::warning("empty command");
        assert_eq!(empty.to_string(), "warning: empty command");
    }
}
