//! Labeled source spans for diagnostic messages.

use crate::span::Span;

/// Whether a label marks the problem itself or related context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabelKind {
    Primary,
    Secondary,
}

/// A message attached to a span of the command text.
///
/// A diagnostic has one primary label marking the offending flag or value,
/// and optionally secondary labels for related locations (for example the
/// `docker` segment the flag belongs to).
///
/// ```text
/// error[E200]: invalid ulimit `nofile`
///   |
/// 1 | docker run --ulimit nofile nginx
///   |                     ^^^^^^ expected `<type>=<soft limit>[:<hard limit>]`
/// ```
#[derive(Debug, Clone)]
pub struct Label {
    kind: LabelKind,
    span: Span,
    message: String,
}

impl Label {
    /// Label the offending text.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self::new(LabelKind::Primary, span, message)
    }

    /// Label text related to the problem.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self::new(LabelKind::Secondary, span, message)
    }

    fn new(kind: LabelKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_primary(&self) -> bool {
        self.kind == LabelKind::Primary
    }

    pub fn is_secondary(&self) -> bool {
        self.kind == LabelKind::Secondary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_label() {
        let label = Label::primary(Span::new(20..26), "not a number");

        assert_eq!(label.span().range(), 20..26);
        assert_eq!(label.message(), "not a number");
        assert!(label.is_primary());
        assert!(!label.is_secondary());
    }

    #[test]
    fn test_secondary_label() {
        let label = Label::secondary(Span::new(0..6), "in this command");

        assert_eq!(label.span().start(), 0);
        assert!(label.is_secondary());
    }
}
