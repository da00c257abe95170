//! Error adapter for rendering RunComposeError with miette.
//!
//! The library crates report errors with their own types. This module wraps
//! them in [`Reportable`], which implements [`miette::Diagnostic`] so the CLI
//! can render source snippets, codes and help text.
//!
//! A [`RunComposeError::Parse`] holding several diagnostics becomes several
//! reportables, rendered one after another.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, Severity as MietteSeverity, SourceSpan};

use runcompose::RunComposeError;
use runcompose_parser::{
    Span,
    error::{Diagnostic, Severity},
};

/// A single report that miette can render.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A parser diagnostic together with the command text it points into.
    Diagnostic { diag: &'a Diagnostic, src: &'a str },
    /// Any other error, reported without a snippet.
    Error(&'a RunComposeError),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic { diag, .. } => f.write_str(diag.message()),
            Reportable::Error(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Diagnostic { .. } => None,
            Reportable::Error(err) => err.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        match self {
            Reportable::Diagnostic { diag, .. } => diag
                .code()
                .map(|code| Box::new(code) as Box<dyn fmt::Display + 'b>),
            Reportable::Error(err) => {
                error_code(err).map(|code| Box::new(code) as Box<dyn fmt::Display + 'b>)
            }
        }
    }

    fn severity(&self) -> Option<MietteSeverity> {
        match self {
            Reportable::Diagnostic { diag, .. } => Some(match diag.severity() {
                Severity::Error => MietteSeverity::Error,
                Severity::Warning => MietteSeverity::Warning,
            }),
            Reportable::Error(_) => None,
        }
    }

    fn help<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        let help = match self {
            Reportable::Diagnostic { diag, .. } => diag.help(),
            Reportable::Error(err) => error_help(err),
        };
        help.map(|help| Box::new(help) as Box<dyn fmt::Display + 'b>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Diagnostic { src, .. } => Some(src as &dyn miette::SourceCode),
            Reportable::Error(_) => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let Reportable::Diagnostic { diag, .. } = self else {
            return None;
        };
        if diag.labels().is_empty() {
            return None;
        }

        Some(Box::new(diag.labels().iter().map(|label| {
            let span = to_source_span(label.span());
            let message = Some(label.message().to_string());
            if label.is_primary() {
                LabeledSpan::new_primary_with_span(message, span)
            } else {
                LabeledSpan::new_with_span(message, span)
            }
        })))
    }
}

fn error_code(err: &RunComposeError) -> Option<&'static str> {
    let code = match err {
        RunComposeError::Io(_) => "runcompose::io",
        RunComposeError::Parse { .. } => return None,
        RunComposeError::Dialect(_) => "runcompose::dialect",
        RunComposeError::ExistingDocument(_) => "runcompose::existing_document",
        RunComposeError::NoInvocation => "runcompose::no_invocation",
    };
    Some(code)
}

fn error_help(err: &RunComposeError) -> Option<&'static str> {
    match err {
        RunComposeError::NoInvocation => Some(
            "start each command with `docker run`, `docker create`, `docker container run` or `docker service create`",
        ),
        RunComposeError::ExistingDocument(_) => {
            Some("the existing file must be a YAML mapping such as `services: {}`")
        }
        _ => None,
    }
}

fn to_source_span(span: Span) -> SourceSpan {
    SourceSpan::new(span.start().into(), span.len())
}

/// Split a [`RunComposeError`] into reports.
///
/// A parse error yields one [`Reportable`] per diagnostic; every other
/// variant yields exactly one.
pub fn to_reportables(err: &RunComposeError) -> Vec<Reportable<'_>> {
    match err {
        RunComposeError::Parse {
            err: parse_err,
            src,
        } => parse_err
            .diagnostics()
            .iter()
            .map(|diag| Reportable::Diagnostic { diag, src })
            .collect(),
        _ => vec![Reportable::Error(err)],
    }
}

#[cfg(test)]
mod tests {
    use runcompose::ComposeBuilder;
    use runcompose_parser::error::{ErrorCode, ParseError};

    use super::*;

    fn code(reportable: &Reportable<'_>) -> Option<String> {
        reportable.code().map(|code| code.to_string())
    }

    #[test]
    fn test_single_diagnostic() {
        let diag = Diagnostic::error("invalid ulimit `nofile`")
            .with_code(ErrorCode::E200)
            .with_label(Span::new(11..26), "here")
            .with_help("for example `--ulimit nofile=1024:2048`");
        let err = RunComposeError::new_parse_error(
            ParseError::from(diag),
            "docker run --ulimit nofile img",
        );

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);

        let reportable = &reportables[0];
        assert!(matches!(reportable, Reportable::Diagnostic { .. }));
        assert_eq!(reportable.to_string(), "invalid ulimit `nofile`");
        assert_eq!(code(reportable).as_deref(), Some("E200"));
        assert_eq!(reportable.severity(), Some(MietteSeverity::Error));
        assert!(reportable.help().is_some());
    }

    #[test]
    fn test_diagnostics_from_real_input() {
        let err = ComposeBuilder::default()
            .parse("docker run --cpus lots --ulimit nofile img")
            .unwrap_err();

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 2);
        for reportable in &reportables {
            assert!(reportable.source_code().is_some());
            assert_eq!(reportable.labels().map(Iterator::count), Some(1));
        }
    }

    #[test]
    fn test_non_parse_error() {
        let err = RunComposeError::NoInvocation;

        let reportables = to_reportables(&err);

        assert_eq!(reportables.len(), 1);
        let reportable = &reportables[0];
        assert!(matches!(reportable, Reportable::Error(_)));
        assert_eq!(code(reportable).as_deref(), Some("runcompose::no_invocation"));
        assert!(reportable.help().is_some());
        assert!(reportable.source_code().is_none());
        assert!(reportable.labels().is_none());
    }

    #[test]
    fn test_primary_flag_on_labels() {
        let diag = Diagnostic::error("error with labels")
            .with_label(Span::new(0..5), "primary")
            .with_secondary_label(Span::new(10..15), "secondary");
        let reportable = Reportable::Diagnostic {
            diag: &diag,
            src: "some source code",
        };

        let labels: Vec<_> = reportable.labels().unwrap().collect();
        assert_eq!(labels.len(), 2);
        assert!(labels[0].primary());
        assert!(!labels[1].primary());
        assert_eq!(labels[1].label(), Some("secondary"));
    }
}
