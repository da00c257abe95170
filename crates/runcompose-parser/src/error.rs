//! Diagnostics for problems found in command text.
//!
//! Every problem is a [`Diagnostic`]: a message, an [`ErrorCode`], labels
//! pointing into the command text, and optional help. Parsing keeps going
//! after the first problem, so one [`ParseError`] can carry the diagnostics
//! of several invocations.
//!
//! Codes are grouped by stage: `E0xx` for the lexer, `E2xx` for flag values.
//!
//! # Example
//!
//! ```
//! # use runcompose_parser::error::{Diagnostic, ErrorCode};
//! # use runcompose_parser::Span;
//!
//! let span = Span::new(20..38);
//!
//! let diag = Diagnostic::error("invalid ulimit `nofile`")
//!     .with_code(ErrorCode::E200)
//!     .with_label(span, "expected `<type>=<soft limit>[:<hard limit>]`")
//!     .with_help("for example `--ulimit nofile=1024:2048`");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
