//! # Runcompose Parser
//!
//! Parser for shell-style `docker run` commands. This crate turns command
//! text into [`Service`]s ready to be merged into a Compose document.
//!
//! ## Usage
//!
//! ```
//! # use runcompose_parser::{parse, Command, FlagRegistry, ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = "docker run -d -p 80:80 --name web nginx:latest";
//!
//!     let commands = parse(source, &FlagRegistry::builtin())?;
//!     let Command::Service(service) = &commands[0] else {
//!         unreachable!();
//!     };
//!     assert_eq!(service.name(), "nginx");
//!     Ok(())
//! }
//! ```

mod builtin_flags;
mod elaborate;
pub mod error;
pub mod invocation;
pub mod lexer;
pub mod segment;
mod span;
pub mod transform;

pub use builtin_flags::{FlagRegistry, FlagRegistryBuilder};
pub use elaborate::{DEFAULT_NETWORK, INVALID_SERVICE_NAME, service_name};
pub use error::ParseError;
pub use span::Span;

use log::{debug, info};
use runcompose_core::compose::Service;

use elaborate::Builder;
use error::DiagnosticCollector;
use invocation::Invocation;
use segment::SegmentKind;

/// One segment of the input after parsing.
#[derive(Debug, Clone)]
pub enum Command {
    /// A translated container-launch command.
    Service(Service),
    /// Input that is not translated, with whitespace collapsed.
    ///
    /// Unsupported docker commands keep their `docker` prefix.
    Ignored(String),
}

/// Parse command text into services.
///
/// This is the main entry point of the crate. It runs the pipeline:
///
/// 1. **Segment** - Split the input at lines starting with `docker`
/// 2. **Tokenize** - Split each invocation into shell words
/// 3. **Parse flags** - Separate flags from the image and command
/// 4. **Elaborate** - Transform flag values and build the service tree
///
/// # Arguments
///
/// * `source` - One or more docker commands
/// * `registry` - The flag table, usually [`FlagRegistry::builtin`]
///
/// # Errors
///
/// Returns a [`ParseError`] with every lexical and flag value error found in
/// the whole input.
pub fn parse(source: &str, registry: &FlagRegistry) -> Result<Vec<Command>, ParseError> {
    let builder = Builder::new(registry);
    let mut diagnostics = DiagnosticCollector::new();
    let mut commands = Vec::new();

    for segment in segment::split(source) {
        let subcommand = match segment.kind() {
            SegmentKind::Invocation(subcommand) => subcommand,
            SegmentKind::Unsupported => {
                let text = format!("docker {}", segment.collapsed_text());
                debug!(text = text; "Ignoring unsupported docker command");
                commands.push(Command::Ignored(text.trim_end().to_string()));
                continue;
            }
            SegmentKind::Leading => {
                debug!("Ignoring text before the first docker command");
                commands.push(Command::Ignored(segment.collapsed_text()));
                continue;
            }
        };

        let words = match lexer::tokenize(segment.text(), segment.offset()) {
            Ok(words) => words,
            Err(err) => {
                diagnostics.absorb(err);
                continue;
            }
        };

        let invocation = Invocation::parse(subcommand, words, segment.span(), registry);
        match builder.build(&invocation) {
            Ok(service) => commands.push(Command::Service(service)),
            Err(err) => diagnostics.absorb(err),
        }
    }

    diagnostics.finish()?;

    info!(commands_len = commands.len(); "Parsed docker commands");
    Ok(commands)
}
