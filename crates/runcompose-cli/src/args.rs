//! Command-line argument definitions for the runcompose CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control where commands are read from, where the
//! document is written, rendering options, configuration file selection, and
//! logging verbosity.

use clap::Parser;
use runcompose_parser::lexer;

/// Translate docker run commands into a Compose file
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Docker command to translate, e.g. `docker run -p 80:80 nginx`
    ///
    /// Read from `--input` or standard input when omitted. Options for
    /// runcompose itself must come before the command.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub commands: Vec<String>,

    /// File holding one or more docker commands
    #[arg(short, long)]
    pub input: Option<String>,

    /// Existing Compose file to merge the result into
    #[arg(short, long)]
    pub existing: Option<String>,

    /// Output file (default: standard output)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Target Compose dialect (latest, v2x, v3x)
    #[arg(short, long)]
    pub dialect: Option<String>,

    /// Spaces per indentation level
    #[arg(long)]
    pub indent: Option<usize>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Args {
    /// Rebuild the command text from the positional words.
    ///
    /// The shell has already removed quoting, so words that would split or
    /// expand are quoted again. Returns `None` without positional words.
    pub fn command_text(&self) -> Option<String> {
        if self.commands.is_empty() {
            return None;
        }

        let words: Vec<_> = self.commands.iter().map(|word| lexer::quote(word)).collect();
        Some(words.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).expect("Failed to parse arguments")
    }

    #[test]
    fn test_trailing_command() {
        let args = parse(&[
            "runcompose", "--dialect", "v3x", "docker", "run", "-p", "80:80", "--rm", "nginx",
        ]);

        assert_eq!(args.dialect.as_deref(), Some("v3x"));
        assert_eq!(
            args.command_text().as_deref(),
            Some("docker run -p 80:80 --rm nginx")
        );
    }

    #[test]
    fn test_no_command() {
        let args = parse(&["runcompose", "--input", "commands.sh"]);

        assert_eq!(args.input.as_deref(), Some("commands.sh"));
        assert_eq!(args.command_text(), None);
        assert_eq!(args.log_level, "warn");
    }

    #[test]
    fn test_words_are_requoted() {
        let args = Args {
            commands: ["docker", "run", "-e", "A=b c", "-e", "B=it's", "-e", ""]
                .map(String::from)
                .to_vec(),
            ..Args::default()
        };

        assert_eq!(
            args.command_text().as_deref(),
            Some(r"docker run -e 'A=b c' -e 'B=it'\''s' -e ''")
        );
    }
}
