//! CLI logic for the runcompose tool.
//!
//! This module reads docker commands, translates them with
//! [`ComposeBuilder`], and writes the resulting Compose document.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{
    fs,
    io::{self, Read, Write},
};

use log::{debug, info};

use runcompose::{ComposeBuilder, RunComposeError, dialect::Dialect};

/// Run the runcompose CLI application
///
/// Commands come from the positional words, else the `--input` file, else
/// standard input. The document goes to `--output` or standard output.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `RunComposeError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Unknown dialects
/// - Parsing errors
/// - Unusable existing documents
pub fn run(args: &Args) -> Result<(), RunComposeError> {
    let mut app_config = config::load_config(args.config.as_ref())?;

    // Command-line options override the configuration file
    if let Some(dialect) = &args.dialect {
        let dialect: Dialect = dialect.parse()?;
        app_config.render_mut().set_dialect(dialect);
    }
    if let Some(indent) = args.indent {
        app_config.render_mut().set_indent(indent);
    }
    debug!(config:? = app_config; "Effective configuration");

    let commands = read_commands(args)?;
    let existing = args
        .existing
        .as_ref()
        .map(fs::read_to_string)
        .transpose()?;

    let builder = ComposeBuilder::new(app_config);
    let yaml = builder.translate(&commands, existing.as_deref())?;

    match &args.output {
        Some(path) => {
            fs::write(path, yaml)?;
            info!(output_file = path; "Compose file written");
        }
        None => io::stdout().lock().write_all(yaml.as_bytes())?,
    }

    Ok(())
}

fn read_commands(args: &Args) -> Result<String, RunComposeError> {
    if let Some(text) = args.command_text() {
        info!("Reading commands from arguments");
        return Ok(text);
    }

    if let Some(path) = &args.input {
        info!(input_path = path; "Reading commands from file");
        return Ok(fs::read_to_string(path)?);
    }

    info!("Reading commands from standard input");
    let mut text = String::new();
    io::stdin().lock().read_to_string(&mut text)?;
    Ok(text)
}
