//! runcompose CLI entry point.

use std::process;

use clap::Parser;
use log::{LevelFilter, debug, error, info};
use miette::GraphicalReportHandler;

use runcompose::RunComposeError;
use runcompose_cli::{Args, error_adapter::to_reportables};

fn main() {
    // Install miette's pretty panic hook early for better panic reports
    miette::set_panic_hook();

    let args = Args::parse();
    let log_level = init_logger(&args.log_level);

    info!(log_level:?; "Starting runcompose");
    debug!(args:?; "Parsed arguments");

    if let Err(err) = runcompose_cli::run(&args) {
        report(&err);
        process::exit(1);
    }

    info!("Completed successfully");
}

/// Log at `level`, or `warn` if it does not name a level. `RUST_LOG`
/// directives still apply on top.
fn init_logger(level: &str) -> LevelFilter {
    let log_level = level.parse().unwrap_or_else(|_| {
        eprintln!("Invalid log level: {level}. Using 'warn' instead.");
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();
    log_level
}

/// Render every diagnostic of `err` as its own report.
fn report(err: &RunComposeError) {
    let handler = GraphicalReportHandler::new();

    for reportable in to_reportables(err) {
        let mut rendered = String::new();
        match handler.render_report(&mut rendered, &reportable) {
            Ok(()) => error!("{rendered}"),
            Err(_) => error!("{reportable}"),
        }
    }
}
