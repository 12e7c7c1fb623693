//! Shelve CLI entry point.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use shelve::ShelveError;
use shelve_cli::{Args, error_adapter::to_reportables};

fn main() {
    miette::set_panic_hook();

    let args = Args::parse();
    init_logger(&args.log_level);

    debug!(args:?; "Parsed arguments");

    match shelve_cli::run(&args) {
        Ok(()) => info!("Completed successfully"),
        Err(err) => {
            report(&err);
            process::exit(1);
        }
    }
}

/// Install `env_logger`. `RUST_LOG` is honoured; `level` sets the default.
fn init_logger(level: &str) {
    let log_level = LevelFilter::from_str(level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {level}. Using 'warn' instead.");
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting Shelve");
}

/// Render each diagnostic of `err` as its own graphical report.
fn report(err: &ShelveError) {
    let reporter = miette::GraphicalReportHandler::new();

    for reportable in to_reportables(err) {
        let mut rendered = String::new();
        reporter
            .render_report(&mut rendered, &reportable)
            .expect("Writing to String buffer is infallible");

        error!("{rendered}");
    }
}
