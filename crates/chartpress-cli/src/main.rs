//! chartpress CLI entry point.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug};

use chartpress_cli::Args;

fn main() {
    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.options.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.options.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    debug!(args:?; "Parsed arguments");

    if let Err(err) = chartpress_cli::run(&args) {
        eprintln!("error: {err}");
        process::exit(1);
    }
}
