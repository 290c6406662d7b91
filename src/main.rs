use clap::Parser;
use dashboard_diagrams::cli::{Args, run};
use log::{LevelFilter, error};
use std::{process, str::FromStr};

fn main() {
    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {}. Using 'warn' instead.", args.log_level);
        LevelFilter::Warn
    });
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    if let Err(err) = run(&args) {
        error!(err:% = err; "Render failed");
        eprintln!("error: {err}");
        process::exit(1);
    }
}
