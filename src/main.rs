use clap::Parser;
use console::style;
use log::{info, warn};
use mov_splitter::component::MovSplitter;
use mov_splitter::cli::Cli;
use mov_splitter::config::{Config, DEFAULT_LANGUAGE};
use mov_splitter::error::PipelineError;
use mov_splitter::init;
use mov_splitter::signal::setup_shutdown_signal;
use std::process::ExitCode;

#[macro_use]
extern crate rust_i18n;

i18n!("locales", fallback = "en-US");

const EXIT_INTERRUPTED: u8 = 130;

fn main() -> ExitCode {
    rust_i18n::set_locale(DEFAULT_LANGUAGE);
    let cli = Cli::parse();

    let config = match Config::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {e}", style(t!("main.config_error")).red().bold());
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init::init(&config) {
        eprintln!("{} {e:#}", style(t!("main.error_prefix")).red().bold());
        return ExitCode::FAILURE;
    }

    let shutdown_signal = match setup_shutdown_signal() {
        Ok(signal) => signal,
        Err(e) => {
            eprintln!("{} {e:#}", style(t!("main.error_prefix")).red().bold());
            return ExitCode::FAILURE;
        }
    };

    match MovSplitter::new(config, shutdown_signal).run() {
        Ok(report) => {
            report.print();
            info!("Program exited normally");
            ExitCode::SUCCESS
        }
        Err(e) => {
            if matches!(
                e.downcast_ref::<PipelineError>(),
                Some(PipelineError::Interrupted)
            ) {
                warn!("Program interrupted");
                eprintln!("{}", style(t!("main.interrupted")).yellow());
                return ExitCode::from(EXIT_INTERRUPTED);
            }

            warn!("Program error: {e:#}");
            eprintln!("{} {e:#}", style(t!("main.error_prefix")).red().bold());
            ExitCode::FAILURE
        }
    }
}
