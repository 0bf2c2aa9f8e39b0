//! Command-line front-end for Jotter.
//!
//! # Responsibility
//! - Parse arguments and drive the core app over a directory-backed store.
//! - Keep stdout limited to command output; diagnostics go to the log file.

mod cli;
mod commands;

use clap::Parser;
use cli::Cli;
use jotter_core::init_logging_with_config;
use log::info;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const LOG_DIR_NAME: &str = "logs";

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match commands::load_config(&cli.data_dir) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("jotter: {err}");
            return ExitCode::FAILURE;
        }
    };

    // Logging is best-effort; a read-only data dir must not block note access.
    if let Err(err) = init_logging_with_config(&config, &log_dir(&cli.data_dir)) {
        eprintln!("jotter: logging disabled: {err}");
    }
    info!("event=cli_start module=cli status=ok");

    let mut stdout = std::io::stdout().lock();
    match commands::run(&cli.data_dir, &config, cli.command, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("jotter: {err}");
            ExitCode::FAILURE
        }
    }
}

fn log_dir(data_dir: &Path) -> String {
    let absolute = if data_dir.is_absolute() {
        data_dir.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(data_dir))
            .unwrap_or_else(|_| PathBuf::from(data_dir))
    };
    absolute.join(LOG_DIR_NAME).display().to_string()
}
