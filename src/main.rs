//! Atelier CLI

use std::{
    io::{self, Write},
    process::ExitCode,
};

use tracing::error;

use crate::cli::Cli;

mod cli;
mod config;
mod observability;

fn main() -> ExitCode {
    let cli = match Cli::load() {
        Ok(cli) => cli,
        Err(err) => {
            _ = err.print();

            return if err.use_stderr() {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if let Err(err) = observability::init(&cli.logging) {
        _ = writeln!(io::stderr(), "{err}");

        return ExitCode::FAILURE;
    }

    let mut stdout = io::stdout().lock();

    match cli.run(&mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "command failed");
            _ = writeln!(io::stderr(), "error: {err:#}");

            ExitCode::FAILURE
        }
    }
}
