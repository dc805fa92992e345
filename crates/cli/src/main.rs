// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! qgate CLI entry point.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use qgate::cli::Cli;
use qgate::error::ExitCode;

mod cmd_validate;

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "off" };
    let filter = EnvFilter::try_from_env("QGATE_LOG").unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    // Exit code 2 means "warnings only", so usage errors must not use it.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() {
                ExitCode::Failed
            } else {
                ExitCode::Success
            };
            let _ = e.print();
            std::process::exit(code as i32);
        }
    };

    init_logging(cli.verbose);

    let exit_code = match cmd_validate::run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("qgate: {}", e);
            match e.downcast_ref::<qgate::Error>() {
                Some(err) => ExitCode::from(err),
                None => ExitCode::Failed,
            }
        }
    };

    std::process::exit(exit_code as i32);
}
