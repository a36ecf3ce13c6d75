//! nci CLI application
//!
//! Reads the process environment, detects the CI platform and prints the
//! normalized (or denormalized) mapping on stdout.

// CLI binary needs to output to stdout/stderr - this is intentional
#![allow(clippy::print_stdout, clippy::print_stderr)]

use nci::cli::{self, EXIT_OK, exit_code_for, exit_code_for_usage, render_error};
use nci::commands;
use nci::tracing::init_tracing;
use std::io::Write;

fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with --level debug for more information.");
    }));

    std::process::exit(run());
}

fn run() -> i32 {
    let cli = match cli::parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return exit_code_for_usage(&e);
        }
    };

    if let Err(e) = init_tracing(cli.tracing_config()) {
        eprintln!("{e:?}");
    }

    let env = nci_core::environment::from_process();
    match commands::execute(&cli, &env) {
        Ok(output) => {
            let mut stdout = std::io::stdout().lock();
            let _ = stdout.write_all(output.as_bytes());
            let _ = stdout.flush();
            EXIT_OK
        }
        Err(err) => {
            let code = exit_code_for(&err);
            render_error(err);
            code
        }
    }
}
