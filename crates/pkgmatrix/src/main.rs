//! pkgmatrix CLI Application

// CLI binary needs to output to stdout/stderr
#![allow(clippy::print_stdout, clippy::print_stderr)]

use pkgmatrix::cli::{self, CliError, EXIT_OK, exit_code_for, render_error};
use pkgmatrix::commands;
use pkgmatrix::tracing::{TracingConfig, init_tracing};
use std::io::Write;

fn main() {
    // Tracing may not be usable during a panic, write straight to stderr
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    let cli = cli::parse();

    let tracing_config = TracingConfig::new(cli.tracing_format(), cli.level);
    // Ignore error if tracing already initialized
    let _ = init_tracing(tracing_config);

    let Some(command) = cli.command else {
        let err = CliError::config_with_help(
            "No subcommand provided",
            "Run 'pkgmatrix --help' for usage information",
        );
        render_error(&err, cli.json);
        std::process::exit(exit_code_for(&err));
    };

    let exit_code = match commands::execute(command, cli.json) {
        Ok(output) => {
            let mut stdout = std::io::stdout().lock();
            match stdout
                .write_all(output.as_bytes())
                .and_then(|()| stdout.flush())
            {
                Ok(()) => EXIT_OK,
                Err(e) => {
                    let err = CliError::render(format!("Failed to write output: {e}"));
                    render_error(&err, cli.json);
                    exit_code_for(&err)
                }
            }
        }
        Err(err) => {
            render_error(&err, cli.json);
            exit_code_for(&err)
        }
    };
    std::process::exit(exit_code);
}
