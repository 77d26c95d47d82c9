//! mdview entry point.

use std::process::ExitCode;

use clap::Parser;
use mdview::cli::Cli;
use mdview::deps::{self, Outcome};
use mdview::ui::{Console, TerminalConsole};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("mdview=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mdview=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("mdview starting with args: {:?}", cli);

    let mut ui = TerminalConsole::new();

    if cli.skip_checks {
        tracing::debug!("Skipping runtime dependency check");
    } else {
        let outcome = deps::check_runtime(cli.resolve_options(), &mut ui);
        if let Outcome::MissingAndExited(exit) = outcome {
            tracing::debug!("Exiting after dependency check: {:?}", exit.reason);
            return ExitCode::from(exit.code());
        }
    }

    ui.message("Markdown Viewer is starting...");

    match mdview::app::run(cli.file) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ui.error(&e.to_string());
            ExitCode::from(1)
        }
    }
}
