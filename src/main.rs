//! testflow - guided electrical inspection test sessions and pre-start
//! checklists.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use testflow::FlowError;
use testflow::app::AppContext;
use testflow::cli::output::{emit_robot, robot_error_structured};
use testflow::cli::{Cli, OutputFormat};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    // Until the context exists only the flags can say whether we are in robot mode.
    let ctx = match AppContext::from_cli(&cli) {
        Ok(ctx) => ctx,
        Err(e) => {
            return report_error(&e, cli.robot || cli.output_format == Some(OutputFormat::Json));
        }
    };

    match testflow::cli::commands::run(&ctx, &cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report_error(&e, ctx.robot_mode),
    }
}

fn report_error(e: &FlowError, robot_mode: bool) -> ExitCode {
    if robot_mode {
        // Robot mode: structured JSON error on stdout
        if emit_robot(&robot_error_structured(e)).is_err() {
            eprintln!("Error: {e}");
        }
    } else {
        let structured = e.to_structured();
        eprintln!("Error: {e}");
        eprintln!("  hint: {}", structured.suggestion);
    }
    ExitCode::FAILURE
}

fn init_tracing(cli: &Cli) {
    if cli.quiet {
        return;
    }

    let filter = match cli.verbose {
        0 => "warn,testflow=info",
        1 => "info,testflow=debug",
        2 => "debug,testflow=trace",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    if cli.robot {
        // JSON logging for robot mode
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
