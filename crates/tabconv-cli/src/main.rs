//! `tabconv` command line entry point.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use tabconv_cli::commands::{run_convert, run_inspect};
use tabconv_cli::logging::{LogConfig, init_logging};

mod cli;
mod summary;

use crate::cli::{Cli, Command};
use crate::summary::{print_convert_summary, print_inspect_summary};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    if let Err(error) = init_logging(&log_config(&cli)) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let outcome = match &cli.command {
        Command::Convert(args) => {
            run_convert(&args.source, &args.output, &args.profile.run_options())
                .map(|result| print_convert_summary(&result))
        }
        Command::Inspect(args) => run_inspect(&args.source, &args.profile.run_options())
            .map(|result| print_inspect_summary(&result)),
    };
    if let Err(error) = outcome {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}

/// `--log-level` wins over `-v`/`-q`; either one disables `RUST_LOG`.
fn log_config(cli: &Cli) -> LogConfig {
    LogConfig {
        level: cli
            .log_level
            .map_or_else(|| cli.verbosity.tracing_level_filter(), Into::into),
        use_env_filter: !(cli.verbosity.is_present() || cli.log_level.is_some()),
        ansi: match cli.color.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
        },
        format: cli.log_format,
        log_file: cli.log_file.clone(),
    }
}
