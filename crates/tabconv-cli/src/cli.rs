//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use tabconv_cli::commands::RunOptions;
use tabconv_cli::logging::LogFormat;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(
    name = "tabconv",
    version,
    about = "Convert heterogeneous CSV tables to numeric ones",
    long_about = "Convert heterogeneous CSV tables to numeric ones.\n\n\
                  Each column gets a converter, either configured in a JSON profile\n\
                  or inferred from the data: floats, binary flags, one-hot and\n\
                  enumerated categories, and delimited lists."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormat,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fit on a table and write its numeric conversion.
    Convert(ConvertArgs),

    /// Fit on a table and show the converter chosen for each column.
    Inspect(InspectArgs),
}

#[derive(Parser)]
pub struct ConvertArgs {
    /// CSV or TSV file to convert.
    #[arg(value_name = "SRC")]
    pub source: PathBuf,

    /// Where to write the converted table.
    #[arg(value_name = "OUT")]
    pub output: PathBuf,

    #[command(flatten)]
    pub profile: ProfileArgs,
}

#[derive(Parser)]
pub struct InspectArgs {
    /// CSV or TSV file to inspect.
    #[arg(value_name = "SRC")]
    pub source: PathBuf,

    #[command(flatten)]
    pub profile: ProfileArgs,
}

#[derive(Args)]
pub struct ProfileArgs {
    /// JSON profile assigning converters to columns.
    #[arg(long = "profile", value_name = "JSON")]
    pub profile: Option<PathBuf>,

    /// Drop these columns from the output (repeatable, or comma separated).
    #[arg(short = 'i', long = "ignore", value_name = "COLUMN", value_delimiter = ',')]
    pub ignore: Vec<String>,

    /// Drop columns the profile does not mention instead of inferring them.
    #[arg(long = "ignore-undefined")]
    pub ignore_undefined: bool,

    /// Drop columns whose converter cannot be inferred instead of failing.
    #[arg(long = "ignore-uninferrable")]
    pub ignore_uninferrable: bool,

    /// Keep cell values exactly as read (no trimming or lower-casing).
    #[arg(long = "no-preprocess")]
    pub no_preprocess: bool,
}

impl ProfileArgs {
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            profile: self.profile.clone(),
            ignore: self.ignore.clone(),
            ignore_undefined: self.ignore_undefined,
            ignore_uninferrable: self.ignore_uninferrable,
            no_preprocess: self.no_preprocess,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LevelFilter {
    fn from(level: LogLevelArg) -> Self {
        match level {
            LogLevelArg::Error => Self::ERROR,
            LogLevelArg::Warn => Self::WARN,
            LogLevelArg::Info => Self::INFO,
            LogLevelArg::Debug => Self::DEBUG,
            LogLevelArg::Trace => Self::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn convert_collects_repeated_ignores() {
        let cli = Cli::try_parse_from([
            "tabconv", "convert", "in.csv", "out.csv", "-i", "id", "-i", "notes",
            "--ignore-uninferrable",
        ])
        .expect("parse");
        let Command::Convert(args) = cli.command else {
            panic!("expected convert");
        };
        let options = args.profile.run_options();
        assert_eq!(options.ignore, vec!["id", "notes"]);
        assert!(options.ignore_uninferrable);
        assert!(!options.ignore_undefined);
        assert_eq!(args.output, PathBuf::from("out.csv"));
    }
}
