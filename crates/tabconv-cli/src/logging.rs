//! Logging setup on top of `tracing-subscriber`.
//!
//! # Log Levels
//!
//! - `error`: failures that abort a run
//! - `warn`: partial fits, ignored uninferrable keys, failing pre-processing hooks
//! - `info`: row counts and per-run summaries
//! - `debug`: inference decisions, fitted parameters, resolved labels
//!
//! Sample values only appear at `debug` and below.

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::ValueEnum;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Crates whose events pass the default filter.
const CRATE_TARGETS: &[&str] = &["tabconv", "tabconv_cli", "tabconv_core", "tabconv_ingest"];

/// How the `tabconv` binary logs.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Level applied to the tabconv crates when `RUST_LOG` is not consulted.
    pub level: LevelFilter,
    /// Let `RUST_LOG` override `level`.
    pub use_env_filter: bool,
    pub ansi: bool,
    pub format: LogFormat,
    /// Write to this file instead of stderr.
    pub log_file: Option<PathBuf>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Multi-line, for humans.
    #[default]
    Pretty,
    Compact,
    /// One JSON object per event, with timestamps.
    Json,
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    if let Some(path) = &config.log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        init_logging_with_writer(config, Mutex::new(file));
    } else {
        init_logging_with_writer(config, io::stderr);
    }
    Ok(())
}

fn init_logging_with_writer<W>(config: &LogConfig, writer: W)
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let layer: Box<dyn Layer<Registry> + Send + Sync> = match config.format {
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .without_time()
            .with_target(false)
            .with_ansi(config.ansi)
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .without_time()
            .with_target(false)
            .with_ansi(config.ansi)
            .with_writer(writer)
            .boxed(),
    };
    tracing_subscriber::registry()
        .with(layer)
        .with(build_env_filter(config))
        .init();
}

/// Directives for the tabconv crates at `level`; everything else stays at warn.
fn default_directives(level: LevelFilter) -> String {
    let level = level.to_string().to_lowercase();
    let mut directives = vec!["warn".to_string()];
    directives.extend(
        CRATE_TARGETS
            .iter()
            .map(|target| format!("{target}={level}")),
    );
    directives.join(",")
}

fn build_env_filter(config: &LogConfig) -> EnvFilter {
    let fallback = || EnvFilter::new(default_directives(config.level));
    if config.use_env_filter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback())
    } else {
        fallback()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_cover_every_crate() {
        assert_eq!(
            default_directives(LevelFilter::DEBUG),
            "warn,tabconv=debug,tabconv_cli=debug,tabconv_core=debug,tabconv_ingest=debug"
        );
        assert_eq!(
            default_directives(LevelFilter::OFF),
            "warn,tabconv=off,tabconv_cli=off,tabconv_core=off,tabconv_ingest=off"
        );
    }

    #[test]
    fn explicit_levels_ignore_rust_log() {
        let config = LogConfig {
            level: LevelFilter::INFO,
            use_env_filter: false,
            ansi: false,
            format: LogFormat::Json,
            log_file: None,
        };
        let filter = build_env_filter(&config).to_string();
        assert!(filter.contains("tabconv_core=info"), "{filter}");
        assert!(filter.contains("tabconv_ingest=info"), "{filter}");
    }
}
