//! The `convert` and `inspect` commands.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tabconv_core::{ProfileConfig, ProfileOptions, RecordProfile};
use tabconv_ingest::{CsvOptions, TableOptions, TableProfile, read_table, write_table};
use tracing::{info, info_span};

/// Settings shared by `convert` and `inspect`.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// JSON profile configuration.
    pub profile: Option<PathBuf>,
    pub ignore: Vec<String>,
    pub ignore_undefined: bool,
    pub ignore_uninferrable: bool,
    pub no_preprocess: bool,
}

/// What `convert` did.
#[derive(Debug)]
pub struct ConvertResult {
    pub source: PathBuf,
    pub output: PathBuf,
    pub rows: usize,
    pub input_columns: usize,
    pub output_columns: usize,
    pub keys: Vec<KeySummary>,
}

/// One profile key after fitting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySummary {
    pub key: String,
    pub converter: String,
    pub labels: Vec<String>,
}

/// What `inspect` found.
#[derive(Debug)]
pub struct InspectResult {
    pub source: PathBuf,
    pub rows: usize,
    pub keys: Vec<KeySummary>,
}

/// Fit a profile on `source` and write the converted table to `output`.
pub fn run_convert(source: &Path, output: &Path, options: &RunOptions) -> Result<ConvertResult> {
    let span = info_span!("convert", source = %source.display());
    let _guard = span.enter();
    let started = Instant::now();

    let csv = CsvOptions::default();
    let table = read_table(source, &csv).context("read source table")?;
    let mut profile = table_profile(options)?;
    let converted = profile.fit_transform(&table).context("convert table")?;
    write_table(output, &converted, &csv).context("write converted table")?;

    info!(
        rows = converted.len(),
        columns = converted.width(),
        elapsed_ms = started.elapsed().as_millis(),
        "conversion finished"
    );
    Ok(ConvertResult {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        rows: converted.len(),
        input_columns: table.width(),
        output_columns: converted.width(),
        keys: key_summaries(profile.profile()),
    })
}

/// Fit a profile on `source` and report what was chosen for each key.
pub fn run_inspect(source: &Path, options: &RunOptions) -> Result<InspectResult> {
    let span = info_span!("inspect", source = %source.display());
    let _guard = span.enter();

    let table = read_table(source, &CsvOptions::default()).context("read source table")?;
    let mut profile = table_profile(options)?;
    profile.fit(&table).context("fit profile")?;
    Ok(InspectResult {
        source: source.to_path_buf(),
        rows: table.len(),
        keys: key_summaries(profile.profile()),
    })
}

fn table_profile(options: &RunOptions) -> Result<TableProfile> {
    let profile = load_profile(options)?;
    let table_options = TableOptions::default()
        .with_ignored(options.ignore.iter().cloned())
        .with_preprocess(!options.no_preprocess);
    TableProfile::new(profile, &table_options).context("apply ignored columns")
}

/// Build the record profile from the configuration file, if any. Flags set
/// on the command line switch the policies on even when the file does not.
fn load_profile(options: &RunOptions) -> Result<RecordProfile> {
    let Some(path) = &options.profile else {
        let profile_options = ProfileOptions::default()
            .with_ignore_undefined(options.ignore_undefined)
            .with_ignore_uninferrable(options.ignore_uninferrable);
        return Ok(RecordProfile::new().with_options(profile_options));
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("read profile {}", path.display()))?;
    let mut config = ProfileConfig::from_json(&text)
        .with_context(|| format!("parse profile {}", path.display()))?;
    config.ignore_undefined |= options.ignore_undefined;
    config.ignore_uninferrable |= options.ignore_uninferrable;
    config
        .build()
        .with_context(|| format!("build profile {}", path.display()))
}

fn key_summaries(profile: &RecordProfile) -> Vec<KeySummary> {
    profile
        .keys()
        .map(|key| KeySummary {
            key: key.to_string(),
            converter: profile
                .slot(key)
                .map(ToString::to_string)
                .unwrap_or_default(),
            labels: profile.labels_for(key).map(<[String]>::to_vec).unwrap_or_default(),
        })
        .collect()
}
