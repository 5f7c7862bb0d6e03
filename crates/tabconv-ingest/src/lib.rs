//! Table ingestion around tabconv profiles.
//!
//! This crate reads CSV and TSV files into string [`Table`]s, prepares cell
//! values with a [`Preprocessor`], runs them through a [`TableProfile`] and
//! writes the numeric result back out.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use tabconv_core::RecordProfile;
//! use tabconv_ingest::{CsvOptions, TableOptions, TableProfile, read_table, write_table};
//!
//! let options = CsvOptions::default();
//! let table = read_table(Path::new("patients.csv"), &options)?;
//! let mut profile = TableProfile::new(RecordProfile::new(), &TableOptions::default())?;
//! let converted = profile.fit_transform(&table)?;
//! write_table(Path::new("patients.numeric.csv"), &converted, &options)?;
//! ```

mod error;
mod preprocess;
mod profile;
mod table;

// === Error Types ===
pub use error::{IngestError, Result};

// === Tables ===
pub use table::{CsvOptions, Table, normalize_header, read_table, write_records, write_table};

// === Pre-processing ===
pub use preprocess::{HookError, HookFn, Preprocessor, normalize};

// === Profiles ===
pub use profile::{TableOptions, TableProfile};
