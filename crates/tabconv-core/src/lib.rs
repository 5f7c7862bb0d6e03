//! Composable converters from heterogeneous tabular records to numeric ones.
//!
//! A [`Converter`] is fitted on sample rows, names its output columns and
//! maps rows to rows. Leaf converters ([`leaf`]) handle single concerns such
//! as parsing floats or one-hot encoding; combinators ([`combinator`]) build
//! trees of them. When no converter is configured, [`Infer`] picks one from
//! the sample. A [`RecordProfile`] routes each record field (or tuple of
//! fields) to its converter and assembles flat output records with unique
//! labels.
//!
//! ```
//! use tabconv_core::{ConverterSpec, RecordProfile};
//! use tabconv_core::leaf::{Enumerate, Float};
//! use tabconv_model::{Value, record};
//!
//! let mut profile = RecordProfile::new()
//!     .with("age", Float::new())?
//!     .with("sex", ConverterSpec::sequence([
//!         ConverterSpec::lookup([("m", "male"), ("f", "female")]),
//!         Enumerate::new().into(),
//!     ]))?;
//! let records = vec![
//!     record([("age", "31"), ("sex", "m")]),
//!     record([("age", "28"), ("sex", "f")]),
//! ];
//! let output = profile.fit_transform(&records)?;
//! assert_eq!(
//!     output[0],
//!     record([("age", Value::Float(31.0)), ("sex", Value::Int(1))])
//! );
//! # Ok::<(), tabconv_core::ConvertError>(())
//! ```

pub mod combinator;
pub mod config;
pub mod converter;
pub mod error;
pub mod infer;
pub mod labels;
pub mod leaf;
pub mod profile;
pub mod spec;
mod stats;

pub use combinator::{ForEach, Parallel, Pipeline, Try};
pub use config::{ConverterConfig, GroupConfig, ProfileConfig};
pub use converter::{AsAny, Converter, Slot};
pub use error::{ConvertError, ErrorKind, Phase, Result};
pub use infer::{Infer, InferenceRules, infer_converter};
pub use labels::dedupe_labels;
pub use profile::{ProfileOptions, RecordProfile};
pub use spec::ConverterSpec;
