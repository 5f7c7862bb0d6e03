//! Converters with no nested converters of their own.

mod basic;
mod binary;
mod categorical;
mod float;
mod function;
mod list;
mod map;
mod shape;
mod text;

pub use basic::{Const, Id, Ignore, Label};
pub use binary::{Binary, BinaryVocabulary};
pub use categorical::{Enumerate, HandleUnknown, OneHot};
pub use float::{Float, FloatDefault, Statistic};
pub use function::{
    Function, OutputCardinality, RowFn, ShapePolicy, StrictFunction, ValueFn, derive_labels,
};
pub use list::{AND_OR_DELIMITERS, AND_OR_STRIP, LIST_DELIMITER, LIST_STRIP, List, ListAndOr};
pub use map::Map;
pub use shape::{Flatten, Transpose};
pub use text::{DEFAULT_SPLIT_DELIMITERS, DEFAULT_STRIP_PATTERNS, Split, Strip};
