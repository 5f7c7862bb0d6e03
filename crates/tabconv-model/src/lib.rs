//! Data model shared by the tabconv crates.

pub mod key;
pub mod record;
pub mod value;

pub use key::Key;
pub use record::{Record, record};
pub use value::{Row, Value, ValueKind, is_sortable, unique_values};
