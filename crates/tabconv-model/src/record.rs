use indexmap::IndexMap;

use crate::value::Value;

/// One input or output record: field name to value, in insertion order.
pub type Record = IndexMap<String, Value>;

/// Build a record from `(name, value)` pairs.
pub fn record<I, K, V>(pairs: I) -> Record
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(name, value)| (name.into(), value.into()))
        .collect()
}
