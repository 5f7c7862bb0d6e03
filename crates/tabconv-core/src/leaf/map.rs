//! Static lookup tables.

use std::fmt;

use indexmap::IndexMap;
use tabconv_model::{Row, Value};

use crate::converter::{Converter, repr_list, unpack_single};
use crate::error::{ConvertError, Result};

/// Static lookup table from a value to one or more output values.
///
/// When every table entry is a list, entries are used as output rows
/// directly; otherwise each entry becomes a 1-element row.
#[derive(Debug, Clone)]
pub struct Map {
    table: IndexMap<Value, Value>,
    default: Option<Value>,
    spread_lists: bool,
}

impl Map {
    pub fn new<I, K, V>(table: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        let table: IndexMap<Value, Value> = table
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        if table.is_empty() {
            return Err(ConvertError::EmptySample {
                what: "Map lookup table".to_string(),
            });
        }
        let spread_lists = table.values().all(Value::is_list);
        Ok(Self {
            table,
            default: None,
            spread_lists,
        })
    }

    /// Output for values missing from the table.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn table(&self) -> &IndexMap<Value, Value> {
        &self.table
    }

    fn output(&self, value: &Value) -> Row {
        match value {
            Value::List(items) if self.spread_lists => items.clone(),
            other => vec![other.clone()],
        }
    }
}

impl Converter for Map {
    fn name(&self) -> &'static str {
        "Map"
    }

    fn transform(&self, row: &[Value]) -> Result<Row> {
        let value = unpack_single(row, "Map")?;
        if let Some(mapped) = self.table.get(value) {
            return Ok(self.output(mapped));
        }
        match &self.default {
            Some(default) => Ok(self.output(default)),
            None => Err(ConvertError::UnknownValue {
                converter: "Map",
                value: value.repr(),
                known: repr_list(self.table.keys()),
            }),
        }
    }
}

impl fmt::Display for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<String> = self
            .table
            .iter()
            .map(|(key, value)| format!("{}: {}", key.repr(), value.repr()))
            .collect();
        let table = format!("{{{}}}", entries.join(", "));
        match &self.default {
            None => f.write_str(&table),
            Some(default) => write!(f, "Map({table}, default={})", default.repr()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn maps_known_values() {
        let map = Map::new([("male", 55), ("female", 49)]).expect("non-empty");
        assert_eq!(
            map.transform(&[Value::from("female")]).expect("transform"),
            vec![Value::Int(49)]
        );
        let err = map.transform(&[Value::from("x")]).expect_err("unknown");
        assert_eq!(err.kind(), ErrorKind::UnknownValue);
        assert_eq!(map.to_string(), r#"{"male": 55, "female": 49}"#);
    }

    #[test]
    fn list_entries_are_spread() {
        let map = Map::new([
            ("a", Value::List(vec![Value::Int(1), Value::Int(0)])),
            ("b", Value::List(vec![Value::Int(0), Value::Int(1)])),
        ])
        .expect("non-empty")
        .with_default(Value::List(vec![Value::Int(0), Value::Int(0)]));
        assert_eq!(
            map.transform(&[Value::from("b")]).expect("transform"),
            vec![Value::Int(0), Value::Int(1)]
        );
        assert_eq!(
            map.transform(&[Value::from("z")]).expect("default"),
            vec![Value::Int(0), Value::Int(0)]
        );
    }

    #[test]
    fn empty_table_is_rejected() {
        let err = Map::new(Vec::<(Value, Value)>::new()).expect_err("empty");
        assert_eq!(err.kind(), ErrorKind::EmptySample);
    }
}
