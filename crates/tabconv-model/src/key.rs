//! Profile keys: single fields or nested tuples of fields.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::Record;
use crate::value::{Row, Value};

/// Addresses the input of one profile entry.
///
/// A `Field` reads a single value. A `Tuple` reads one value per member and
/// hands them to the converter as a single row; nested tuples become nested
/// [`Value::List`] elements, so the structure of the key is preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    Field(String),
    Tuple(Vec<Key>),
}

impl Key {
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(name.into())
    }

    pub fn tuple<I, K>(members: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        Self::Tuple(members.into_iter().map(Into::into).collect())
    }

    /// Extract the input row for this key, or `None` if any addressed field
    /// is absent from the record.
    pub fn row(&self, record: &Record) -> Option<Row> {
        match self {
            Self::Field(name) => record.get(name).map(|value| vec![value.clone()]),
            Self::Tuple(members) => members
                .iter()
                .map(|member| member.element(record))
                .collect(),
        }
    }

    fn element(&self, record: &Record) -> Option<Value> {
        match self {
            Self::Field(name) => record.get(name).cloned(),
            Self::Tuple(members) => members
                .iter()
                .map(|member| member.element(record))
                .collect::<Option<Vec<_>>>()
                .map(Value::List),
        }
    }

    /// The labels handed to the converter as its input labels.
    pub fn input_labels(&self) -> Row {
        match self {
            Self::Field(name) => vec![Value::from(name.as_str())],
            Self::Tuple(members) => members.iter().map(Key::label_element).collect(),
        }
    }

    fn label_element(&self) -> Value {
        match self {
            Self::Field(name) => Value::from(name.as_str()),
            Self::Tuple(members) => Value::List(members.iter().map(Key::label_element).collect()),
        }
    }

    /// Every atomic field name addressed by this key, depth first.
    pub fn field_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Self::Field(name) => names.push(name),
            Self::Tuple(members) => {
                for member in members {
                    member.collect_names(names);
                }
            }
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => f.write_str(name),
            Self::Tuple(members) => {
                f.write_str("(")?;
                for (index, member) in members.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{member}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Self::Field(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Self::Field(name)
    }
}

impl From<&String> for Key {
    fn from(name: &String) -> Self {
        Self::Field(name.clone())
    }
}
