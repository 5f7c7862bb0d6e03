//! Integer and one-hot encodings of categorical values.

use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tabconv_model::{Row, Value, unique_values};
use tracing::debug;

use crate::converter::{Converter, repr_list, unpack_rows, unpack_single};
use crate::error::{ConvertError, Result};

/// What `OneHot` does with a value outside its fitted domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    #[default]
    Error,
    /// Encode as all zeros.
    Ignore,
}

fn unknown(converter: &'static str, value: &Value, known: &IndexSet<Value>) -> ConvertError {
    ConvertError::UnknownValue {
        converter,
        value: value.repr(),
        known: repr_list(known),
    }
}

/// Assigns every distinct value a stable integer index.
///
/// Values fitted from data are sorted when they share one scalar type and
/// otherwise keep first-seen order.
#[derive(Debug, Clone, Default)]
pub struct Enumerate {
    values: IndexSet<Value>,
}

impl Enumerate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixed value order; `fit` keeps it.
    pub fn with_values<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn values(&self) -> Vec<&Value> {
        self.values.iter().collect()
    }
}

impl Converter for Enumerate {
    fn name(&self) -> &'static str {
        "Enumerate"
    }

    fn fit(&mut self, rows: &[Row]) -> Result<()> {
        if self.values.is_empty() {
            let values = unpack_rows(rows, "Enumerate")?;
            self.values = unique_values(values).into_iter().collect();
            debug!(values = self.values.len(), "fitted enumeration");
        }
        Ok(())
    }

    fn transform(&self, row: &[Value]) -> Result<Row> {
        let value = unpack_single(row, "Enumerate")?;
        let index = self
            .values
            .get_index_of(value)
            .ok_or_else(|| unknown("Enumerate", value, &self.values))?;
        Ok(vec![Value::from(index)])
    }
}

impl fmt::Display for Enumerate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Enumerate({})", repr_list(&self.values))
    }
}

/// One 0/1 column per distinct value.
///
/// The absence marker is never a column, so `Null` always encodes as all
/// zeros.
#[derive(Debug, Clone, Default)]
pub struct OneHot {
    values: IndexSet<Value>,
    handle_unknown: HandleUnknown,
}

impl OneHot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            values: values
                .into_iter()
                .map(Into::into)
                .filter(|value: &Value| !value.is_null())
                .collect(),
            handle_unknown: HandleUnknown::Error,
        }
    }

    #[must_use]
    pub fn with_handle_unknown(mut self, handle_unknown: HandleUnknown) -> Self {
        self.handle_unknown = handle_unknown;
        self
    }

    pub fn values(&self) -> Vec<&Value> {
        self.values.iter().collect()
    }
}

impl Converter for OneHot {
    fn name(&self) -> &'static str {
        "OneHot"
    }

    fn fit(&mut self, rows: &[Row]) -> Result<()> {
        if self.values.is_empty() {
            let values = unpack_rows(rows, "OneHot")?;
            let present = values.into_iter().filter(|value| !value.is_null());
            self.values = unique_values(present).into_iter().collect();
            debug!(columns = self.values.len(), "fitted one-hot encoding");
        }
        Ok(())
    }

    fn labels(&self, labels: &[Value]) -> Result<Row> {
        let label = unpack_single(labels, "OneHot")?;
        Ok(self
            .values
            .iter()
            .map(|value| Value::Str(format!("{label}={value}")))
            .collect())
    }

    fn transform(&self, row: &[Value]) -> Result<Row> {
        let value = unpack_single(row, "OneHot")?;
        let hit = self.values.get_index_of(value);
        if hit.is_none()
            && !value.is_null()
            && self.handle_unknown == HandleUnknown::Error
        {
            return Err(unknown("OneHot", value, &self.values));
        }
        Ok((0..self.values.len())
            .map(|index| Value::Int(i64::from(hit == Some(index))))
            .collect())
    }
}

impl fmt::Display for OneHot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OneHot({}", repr_list(&self.values))?;
        if self.handle_unknown == HandleUnknown::Ignore {
            if !self.values.is_empty() {
                f.write_str(", ")?;
            }
            f.write_str("handle_unknown=ignore")?;
        }
        f.write_str(")")
    }
}
