//! One converter applied to every element of a row.

use std::fmt;
use std::slice;

use tabconv_model::{Row, Value};

use crate::converter::{Converter, Slot};
use crate::error::{Phase, Result};
use crate::spec::ConverterSpec;

/// Applies one converter to every element of a variable-length row.
///
/// The output holds one list per input element. The inner converter is
/// fitted on all elements of all sample rows.
#[derive(Debug)]
pub struct ForEach {
    inner: Slot,
}

impl ForEach {
    pub fn new(inner: impl Into<Slot>) -> Self {
        Self {
            inner: inner.into(),
        }
    }

    pub fn from_spec(inner: impl Into<ConverterSpec>) -> Result<Self> {
        Ok(Self {
            inner: inner.into().resolve()?,
        })
    }

    pub fn inner(&self) -> &Slot {
        &self.inner
    }
}

impl Converter for ForEach {
    fn name(&self) -> &'static str {
        "ForEach"
    }

    fn fit(&mut self, rows: &[Row]) -> Result<()> {
        let elements: Vec<Row> = rows
            .iter()
            .flat_map(|row| row.iter().map(|element| vec![element.clone()]))
            .collect();
        self.inner
            .fit(&elements)
            .map_err(|err| err.within("elements", self.inner.name(), Phase::Fit))
    }

    fn labels(&self, labels: &[Value]) -> Result<Row> {
        labels
            .iter()
            .map(|label| self.inner.labels(slice::from_ref(label)).map(Value::List))
            .collect()
    }

    fn transform(&self, row: &[Value]) -> Result<Row> {
        row.iter()
            .map(|element| {
                self.inner
                    .transform(slice::from_ref(element))
                    .map(Value::List)
            })
            .collect()
    }
}

impl fmt::Display for ForEach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ForEach({})", self.inner)
    }
}
