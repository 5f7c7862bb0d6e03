//! Structural reshaping of nested rows.

use std::fmt;

use tabconv_model::{Row, Value};

use crate::converter::Converter;
use crate::error::{ConvertError, Result};

/// Transposes a row of equally long lists.
///
/// Rows of unequal lists are cut to the shortest, like a zip.
#[derive(Debug, Clone, Copy, Default)]
pub struct Transpose;

impl Converter for Transpose {
    fn name(&self) -> &'static str {
        "Transpose"
    }

    fn transform(&self, row: &[Value]) -> Result<Row> {
        let columns = row
            .iter()
            .map(|value| {
                value.as_list().ok_or_else(|| {
                    ConvertError::invalid_value(
                        "Transpose",
                        format!("expected a row of lists, found {}", value.repr()),
                    )
                })
            })
            .collect::<Result<Vec<&[Value]>>>()?;
        let width = columns.iter().map(|items| items.len()).min().unwrap_or(0);
        Ok((0..width)
            .map(|index| Value::List(columns.iter().map(|items| items[index].clone()).collect()))
            .collect())
    }
}

impl fmt::Display for Transpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Transpose()")
    }
}

/// Flattens nested lists by one level, for values and labels alike.
#[derive(Debug, Clone, Copy, Default)]
pub struct Flatten;

fn flatten(row: &[Value]) -> Row {
    let mut flat = Vec::with_capacity(row.len());
    for value in row {
        match value {
            Value::List(items) => flat.extend(items.iter().cloned()),
            other => flat.push(other.clone()),
        }
    }
    flat
}

impl Converter for Flatten {
    fn name(&self) -> &'static str {
        "Flatten"
    }

    fn labels(&self, labels: &[Value]) -> Result<Row> {
        Ok(flatten(labels))
    }

    fn transform(&self, row: &[Value]) -> Result<Row> {
        Ok(flatten(row))
    }
}

impl fmt::Display for Flatten {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Flatten()")
    }
}
