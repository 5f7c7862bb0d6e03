//! Column-aligned composition: one converter per input column.

use std::fmt;
use std::slice;

use tabconv_model::{Row, Value};

use crate::converter::{Converter, Slot};
use crate::error::{ConvertError, Phase, Result};
use crate::spec::ConverterSpec;

/// Column-aligned composition: converter `i` handles element `i` of a row.
///
/// Each converter's output is kept as one nested list, so a row of width
/// `n` maps to a row of `n` lists. Follow with `Flatten` for a flat row.
#[derive(Debug, Default)]
pub struct Parallel {
    converters: Vec<Slot>,
}

impl Parallel {
    pub fn new<I>(converters: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<ConverterSpec>,
    {
        let converters = converters
            .into_iter()
            .map(|spec| spec.into().resolve())
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { converters })
    }

    pub fn converters(&self) -> &[Slot] {
        &self.converters
    }

    fn check_width(&self, found: usize) -> Result<()> {
        if found == self.converters.len() {
            Ok(())
        } else {
            Err(ConvertError::ShapeMismatch {
                converter: "Parallel",
                expected: format!("{} values, one per converter", self.converters.len()),
                found,
            })
        }
    }
}

fn column_scope(index: usize) -> String {
    format!("column {index}")
}

impl Converter for Parallel {
    fn name(&self) -> &'static str {
        "Parallel"
    }

    fn fit(&mut self, rows: &[Row]) -> Result<()> {
        for row in rows {
            self.check_width(row.len())?;
        }
        for (index, converter) in self.converters.iter_mut().enumerate() {
            let column: Vec<Row> = rows.iter().map(|row| vec![row[index].clone()]).collect();
            converter
                .fit(&column)
                .map_err(|err| err.within(column_scope(index), converter.name(), Phase::Fit))?;
        }
        Ok(())
    }

    fn labels(&self, labels: &[Value]) -> Result<Row> {
        self.check_width(labels.len())?;
        labels
            .iter()
            .zip(&self.converters)
            .enumerate()
            .map(|(index, (label, converter))| {
                converter
                    .labels(slice::from_ref(label))
                    .map(Value::List)
                    .map_err(|err| err.within(column_scope(index), converter.name(), Phase::Labels))
            })
            .collect()
    }

    fn transform(&self, row: &[Value]) -> Result<Row> {
        self.check_width(row.len())?;
        row.iter()
            .zip(&self.converters)
            .enumerate()
            .map(|(index, (value, converter))| {
                converter
                    .transform(slice::from_ref(value))
                    .map(Value::List)
                    .map_err(|err| {
                        err.within(column_scope(index), converter.name(), Phase::Transform)
                    })
            })
            .collect()
    }
}

impl fmt::Display for Parallel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.converters.iter().map(ToString::to_string).collect();
        write!(f, "Parallel({})", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::leaf::{Binary, Float};

    #[test]
    fn columns_are_handled_independently() {
        let mut parallel =
            Parallel::new([ConverterSpec::from(Float::new()), Binary::positive_only("yes").into()])
                .expect("parallel");
        let rows = vec![
            vec![Value::from("1.5"), Value::from("yes")],
            vec![Value::from("2"), Value::from("no")],
        ];
        parallel.fit(&rows).expect("fit");
        assert_eq!(
            parallel.transform(&rows[0]).expect("transform"),
            vec![
                Value::List(vec![Value::Float(1.5)]),
                Value::List(vec![Value::Int(1)]),
            ]
        );
        assert_eq!(
            parallel
                .labels(&[Value::from("dose"), Value::from("flag")])
                .expect("labels"),
            vec![
                Value::List(vec![Value::from("dose")]),
                Value::List(vec![Value::from("flag")]),
            ]
        );
    }

    #[test]
    fn width_must_match_converter_count() {
        let mut parallel = Parallel::new([Float::new()]).expect("parallel");
        let err = parallel
            .fit(&[vec![Value::from("1"), Value::from("2")]])
            .expect_err("shape");
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
        let err = parallel.transform(&[]).expect_err("shape");
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
    }
}
