//! Passthrough, constant, ignoring and relabelling converters.

use std::fmt;

use tabconv_model::{Row, Value};

use crate::converter::{Converter, repr_list};
use crate::error::Result;
use crate::leaf::function::{OutputCardinality, derive_labels};

/// Passes rows through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Id;

impl Converter for Id {
    fn name(&self) -> &'static str {
        "Id"
    }

    fn transform(&self, row: &[Value]) -> Result<Row> {
        Ok(row.to_vec())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Id()")
    }
}

/// Drops its input. Produces no output columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ignore;

impl Converter for Ignore {
    fn name(&self) -> &'static str {
        "Ignore"
    }

    fn labels(&self, _labels: &[Value]) -> Result<Row> {
        Ok(Vec::new())
    }

    fn transform(&self, _row: &[Value]) -> Result<Row> {
        Ok(Vec::new())
    }
}

impl fmt::Display for Ignore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("None")
    }
}

/// Emits the same value for every row. A list constant emits its items.
#[derive(Debug, Clone)]
pub struct Const {
    value: Value,
}

impl Const {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    fn output(&self) -> Row {
        match &self.value {
            Value::List(items) => items.clone(),
            other => vec![other.clone()],
        }
    }
}

impl Converter for Const {
    fn name(&self) -> &'static str {
        "Const"
    }

    fn labels(&self, labels: &[Value]) -> Result<Row> {
        derive_labels(labels, OutputCardinality::Fixed(self.output().len()))
    }

    fn transform(&self, _row: &[Value]) -> Result<Row> {
        Ok(self.output())
    }
}

impl fmt::Display for Const {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Const({})", self.value.repr())
    }
}

/// Identity transform with fixed output labels.
#[derive(Debug, Clone)]
pub struct Label {
    labels: Row,
}

impl Label {
    pub fn new<I, V>(labels: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }
}

impl Converter for Label {
    fn name(&self) -> &'static str {
        "Label"
    }

    fn labels(&self, _labels: &[Value]) -> Result<Row> {
        Ok(self.labels.clone())
    }

    fn transform(&self, row: &[Value]) -> Result<Row> {
        Ok(row.to_vec())
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Label({})", repr_list(&self.labels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignore_has_no_outputs() {
        let labels = Ignore.labels(&[Value::from("x")]).expect("labels");
        assert!(labels.is_empty());
        assert!(Ignore.transform(&[Value::from(1)]).expect("transform").is_empty());
    }

    #[test]
    fn const_labels_follow_output_arity() {
        let single = Const::new(7);
        assert_eq!(
            single.labels(&[Value::from("a"), Value::from("b")]).expect("labels"),
            vec![Value::from("a, b")]
        );

        let pair = Const::new(vec![Value::from(1), Value::from(2)]);
        assert_eq!(pair.transform(&[Value::Null]).expect("transform").len(), 2);
        assert_eq!(
            pair.labels(&[Value::from("x")]).expect("labels"),
            vec![Value::from("x_0"), Value::from("x_1")]
        );
    }

    #[test]
    fn label_renames_without_touching_values() {
        let label = Label::new(["first", "last"]);
        let row = vec![Value::from(100), Value::from(101)];
        assert_eq!(label.transform(&row).expect("transform"), row);
        assert_eq!(
            label.labels(&[Value::from("name")]).expect("labels"),
            vec![Value::from("first"), Value::from("last")]
        );
        assert_eq!(label.to_string(), r#"Label("first", "last")"#);
    }
}
