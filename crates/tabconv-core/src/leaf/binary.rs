//! 0/1 encoding of two-valued fields.

use std::collections::BTreeSet;
use std::fmt;

use tabconv_model::{Row, Value};
use tracing::debug;

use crate::converter::{Converter, repr_list, unpack_rows, unpack_single};
use crate::error::{ConvertError, Result};

/// Common tokens recognised when splitting a binary field without
/// explicit positive or negative values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryVocabulary {
    pub positive: &'static [&'static str],
    pub negative: &'static [&'static str],
}

impl BinaryVocabulary {
    pub const COMMON: Self = Self {
        positive: &["yes", "true", "positive", "1", "female"],
        negative: &["no", "false", "negative", "0", "male", "none"],
    };

    fn contains(tokens: &[&str], value: &Value) -> bool {
        value.as_str().is_some_and(|text| tokens.contains(&text))
    }
}

impl Default for BinaryVocabulary {
    fn default() -> Self {
        Self::COMMON
    }
}

/// Maps a value to `0` or `1`.
///
/// With only positive values configured, anything else is `0`; with only
/// negative values, anything else is `1`. With both, a value in neither set
/// is rejected.
#[derive(Debug, Clone, Default)]
pub struct Binary {
    positive: BTreeSet<Value>,
    negative: BTreeSet<Value>,
    vocabulary: BinaryVocabulary,
    inferred: bool,
}

impl Binary {
    /// Binary converter whose split is inferred during `fit`.
    pub fn new() -> Self {
        Self {
            inferred: true,
            ..Self::default()
        }
    }

    pub fn with_values<P, N>(positive: P, negative: N) -> Self
    where
        P: IntoIterator,
        P::Item: Into<Value>,
        N: IntoIterator,
        N::Item: Into<Value>,
    {
        let positive: BTreeSet<Value> = positive.into_iter().map(Into::into).collect();
        let negative: BTreeSet<Value> = negative.into_iter().map(Into::into).collect();
        let inferred = positive.is_empty() && negative.is_empty();
        Self {
            positive,
            negative,
            vocabulary: BinaryVocabulary::COMMON,
            inferred,
        }
    }

    pub fn positive_only(positive: impl Into<Value>) -> Self {
        Self::with_values([positive.into()], Vec::<Value>::new())
    }

    #[must_use]
    pub fn with_vocabulary(mut self, vocabulary: BinaryVocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    pub fn positive(&self) -> &BTreeSet<Value> {
        &self.positive
    }

    pub fn negative(&self) -> &BTreeSet<Value> {
        &self.negative
    }
}

impl Converter for Binary {
    fn name(&self) -> &'static str {
        "Binary"
    }

    fn fit(&mut self, rows: &[Row]) -> Result<()> {
        if !self.positive.is_empty() || !self.negative.is_empty() {
            return Ok(());
        }
        let values: BTreeSet<Value> = unpack_rows(rows, "Binary")?.into_iter().cloned().collect();
        let positive: BTreeSet<Value> = values
            .iter()
            .filter(|value| BinaryVocabulary::contains(self.vocabulary.positive, value))
            .cloned()
            .collect();
        let negative: BTreeSet<Value> = values
            .iter()
            .filter(|value| BinaryVocabulary::contains(self.vocabulary.negative, value))
            .cloned()
            .collect();

        if positive.len() + negative.len() == values.len() {
            self.positive = positive;
            self.negative = negative;
        } else if let Some(smallest) = values.first() {
            self.negative = BTreeSet::from([smallest.clone()]);
        }
        debug!(
            positive = self.positive.len(),
            negative = self.negative.len(),
            "fitted binary split"
        );
        Ok(())
    }

    fn transform(&self, row: &[Value]) -> Result<Row> {
        let value = unpack_single(row, "Binary")?;
        let is_positive = self.positive.contains(value);
        let is_negative = self.negative.contains(value);
        if !self.positive.is_empty() && !self.negative.is_empty() && !is_positive && !is_negative
        {
            return Err(ConvertError::UnknownValue {
                converter: "Binary",
                value: value.repr(),
                known: repr_list(self.positive.iter().chain(&self.negative)),
            });
        }
        let flag = if self.positive.is_empty() {
            !is_negative
        } else {
            is_positive
        };
        Ok(vec![Value::Int(i64::from(flag))])
    }
}

impl fmt::Display for Binary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inferred {
            return f.write_str("Binary()");
        }
        let mut args = Vec::new();
        if !self.positive.is_empty() {
            args.push(format!("positive=[{}]", repr_list(&self.positive)));
        }
        if !self.negative.is_empty() {
            args.push(format!("negative=[{}]", repr_list(&self.negative)));
        }
        write!(f, "Binary({})", args.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn rows(values: &[&str]) -> Vec<Row> {
        values.iter().map(|value| vec![Value::from(*value)]).collect()
    }

    fn apply(converter: &Binary, value: &str) -> Result<Row> {
        converter.transform(&[Value::from(value)])
    }

    #[test]
    fn explicit_positive_value() {
        let mut binary = Binary::positive_only("cancer");
        binary.fit(&rows(&["cancer", "benign", "cancer"])).expect("fit");
        let out: Vec<Row> = ["cancer", "benign", "cancer"]
            .iter()
            .map(|v| apply(&binary, v).expect("transform"))
            .collect();
        assert_eq!(
            out,
            vec![vec![Value::Int(1)], vec![Value::Int(0)], vec![Value::Int(1)]]
        );
    }

    #[test]
    fn vocabulary_split_is_adopted_when_it_covers_every_value() {
        let mut binary = Binary::new();
        binary.fit(&rows(&["yes", "no", "yes"])).expect("fit");
        assert!(binary.positive().contains(&Value::from("yes")));
        assert!(binary.negative().contains(&Value::from("no")));
        assert_eq!(apply(&binary, "yes").expect("transform"), vec![Value::Int(1)]);
        let err = apply(&binary, "maybe").expect_err("unknown");
        assert_eq!(err.kind(), ErrorKind::UnknownValue);
    }

    #[test]
    fn smallest_value_becomes_negative_otherwise() {
        let mut binary = Binary::new();
        binary.fit(&rows(&["malignant", "benign"])).expect("fit");
        assert!(binary.positive().is_empty());
        assert_eq!(binary.negative().iter().collect::<Vec<_>>(), vec![&Value::from("benign")]);
        assert_eq!(apply(&binary, "malignant").expect("transform"), vec![Value::Int(1)]);
        assert_eq!(apply(&binary, "other").expect("transform"), vec![Value::Int(1)]);
        assert_eq!(apply(&binary, "benign").expect("transform"), vec![Value::Int(0)]);
    }

    #[test]
    fn explicit_sets_render() {
        let binary = Binary::with_values(["cancer"], ["benign"]);
        assert_eq!(
            binary.to_string(),
            r#"Binary(positive=["cancer"], negative=["benign"])"#
        );
        assert_eq!(Binary::new().to_string(), "Binary()");
    }
}
