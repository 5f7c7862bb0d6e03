//! Unsupervised converter inference for a single field.
//!
//! Rules are tried in priority order (highest first):
//! 1. Every value is a finite number -> `Float`
//! 2. Some string contains a list delimiter -> `ListAndOr` if a natural
//!    language conjunction also appears, otherwise `List`
//! 3. Distinct value count `u` over the sample:
//!    `u <= 2` -> `Binary`, `u <= 10` -> `OneHot`,
//!    `u <= 100` or `u < 10%` of the sample -> `Enumerate`
//! 4. Otherwise the field is uninferrable

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tabconv_model::{Row, Value};
use tracing::{debug, warn};

use crate::converter::{Converter, repr_list};
use crate::error::{ConvertError, ErrorKind, Result};
use crate::leaf::{
    AND_OR_DELIMITERS, Binary, Enumerate, Float, Ignore, LIST_DELIMITER, List, ListAndOr, OneHot,
};

static LIST_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(LIST_DELIMITER).expect("valid list delimiter"));

static AND_OR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&AND_OR_DELIMITERS.join("|")).expect("valid conjunction delimiters")
});

/// Number of sample values quoted in an uninferrable error.
const SAMPLE_PREVIEW: usize = 5;

/// Cardinality thresholds for the categorical rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InferenceRules {
    pub binary_max_unique: usize,
    pub one_hot_max_unique: usize,
    pub enumerate_max_unique: usize,
    /// `Enumerate` is also chosen when `unique < ratio * sample size`.
    pub enumerate_max_ratio: f64,
}

impl InferenceRules {
    pub const DEFAULT: Self = Self {
        binary_max_unique: 2,
        one_hot_max_unique: 10,
        enumerate_max_unique: 100,
        enumerate_max_ratio: 0.1,
    };
}

impl Default for InferenceRules {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A pending inference request.
///
/// Resolving it against sample rows picks a converter, fits it on the same
/// rows and hands back the fitted converter.
#[derive(Debug, Clone, Default)]
pub struct Infer {
    ignore_uninferrable: bool,
    rules: InferenceRules,
}

impl Infer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Substitute `Ignore` instead of failing when no rule applies.
    #[must_use]
    pub fn with_ignore_uninferrable(mut self, ignore: bool) -> Self {
        self.ignore_uninferrable = ignore;
        self
    }

    #[must_use]
    pub fn with_rules(mut self, rules: InferenceRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn ignore_uninferrable(&self) -> bool {
        self.ignore_uninferrable
    }

    pub fn resolve(&self, rows: &[Row]) -> Result<Box<dyn Converter>> {
        let mut converter = match infer_converter(rows, &self.rules) {
            Ok(converter) => converter,
            Err(err) if self.ignore_uninferrable && err.kind() == ErrorKind::Uninferrable => {
                warn!(samples = rows.len(), "no converter could be inferred, ignoring field");
                return Ok(Box::new(Ignore));
            }
            Err(err) => return Err(err),
        };
        converter.fit(rows)?;
        Ok(converter)
    }
}

impl fmt::Display for Infer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Infer()")
    }
}

/// Pick an unfitted converter for single-value sample rows.
pub fn infer_converter(rows: &[Row], rules: &InferenceRules) -> Result<Box<dyn Converter>> {
    let single: Option<Vec<&Value>> = rows
        .iter()
        .map(|row| match row.as_slice() {
            [value] => Some(value),
            _ => None,
        })
        .collect();
    let Some(values) = single else {
        return Err(uninferrable(rows.iter().map(|row| Value::List(row.clone()))));
    };

    if values.iter().all(|value| value.to_finite_f64().is_some()) {
        debug!(samples = values.len(), "inferred Float");
        return Ok(Box::new(Float::new()));
    }

    let strings: Vec<&str> = values.iter().filter_map(|value| value.as_str()).collect();
    if strings.iter().any(|text| LIST_PATTERN.is_match(text)) {
        if strings.iter().any(|text| AND_OR_PATTERN.is_match(text)) {
            debug!(samples = values.len(), "inferred ListAndOr");
            return Ok(Box::new(ListAndOr::new()));
        }
        debug!(samples = values.len(), "inferred List");
        return Ok(Box::new(List::new()));
    }

    let unique = values.iter().copied().collect::<HashSet<&Value>>().len();
    let converter: Box<dyn Converter> = if unique <= rules.binary_max_unique {
        Box::new(Binary::new())
    } else if unique <= rules.one_hot_max_unique {
        Box::new(OneHot::new())
    } else if unique <= rules.enumerate_max_unique
        || (unique as f64) < rules.enumerate_max_ratio * values.len() as f64
    {
        Box::new(Enumerate::new())
    } else {
        return Err(uninferrable(values.into_iter().cloned()));
    };
    debug!(
        converter = converter.name(),
        unique,
        samples = values.len(),
        "inferred categorical converter"
    );
    Ok(converter)
}

fn uninferrable(values: impl Iterator<Item = Value>) -> ConvertError {
    let preview: Vec<Value> = values.take(SAMPLE_PREVIEW).collect();
    ConvertError::Uninferrable {
        sample: format!("[{}]", repr_list(&preview)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(values: &[&str]) -> Vec<Row> {
        values.iter().map(|value| vec![Value::from(*value)]).collect()
    }

    fn inferred_name(values: &[&str]) -> &'static str {
        infer_converter(&column(values), &InferenceRules::DEFAULT)
            .expect("inferable")
            .name()
    }

    #[test]
    fn numbers_become_float() {
        assert_eq!(inferred_name(&["1", "2.5", " 3 "]), "Float");
    }

    #[test]
    fn lists_are_detected_before_categories() {
        assert_eq!(inferred_name(&["a, b", "c"]), "List");
        assert_eq!(inferred_name(&["a, b", "c and d"]), "ListAndOr");
    }

    #[test]
    fn cardinality_picks_categorical_converter() {
        assert_eq!(inferred_name(&["yes", "no", "yes"]), "Binary");
        assert_eq!(inferred_name(&["red", "blue", "green", "red"]), "OneHot");

        let many: Vec<String> = (0..50).map(|i| format!("id-{i}")).collect();
        let many: Vec<&str> = many.iter().map(String::as_str).collect();
        assert_eq!(inferred_name(&many), "Enumerate");
    }

    #[test]
    fn too_many_categories_is_uninferrable() {
        let values: Vec<String> = (0..150).map(|i| format!("id-{i}")).collect();
        let rows: Vec<Row> = values.iter().map(|v| vec![Value::from(v.as_str())]).collect();
        let err = infer_converter(&rows, &InferenceRules::DEFAULT).expect_err("uninferrable");
        assert_eq!(err.kind(), ErrorKind::Uninferrable);
        assert!(err.to_string().contains("\"id-0\""));
    }

    #[test]
    fn multi_value_rows_are_uninferrable() {
        let rows = vec![vec![Value::from("a"), Value::from("b")]];
        let err = infer_converter(&rows, &InferenceRules::DEFAULT).expect_err("uninferrable");
        assert_eq!(err.kind(), ErrorKind::Uninferrable);
    }

    #[test]
    fn ignore_uninferrable_substitutes_ignore() {
        let values: Vec<String> = (0..150).map(|i| format!("id-{i}")).collect();
        let rows: Vec<Row> = values.iter().map(|v| vec![Value::from(v.as_str())]).collect();
        let converter = Infer::new()
            .with_ignore_uninferrable(true)
            .resolve(&rows)
            .expect("ignored");
        assert_eq!(converter.name(), "Ignore");
        assert!(converter.transform(&rows[0]).expect("transform").is_empty());
    }
}
