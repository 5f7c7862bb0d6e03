//! Lenient float parsing with value or statistic defaults.

use std::fmt;

use serde::{Deserialize, Serialize};
use tabconv_model::{Row, Value};
use tracing::debug;

use crate::converter::{Converter, unpack_rows, unpack_single};
use crate::error::{ConvertError, Result};
use crate::stats;

/// Sample statistic a `Float` default can be computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Statistic {
    Mean,
    Median,
    Mode,
}

impl Statistic {
    fn reduce(self, values: &[f64]) -> Option<f64> {
        match self {
            Self::Mean => stats::mean(values),
            Self::Median => stats::median(values),
            Self::Mode => stats::mode(values),
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Mode => "mode",
        })
    }
}

/// Replacement for values that do not parse as finite numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FloatDefault {
    Value(f64),
    Statistic(Statistic),
}

/// Parses values to finite floats, falling back to a default.
#[derive(Debug, Clone, Default)]
pub struct Float {
    default: Option<FloatDefault>,
    resolved: Option<f64>,
}

impl Float {
    /// Float without a default: unparseable input is an error.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(default: FloatDefault) -> Result<Self> {
        if let FloatDefault::Value(number) = default
            && !number.is_finite()
        {
            return Err(ConvertError::invalid_config(format!(
                "Float default must be finite, got {number}"
            )));
        }
        let resolved = match default {
            FloatDefault::Value(number) => Some(number),
            FloatDefault::Statistic(_) => None,
        };
        Ok(Self {
            default: Some(default),
            resolved,
        })
    }

    pub fn with_statistic(statistic: Statistic) -> Self {
        Self {
            default: Some(FloatDefault::Statistic(statistic)),
            resolved: None,
        }
    }

    /// The number substituted for unparseable input, once known.
    pub fn default_value(&self) -> Option<f64> {
        self.resolved
    }
}

impl Converter for Float {
    fn name(&self) -> &'static str {
        "Float"
    }

    fn fit(&mut self, rows: &[Row]) -> Result<()> {
        let Some(FloatDefault::Statistic(statistic)) = self.default else {
            return Ok(());
        };
        let parsed: Vec<f64> = unpack_rows(rows, "Float")?
            .into_iter()
            .filter_map(Value::to_finite_f64)
            .collect();
        let value = statistic
            .reduce(&parsed)
            .ok_or_else(|| ConvertError::EmptySample {
                what: format!("Float {statistic}: no sample value parses as a number"),
            })?;
        debug!(%statistic, value, parsed = parsed.len(), "resolved Float default");
        self.resolved = Some(value);
        Ok(())
    }

    fn transform(&self, row: &[Value]) -> Result<Row> {
        let value = unpack_single(row, "Float")?;
        if let Some(number) = value.to_finite_f64() {
            return Ok(vec![Value::Float(number)]);
        }
        match (self.default, self.resolved) {
            (_, Some(fallback)) => Ok(vec![Value::Float(fallback)]),
            (None, _) => Err(ConvertError::invalid_value(
                "Float",
                format!("cannot parse {} and no default is configured", value.repr()),
            )),
            (Some(_), None) => Err(ConvertError::NotFitted {
                converter: "Float",
                reason: "the statistic default is computed during fit".to_string(),
            }),
        }
    }
}

impl fmt::Display for Float {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.default, self.resolved) {
            (None, _) => f.write_str("Float()"),
            (_, Some(number)) => write!(f, "Float(default={number})"),
            (Some(FloatDefault::Statistic(statistic)), None) => {
                write!(f, "Float(default={statistic})")
            }
            (Some(FloatDefault::Value(number)), None) => write!(f, "Float(default={number})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn rows(values: Vec<Value>) -> Vec<Row> {
        values.into_iter().map(|value| vec![value]).collect()
    }

    #[test]
    fn mean_default_is_computed_from_parseable_values() {
        let mut float = Float::with_statistic(Statistic::Mean);
        let sample = rows(vec!["1".into(), "2.5".into(), "bad".into(), "3".into()]);
        float.fit(&sample).expect("fit");
        let mean = float.default_value().expect("resolved");
        assert!((mean - 6.5 / 3.0).abs() < 1e-12);
        assert_eq!(
            float.transform(&[Value::from("bad")]).expect("transform"),
            vec![Value::Float(mean)]
        );
    }

    #[test]
    fn statistic_requires_fit() {
        let float = Float::with_statistic(Statistic::Median);
        let err = float.transform(&[Value::from("x")]).expect_err("not fitted");
        assert_eq!(err.kind(), ErrorKind::NotFitted);
        assert_eq!(float.to_string(), "Float(default=median)");
    }

    #[test]
    fn missing_default_rejects_unparseable_values() {
        let float = Float::new();
        assert_eq!(
            float.transform(&[Value::from("inf")]).expect_err("invalid").kind(),
            ErrorKind::InvalidValue
        );
        assert_eq!(
            float.transform(&[Value::Int(4)]).expect("transform"),
            vec![Value::Float(4.0)]
        );
    }

    #[test]
    fn constant_default() {
        let float = Float::with_default(FloatDefault::Value(-1.0)).expect("valid default");
        assert_eq!(
            float.transform(&[Value::Null]).expect("transform"),
            vec![Value::Float(-1.0)]
        );
        assert!(Float::with_default(FloatDefault::Value(f64::NAN)).is_err());
    }

    #[test]
    fn statistic_without_numbers_is_an_empty_sample() {
        let mut float = Float::with_statistic(Statistic::Mode);
        let err = float
            .fit(&rows(vec!["a".into(), "b".into()]))
            .expect_err("empty");
        assert_eq!(err.kind(), ErrorKind::EmptySample);
    }

    #[test]
    fn default_deserializes_from_number_or_name() {
        let defaults: Vec<FloatDefault> =
            serde_json::from_str(r#"[-1, "mean"]"#).expect("parse defaults");
        assert_eq!(
            defaults,
            vec![
                FloatDefault::Value(-1.0),
                FloatDefault::Statistic(Statistic::Mean)
            ]
        );
    }
}
