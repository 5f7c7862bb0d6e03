//! Converters wrapping externally supplied functions.

use std::fmt;
use std::sync::Arc;

use tabconv_model::{Row, Value};
use tracing::debug;

use crate::converter::{Converter, join_labels};
use crate::error::{ConvertError, Result};

/// Single-value function: one (possibly list) value in, one value out.
pub type ValueFn = Arc<dyn Fn(&Value) -> Result<Value> + Send + Sync>;

/// Row function: a row in, a row out.
pub type RowFn = Arc<dyn Fn(&[Value]) -> Result<Row> + Send + Sync>;

/// How a [`Function`] adapts rows to its single-value callable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapePolicy {
    /// Pass the only element of a 1-element row instead of the row as a list.
    pub unpack_input: bool,
    /// Wrap the return value into a 1-element row instead of spreading a list.
    pub wrap_output: bool,
}

impl Default for ShapePolicy {
    fn default() -> Self {
        Self {
            unpack_input: true,
            wrap_output: true,
        }
    }
}

impl ShapePolicy {
    /// Unpack when every sample row holds exactly one value.
    pub fn unpack_for(rows: &[Row]) -> bool {
        rows.iter().all(|row| row.len() == 1)
    }

    /// Wrap unless every sample output is already a list.
    pub fn wrap_for(outputs: &[Value]) -> bool {
        !outputs.iter().all(Value::is_list)
    }

    fn input(self, row: &[Value], name: &str) -> Result<Value> {
        if !self.unpack_input {
            return Ok(Value::List(row.to_vec()));
        }
        match row {
            [value] => Ok(value.clone()),
            _ => Err(ConvertError::Function {
                name: name.to_string(),
                message: format!("expects a single value, got {}", row.len()),
            }),
        }
    }

    fn output(self, value: Value, name: &str) -> Result<Row> {
        if self.wrap_output {
            return Ok(vec![value]);
        }
        match value {
            Value::List(items) => Ok(items),
            other => Err(ConvertError::Function {
                name: name.to_string(),
                message: format!("did not return a list: {}", other.repr()),
            }),
        }
    }
}

/// Wraps a single-value function, inferring input and output shaping at fit.
///
/// Unset overrides are derived from the sample: inputs are unpacked when
/// every row has one value, outputs are wrapped unless every output is a
/// list. The resulting [`ShapePolicy`] is fixed for all later calls.
#[derive(Clone)]
pub struct Function {
    name: String,
    func: ValueFn,
    label_fn: Option<ValueFn>,
    unpack_input: Option<bool>,
    wrap_output: Option<bool>,
    policy: Option<ShapePolicy>,
}

impl Function {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        Self::from_arc(name, Arc::new(func))
    }

    pub fn from_arc(name: impl Into<String>, func: ValueFn) -> Self {
        Self {
            name: name.into(),
            func,
            label_fn: None,
            unpack_input: None,
            wrap_output: None,
            policy: None,
        }
    }

    #[must_use]
    pub fn with_labels<F>(mut self, labels: F) -> Self
    where
        F: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.label_fn = Some(Arc::new(labels));
        self
    }

    #[must_use]
    pub fn with_unpack_input(mut self, unpack: bool) -> Self {
        self.unpack_input = Some(unpack);
        self
    }

    #[must_use]
    pub fn with_wrap_output(mut self, wrap: bool) -> Self {
        self.wrap_output = Some(wrap);
        self
    }

    /// The shaping in effect: fitted, else overrides, else unpack and wrap.
    pub fn policy(&self) -> ShapePolicy {
        self.policy.unwrap_or(ShapePolicy {
            unpack_input: self.unpack_input.unwrap_or(true),
            wrap_output: self.wrap_output.unwrap_or(true),
        })
    }
}

impl Converter for Function {
    fn name(&self) -> &'static str {
        "Function"
    }

    fn fit(&mut self, rows: &[Row]) -> Result<()> {
        let unpack_input = self
            .unpack_input
            .unwrap_or_else(|| ShapePolicy::unpack_for(rows));
        let wrap_output = match self.wrap_output {
            Some(wrap) => wrap,
            None => {
                let shaping = ShapePolicy {
                    unpack_input,
                    wrap_output: true,
                };
                let outputs = rows
                    .iter()
                    .map(|row| (self.func)(&shaping.input(row, &self.name)?))
                    .collect::<Result<Vec<_>>>()?;
                ShapePolicy::wrap_for(&outputs)
            }
        };
        let policy = ShapePolicy {
            unpack_input,
            wrap_output,
        };
        debug!(function = %self.name, unpack_input, wrap_output, "fitted function shape");
        self.policy = Some(policy);
        Ok(())
    }

    fn labels(&self, labels: &[Value]) -> Result<Row> {
        let input = self.policy().input(labels, &self.name)?;
        let output = match &self.label_fn {
            Some(label_fn) => label_fn(&input)?,
            None => input,
        };
        Ok(match output {
            Value::List(items) => items,
            other => vec![other],
        })
    }

    fn transform(&self, row: &[Value]) -> Result<Row> {
        let policy = self.policy();
        let output = (self.func)(&policy.input(row, &self.name)?)?;
        policy.output(output, &self.name)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("has_labels", &self.label_fn.is_some())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.label_fn.is_none() && self.unpack_input.is_none() && self.wrap_output.is_none() {
            return f.write_str(&self.name);
        }
        let mut args = vec![self.name.clone()];
        if self.label_fn.is_some() {
            args.push("labels=<fn>".to_string());
        }
        if let Some(unpack) = self.unpack_input {
            args.push(format!("unpack_input={unpack}"));
        }
        if let Some(wrap) = self.wrap_output {
            args.push(format!("wrap_output={wrap}"));
        }
        write!(f, "Function({})", args.join(", "))
    }
}

/// Output width of a [`StrictFunction`] observed during fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputCardinality {
    Fixed(usize),
    Varying,
}

/// Labels for `cardinality` outputs derived from the input labels.
///
/// Matching counts pass through, a single output joins the inputs with
/// `", "`, a single input gains `_0`, `_1`, ... suffixes. Varying outputs
/// get one joined label.
pub fn derive_labels(labels: &[Value], cardinality: OutputCardinality) -> Result<Row> {
    let count = match cardinality {
        OutputCardinality::Varying => return Ok(vec![join_labels(labels)]),
        OutputCardinality::Fixed(count) => count,
    };
    if labels.len() == count {
        return Ok(labels.to_vec());
    }
    match (count, labels) {
        (0, _) => Ok(Vec::new()),
        (1, _) => Ok(vec![join_labels(labels)]),
        (_, [label]) => Ok((0..count)
            .map(|index| Value::Str(format!("{label}_{index}")))
            .collect()),
        _ => Err(ConvertError::invalid_config(format!(
            "cannot generate {count} output labels from {} input labels",
            labels.len()
        ))),
    }
}

/// Row-level function without shape inference.
///
/// Without a label function, output labels follow [`derive_labels`] using
/// the output width observed during fit.
#[derive(Clone)]
pub struct StrictFunction {
    name: String,
    func: RowFn,
    label_fn: Option<RowFn>,
    cardinality: Option<OutputCardinality>,
}

impl StrictFunction {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Row> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
            label_fn: None,
            cardinality: None,
        }
    }

    #[must_use]
    pub fn with_labels<F>(mut self, labels: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Row> + Send + Sync + 'static,
    {
        self.label_fn = Some(Arc::new(labels));
        self
    }

    pub fn cardinality(&self) -> Option<OutputCardinality> {
        self.cardinality
    }
}

impl Converter for StrictFunction {
    fn name(&self) -> &'static str {
        "StrictFunction"
    }

    fn fit(&mut self, rows: &[Row]) -> Result<()> {
        if self.label_fn.is_some() {
            return Ok(());
        }
        let widths = rows
            .iter()
            .map(|row| (self.func)(row).map(|output| output.len()))
            .collect::<Result<Vec<_>>>()?;
        let Some(&first) = widths.first() else {
            return Err(ConvertError::EmptySample {
                what: format!("function {}", self.name),
            });
        };
        let cardinality = if widths.iter().all(|&width| width == first) {
            OutputCardinality::Fixed(first)
        } else {
            OutputCardinality::Varying
        };
        debug!(function = %self.name, ?cardinality, "fitted output cardinality");
        self.cardinality = Some(cardinality);
        Ok(())
    }

    fn labels(&self, labels: &[Value]) -> Result<Row> {
        if let Some(label_fn) = &self.label_fn {
            return label_fn(labels);
        }
        let cardinality = self.cardinality.ok_or_else(|| ConvertError::NotFitted {
            converter: "StrictFunction",
            reason: "output cardinality is observed during fit".to_string(),
        })?;
        derive_labels(labels, cardinality)
    }

    fn transform(&self, row: &[Value]) -> Result<Row> {
        (self.func)(row)
    }
}

impl fmt::Debug for StrictFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrictFunction")
            .field("name", &self.name)
            .field("has_labels", &self.label_fn.is_some())
            .field("cardinality", &self.cardinality)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for StrictFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StrictFunction({})", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn first_and_last(value: &Value) -> Result<Value> {
        let text = value
            .as_str()
            .ok_or_else(|| ConvertError::invalid_value("Function", "expected a string"))?;
        let code = |c: Option<char>| Value::Int(c.map_or(0, |c| i64::from(u32::from(c))));
        Ok(Value::List(vec![code(text.chars().next()), code(text.chars().last())]))
    }

    #[test]
    fn shape_policy_functions() {
        let single = vec![vec![Value::from("a")], vec![Value::from("b")]];
        let wide = vec![vec![Value::from("a"), Value::from("b")]];
        assert!(ShapePolicy::unpack_for(&single));
        assert!(!ShapePolicy::unpack_for(&wide));
        assert!(!ShapePolicy::wrap_for(&[Value::List(vec![]), Value::List(vec![])]));
        assert!(ShapePolicy::wrap_for(&[Value::List(vec![]), Value::Int(1)]));
    }

    #[test]
    fn list_outputs_are_spread() {
        let mut function = Function::new("first_and_last", first_and_last);
        function
            .fit(&[vec![Value::from("diverse")], vec![Value::from("male")]])
            .expect("fit");
        assert_eq!(
            function.policy(),
            ShapePolicy {
                unpack_input: true,
                wrap_output: false
            }
        );
        assert_eq!(
            function.transform(&[Value::from("div")]).expect("transform"),
            vec![Value::Int(100), Value::Int(118)]
        );
        assert_eq!(
            function.labels(&[Value::from("gender")]).expect("labels"),
            vec![Value::from("gender")]
        );
    }

    #[test]
    fn scalar_outputs_are_wrapped() {
        let mut function = Function::new("len", |value: &Value| {
            Ok(Value::from(value.to_string().len()))
        });
        function.fit(&[vec![Value::from("abc")]]).expect("fit");
        assert_eq!(
            function.transform(&[Value::from("abcd")]).expect("transform"),
            vec![Value::Int(4)]
        );
        assert_eq!(function.to_string(), "len");
    }

    #[test]
    fn derive_labels_rules() {
        let one = [Value::from("x")];
        let two = [Value::from("a"), Value::from("b")];
        assert_eq!(derive_labels(&two, OutputCardinality::Fixed(2)).expect("pass"), two.to_vec());
        assert_eq!(
            derive_labels(&two, OutputCardinality::Fixed(1)).expect("join"),
            vec![Value::from("a, b")]
        );
        assert!(derive_labels(&two, OutputCardinality::Fixed(0)).expect("none").is_empty());
        assert_eq!(
            derive_labels(&one, OutputCardinality::Fixed(3)).expect("suffix"),
            vec![Value::from("x_0"), Value::from("x_1"), Value::from("x_2")]
        );
        assert_eq!(
            derive_labels(&two, OutputCardinality::Varying).expect("varying"),
            vec![Value::from("a, b")]
        );
        assert_eq!(
            derive_labels(&two, OutputCardinality::Fixed(3)).expect_err("bad").kind(),
            ErrorKind::InvalidConfig
        );
    }

    #[test]
    fn strict_function_observes_cardinality() {
        let mut split = StrictFunction::new("chars", |row: &[Value]| {
            Ok(row[0].to_string().chars().map(|c| Value::from(c.to_string())).collect())
        });
        split.fit(&[vec![Value::from("ab")], vec![Value::from("cd")]]).expect("fit");
        assert_eq!(split.cardinality(), Some(OutputCardinality::Fixed(2)));
        assert_eq!(
            split.labels(&[Value::from("code")]).expect("labels"),
            vec![Value::from("code_0"), Value::from("code_1")]
        );

        let mut varying = split.clone();
        varying.cardinality = None;
        varying.fit(&[vec![Value::from("a")], vec![Value::from("bcd")]]).expect("fit");
        assert_eq!(varying.cardinality(), Some(OutputCardinality::Varying));
    }
}
