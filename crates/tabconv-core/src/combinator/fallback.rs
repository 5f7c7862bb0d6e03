//! Ordered fallback between candidate converters.

use std::fmt;

use tabconv_model::{Row, Value};
use tracing::warn;

use crate::converter::{Converter, Slot};
use crate::error::{ConvertError, ErrorKind, Phase, Result};
use crate::spec::ConverterSpec;

/// Ordered fallback: the first candidate that does not fail wins.
///
/// During fit each candidate is fitted on the rows every earlier candidate
/// failed on. At transform time, when every candidate fails with a caught
/// error, the input row is returned unchanged.
#[derive(Debug, Default)]
pub struct Try {
    candidates: Vec<Slot>,
    /// Error kinds treated as "candidate does not apply"; `None` catches all.
    catch: Option<Vec<ErrorKind>>,
}

impl Try {
    pub fn new<I>(candidates: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<ConverterSpec>,
    {
        let candidates = candidates
            .into_iter()
            .map(|spec| spec.into().resolve())
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            candidates,
            catch: None,
        })
    }

    /// Only swallow the given error kinds; others propagate.
    #[must_use]
    pub fn with_catch(mut self, kinds: impl IntoIterator<Item = ErrorKind>) -> Self {
        self.catch = Some(kinds.into_iter().collect());
        self
    }

    pub fn candidates(&self) -> &[Slot] {
        &self.candidates
    }

    pub fn candidate(&self, index: usize) -> Option<&Slot> {
        self.candidates.get(index)
    }
}

fn catches(catch: Option<&[ErrorKind]>, err: &ConvertError) -> bool {
    catch.is_none_or(|kinds| kinds.contains(&err.kind()))
}

fn candidate_scope(index: usize) -> String {
    format!("candidate {index}")
}

impl Converter for Try {
    fn name(&self) -> &'static str {
        "Try"
    }

    fn fit(&mut self, rows: &[Row]) -> Result<()> {
        let catch = self.catch.as_deref();
        let count = self.candidates.len();
        let mut remaining = rows.to_vec();
        for (index, candidate) in self.candidates.iter_mut().enumerate() {
            candidate
                .fit(&remaining)
                .map_err(|err| err.within(candidate_scope(index), candidate.name(), Phase::Fit))?;
            if index + 1 == count {
                break;
            }

            let mut failing = Vec::new();
            for row in remaining {
                match candidate.transform(&row) {
                    Ok(_) => {}
                    Err(err) if catches(catch, &err) => failing.push(row),
                    Err(err) => {
                        return Err(err.within(
                            candidate_scope(index),
                            candidate.name(),
                            Phase::Transform,
                        ));
                    }
                }
            }
            remaining = failing;
            if remaining.is_empty() {
                warn!(
                    converter = candidate.name(),
                    unfitted = count - index - 1,
                    "no sample rows left for later fallback candidates, leaving them unfitted"
                );
                break;
            }
        }
        Ok(())
    }

    fn labels(&self, labels: &[Value]) -> Result<Row> {
        match self.candidates.first() {
            Some(first) => first.labels(labels),
            None => Ok(labels.to_vec()),
        }
    }

    fn transform(&self, row: &[Value]) -> Result<Row> {
        let catch = self.catch.as_deref();
        for (index, candidate) in self.candidates.iter().enumerate() {
            if candidate.is_pending() {
                continue;
            }
            match candidate.transform(row) {
                Ok(output) => return Ok(output),
                Err(err) if catches(catch, &err) => {}
                Err(err) => {
                    return Err(err.within(
                        candidate_scope(index),
                        candidate.name(),
                        Phase::Transform,
                    ));
                }
            }
        }
        Ok(row.to_vec())
    }
}

impl fmt::Display for Try {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.candidates.iter().map(ToString::to_string).collect();
        if parts.len() == 1 {
            write!(f, "({},)", parts[0])
        } else {
            write!(f, "({})", parts.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaf::{Enumerate, Float};

    fn column(values: &[&str]) -> Vec<Row> {
        values.iter().map(|value| vec![Value::from(*value)]).collect()
    }

    #[test]
    fn second_candidate_handles_what_the_first_rejects() {
        let mut fallback = Try::new([
            ConverterSpec::lookup([("a", 1)]),
            ConverterSpec::lookup([("a", 2), ("b", 3)]),
        ])
        .expect("try");
        fallback.fit(&column(&["a", "b"])).expect("fit");
        assert_eq!(
            fallback.transform(&[Value::from("b")]).expect("transform"),
            vec![Value::Int(3)]
        );
        assert_eq!(
            fallback.transform(&[Value::from("a")]).expect("transform"),
            vec![Value::Int(1)]
        );
        assert_eq!(fallback.to_string(), r#"({"a": 1}, {"a": 2, "b": 3})"#);
    }

    #[test]
    fn input_is_returned_when_every_candidate_fails() {
        let fallback = Try::new([ConverterSpec::lookup([("div", "diverse")])]).expect("try");
        assert_eq!(
            fallback.transform(&[Value::from("male")]).expect("transform"),
            vec![Value::from("male")]
        );
        assert_eq!(fallback.to_string(), r#"({"div": "diverse"},)"#);
    }

    #[test]
    fn later_candidates_fit_only_on_failing_rows() {
        let mut fallback =
            Try::new([ConverterSpec::from(Float::new()), Enumerate::new().into()]).expect("try");
        fallback.fit(&column(&["1", "x", "2", "y"])).expect("fit");
        let enumerate = fallback
            .candidate(1)
            .and_then(Slot::converter)
            .and_then(|candidate| candidate.downcast_ref::<Enumerate>())
            .expect("enumerate");
        assert_eq!(enumerate.values(), vec![&Value::from("x"), &Value::from("y")]);
        assert_eq!(
            fallback.transform(&[Value::from("y")]).expect("transform"),
            vec![Value::Int(1)]
        );
    }

    #[test]
    fn uncaught_kinds_propagate() {
        let fallback = Try::new([ConverterSpec::lookup([("a", 1)])])
            .expect("try")
            .with_catch([ErrorKind::InvalidValue]);
        let err = fallback.transform(&[Value::from("b")]).expect_err("propagates");
        assert_eq!(err.kind(), ErrorKind::UnknownValue);
    }

    #[test]
    fn unfitted_candidates_are_skipped_at_transform() {
        let mut fallback =
            Try::new([ConverterSpec::from(Float::new()), ConverterSpec::Infer]).expect("try");
        fallback.fit(&column(&["1", "2"])).expect("fit");
        assert!(fallback.candidates()[1].is_pending());
        assert_eq!(
            fallback.transform(&[Value::from("x")]).expect("transform"),
            vec![Value::from("x")]
        );
    }

    #[test]
    fn unfitted_candidates_are_skipped_with_a_catch_list() {
        let mut fallback = Try::new([ConverterSpec::lookup([("a", 1)]), ConverterSpec::Infer])
            .expect("try")
            .with_catch([ErrorKind::UnknownValue]);
        fallback.fit(&column(&["a"])).expect("fit");
        assert!(fallback.candidates()[1].is_pending());
        assert_eq!(
            fallback.transform(&[Value::from("b")]).expect("transform"),
            vec![Value::from("b")]
        );
    }
}
