//! Per-record routing of fields to converters.

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use tabconv_model::{Key, Record, Row};
use tracing::{debug, info};

use crate::combinator::Pipeline;
use crate::converter::{Converter, Slot};
use crate::error::{ConvertError, Phase, Result};
use crate::infer::Infer;
use crate::labels::dedupe_labels;
use crate::leaf::{Id, Ignore};
use crate::spec::ConverterSpec;

/// Policies for keys the profile was not explicitly configured with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProfileOptions {
    /// Ignore discovered fields instead of inferring a converter for them.
    pub ignore_undefined: bool,
    /// Ignore fields whose converter cannot be inferred instead of failing.
    pub ignore_uninferrable: bool,
}

impl ProfileOptions {
    #[must_use]
    pub fn with_ignore_undefined(mut self, ignore: bool) -> Self {
        self.ignore_undefined = ignore;
        self
    }

    #[must_use]
    pub fn with_ignore_uninferrable(mut self, ignore: bool) -> Self {
        self.ignore_uninferrable = ignore;
        self
    }
}

/// Routes each record key to its converter and assembles output records.
///
/// Keys are processed in declaration order: configured keys first, then
/// fields discovered during [`RecordProfile::fit`] in first-seen order.
/// After fitting, every key has a resolved converter and a tuple of output
/// labels that is unique across the whole profile.
#[derive(Debug, Default)]
pub struct RecordProfile {
    entries: IndexMap<Key, Slot>,
    labels: IndexMap<Key, Vec<String>>,
    options: ProfileOptions,
    fitted: bool,
}

impl RecordProfile {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_options(mut self, options: ProfileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> ProfileOptions {
        self.options
    }

    /// Assign the converter for `key`, replacing any previous assignment.
    pub fn set(&mut self, key: impl Into<Key>, spec: impl Into<ConverterSpec>) -> Result<()> {
        let slot = spec.into().resolve()?;
        self.entries.insert(key.into(), slot);
        self.fitted = false;
        Ok(())
    }

    pub fn with(mut self, key: impl Into<Key>, spec: impl Into<ConverterSpec>) -> Result<Self> {
        self.set(key, spec)?;
        Ok(self)
    }

    /// Run `spec` after the converter already assigned to `key`.
    ///
    /// An existing pipeline is extended in place; any other converter
    /// becomes the first stage of a new pipeline. Unassigned keys are set.
    pub fn append(&mut self, key: impl Into<Key>, spec: impl Into<ConverterSpec>) -> Result<()> {
        let key = key.into();
        let Some(slot) = self.entries.get_mut(&key) else {
            return self.set(key, spec);
        };
        self.fitted = false;
        if let Some(pipeline) = slot
            .converter_mut()
            .and_then(|converter| converter.downcast_mut::<Pipeline>())
        {
            return pipeline.push(spec);
        }
        let previous = std::mem::replace(slot, Slot::ready(Id));
        let mut pipeline = Pipeline::from_slots(vec![previous]);
        pipeline.push(spec)?;
        *slot = Slot::ready(pipeline);
        Ok(())
    }

    /// Fit every key against the values present in `records`.
    pub fn fit(&mut self, records: &[Record]) -> Result<()> {
        self.discover(records);
        info!(
            records = records.len(),
            keys = self.entries.len(),
            "fitting record profile"
        );

        for (key, slot) in &mut self.entries {
            let rows: Vec<Row> = records.iter().filter_map(|record| key.row(record)).collect();
            if rows.is_empty() {
                return Err(ConvertError::EmptySample {
                    what: format!("key '{key}': no record provides a value"),
                });
            }
            if let Slot::Pending(request) = slot {
                *request = request
                    .clone()
                    .with_ignore_uninferrable(self.options.ignore_uninferrable);
            }
            slot.fit(&rows)
                .map_err(|err| err.within(format!("key '{key}'"), slot.name(), Phase::Fit))?;
            debug!(key = %key, converter = %slot, rows = rows.len(), "fitted key");
        }

        self.labels = self.compute_labels()?;
        self.fitted = true;
        Ok(())
    }

    /// Add a pending converter for every field no configured key covers.
    fn discover(&mut self, records: &[Record]) {
        let mut covered: HashSet<String> = self
            .entries
            .keys()
            .flat_map(Key::field_names)
            .map(str::to_string)
            .collect();
        for record in records {
            for field in record.keys() {
                if !covered.insert(field.clone()) {
                    continue;
                }
                let slot = if self.options.ignore_undefined {
                    Slot::ready(Ignore)
                } else {
                    Slot::Pending(
                        Infer::new().with_ignore_uninferrable(self.options.ignore_uninferrable),
                    )
                };
                debug!(field = %field, converter = %slot, "discovered field");
                self.entries.insert(Key::field(field.as_str()), slot);
            }
        }
    }

    fn compute_labels(&self) -> Result<IndexMap<Key, Vec<String>>> {
        let mut arities = Vec::with_capacity(self.entries.len());
        let mut flat = Vec::new();
        for (key, slot) in &self.entries {
            let labels = slot
                .labels(&key.input_labels())
                .map_err(|err| err.within(format!("key '{key}'"), slot.name(), Phase::Labels))?;
            arities.push(labels.len());
            flat.extend(labels.iter().map(ToString::to_string));
        }

        let mut unique = dedupe_labels(flat).into_iter();
        let labels: IndexMap<Key, Vec<String>> = self
            .entries
            .keys()
            .zip(arities)
            .map(|(key, arity)| (key.clone(), unique.by_ref().take(arity).collect()))
            .collect();
        for (key, key_labels) in &labels {
            debug!(key = %key, labels = ?key_labels, "resolved output labels");
        }
        Ok(labels)
    }

    /// Convert one record.
    ///
    /// Keys whose fields are absent from `record` produce no output.
    pub fn transform(&self, record: &Record) -> Result<Record> {
        if !self.fitted {
            return Err(ConvertError::NotFitted {
                converter: "RecordProfile",
                reason: "call fit before transforming records".to_string(),
            });
        }
        for field in record.keys() {
            if !self
                .entries
                .keys()
                .any(|key| key.field_names().contains(&field.as_str()))
            {
                debug!(field = %field, "field is not part of the profile, skipping");
            }
        }

        let mut output = Record::new();
        for (key, slot) in &self.entries {
            let Some(row) = key.row(record) else {
                continue;
            };
            let values = slot
                .transform(&row)
                .map_err(|err| err.within(format!("key '{key}'"), slot.name(), Phase::Transform))?;
            let labels = self.labels.get(key).map(Vec::as_slice).unwrap_or_default();
            if values.len() != labels.len() {
                return Err(ConvertError::ArityMismatch {
                    key: key.to_string(),
                    converter: slot.to_string(),
                    values: values.len(),
                    labels: labels.len(),
                });
            }
            output.extend(labels.iter().cloned().zip(values));
        }
        Ok(output)
    }

    /// Convert records in order, naming the failing record's index.
    pub fn transform_batch(&self, records: &[Record]) -> Result<Vec<Record>> {
        records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                self.transform(record).map_err(|err| {
                    err.within(format!("record {index}"), "RecordProfile", Phase::Transform)
                })
            })
            .collect()
    }

    pub fn fit_transform(&mut self, records: &[Record]) -> Result<Vec<Record>> {
        self.fit(records)?;
        self.transform_batch(records)
    }

    /// All output labels in key order.
    pub fn output_labels(&self) -> Vec<&str> {
        self.labels
            .values()
            .flat_map(|labels| labels.iter().map(String::as_str))
            .collect()
    }

    /// Each key's resolved output labels.
    pub fn key_labels(&self) -> &IndexMap<Key, Vec<String>> {
        &self.labels
    }

    pub fn labels_for(&self, key: &Key) -> Option<&[String]> {
        self.labels.get(key).map(Vec::as_slice)
    }

    pub fn slot(&self, key: &Key) -> Option<&Slot> {
        self.entries.get(key)
    }

    pub fn converter(&self, key: &Key) -> Option<&dyn Converter> {
        self.entries.get(key).and_then(Slot::converter)
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }
}

impl fmt::Display for RecordProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, slot) in &self.entries {
            writeln!(f, "{key}: {slot}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::leaf::{Float, OneHot};
    use tabconv_model::{Value, record};

    fn people() -> Vec<Record> {
        vec![
            record([("name", "ann"), ("color", "blue"), ("age", "31")]),
            record([("name", "bob"), ("color", "green"), ("age", "28")]),
            record([("name", "ann"), ("color", "red"), ("age", "45")]),
        ]
    }

    #[test]
    fn discovered_fields_follow_configured_keys() {
        let mut profile = RecordProfile::new()
            .with("age", Float::new())
            .expect("profile");
        profile.fit(&people()).expect("fit");
        let keys: Vec<String> = profile.keys().map(ToString::to_string).collect();
        assert_eq!(keys, vec!["age", "name", "color"]);
        assert_eq!(
            profile.output_labels(),
            vec!["age", "name", "color=blue", "color=green", "color=red"]
        );
        let name = profile.converter(&Key::field("name")).expect("resolved");
        assert!(name.is::<crate::leaf::Binary>());
    }

    #[test]
    fn colliding_labels_are_suffixed() {
        let mut profile = RecordProfile::new()
            .with("name", OneHot::new())
            .expect("profile");
        let records = vec![
            record([("name", "ann"), ("name=ann", "1")]),
            record([("name", "bob"), ("name=ann", "2")]),
        ];
        let output = profile.fit_transform(&records).expect("fit");
        assert_eq!(
            profile.output_labels(),
            vec!["name=ann_1", "name=bob", "name=ann_2"]
        );
        assert_eq!(
            output[1],
            record([("name=ann_1", 0), ("name=bob", 1)])
                .into_iter()
                .chain([("name=ann_2".to_string(), Value::Float(2.0))])
                .collect::<Record>()
        );
    }

    #[test]
    fn ignore_undefined_drops_unconfigured_fields() {
        let mut profile = RecordProfile::new()
            .with_options(ProfileOptions::default().with_ignore_undefined(true))
            .with("age", Float::new())
            .expect("profile");
        let output = profile.fit_transform(&people()).expect("fit");
        assert_eq!(output[0], record([("age", 31.0)]));
    }

    #[test]
    fn keys_without_values_fail_fit() {
        let mut profile = RecordProfile::new()
            .with("missing", Float::new())
            .expect("profile");
        let err = profile.fit(&people()).expect_err("empty");
        assert_eq!(err.kind(), ErrorKind::EmptySample);
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn transform_before_fit_is_rejected() {
        let profile = RecordProfile::new();
        let err = profile.transform(&people()[0]).expect_err("not fitted");
        assert_eq!(err.kind(), ErrorKind::NotFitted);
    }

    #[test]
    fn tuple_keys_feed_one_converter() {
        let sum = ConverterSpec::from(crate::leaf::StrictFunction::new("sum", |row| {
            let total: f64 = row.iter().filter_map(Value::to_finite_f64).sum();
            Ok(vec![Value::Float(total)])
        }));
        let mut profile = RecordProfile::new()
            .with(Key::tuple(["a", "b"]), sum)
            .expect("profile");
        let records = vec![record([("a", "1"), ("b", "2")])];
        let output = profile.fit_transform(&records).expect("fit");
        assert_eq!(output[0], record([("a, b", 3.0)]));
    }
}
