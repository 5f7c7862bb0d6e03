//! Sequential composition of converters.

use std::fmt;

use tabconv_model::{Row, Value};

use crate::converter::{Converter, Slot};
use crate::error::{Phase, Result};
use crate::leaf::Id;
use crate::spec::ConverterSpec;

/// Sequential composition: each stage consumes the previous stage's output.
///
/// Fitting threads the sample forward, so every stage is fitted against the
/// rows it will actually receive. Pending inference stages are resolved in
/// place as they are fitted.
#[derive(Debug, Default)]
pub struct Pipeline {
    stages: Vec<Slot>,
}

impl Pipeline {
    pub fn new<I>(stages: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<ConverterSpec>,
    {
        let mut pipeline = Self::default();
        for stage in stages {
            pipeline.push(stage)?;
        }
        Ok(pipeline)
    }

    pub fn from_slots(stages: Vec<Slot>) -> Self {
        Self { stages }
    }

    /// Append a stage. Nested pipelines and sequences are spliced in.
    pub fn push(&mut self, stage: impl Into<ConverterSpec>) -> Result<()> {
        match stage.into() {
            ConverterSpec::Sequence(stages) => {
                for stage in stages {
                    self.push(stage)?;
                }
            }
            other => self.push_slot(other.resolve()?),
        }
        Ok(())
    }

    pub fn push_slot(&mut self, slot: Slot) {
        match slot {
            Slot::Ready(converter) if converter.is::<Pipeline>() => {
                if let Some(inner) = converter.downcast::<Pipeline>() {
                    self.stages.extend(inner.stages);
                }
            }
            other => self.stages.push(other),
        }
    }

    pub fn then(mut self, stage: impl Into<ConverterSpec>) -> Result<Self> {
        self.push(stage)?;
        Ok(self)
    }

    pub fn stages(&self) -> &[Slot] {
        &self.stages
    }

    pub fn stage(&self, index: usize) -> Option<&Slot> {
        self.stages.get(index)
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

fn stage_scope(index: usize) -> String {
    format!("stage {index}")
}

impl Converter for Pipeline {
    fn name(&self) -> &'static str {
        "Pipeline"
    }

    fn fit(&mut self, rows: &[Row]) -> Result<()> {
        let mut current = rows.to_vec();
        let last = self.stages.len().saturating_sub(1);
        for (index, stage) in self.stages.iter_mut().enumerate() {
            stage
                .fit(&current)
                .map_err(|err| err.within(stage_scope(index), stage.name(), Phase::Fit))?;
            if index < last {
                current = current
                    .iter()
                    .map(|row| stage.transform(row))
                    .collect::<Result<Vec<_>>>()
                    .map_err(|err| err.within(stage_scope(index), stage.name(), Phase::Transform))?;
            }
        }
        Ok(())
    }

    fn labels(&self, labels: &[Value]) -> Result<Row> {
        let mut current = labels.to_vec();
        for (index, stage) in self.stages.iter().enumerate() {
            current = stage
                .labels(&current)
                .map_err(|err| err.within(stage_scope(index), stage.name(), Phase::Labels))?;
        }
        Ok(current)
    }

    fn transform(&self, row: &[Value]) -> Result<Row> {
        let mut current = row.to_vec();
        for (index, stage) in self.stages.iter().enumerate() {
            current = stage
                .transform(&current)
                .map_err(|err| err.within(stage_scope(index), stage.name(), Phase::Transform))?;
        }
        Ok(current)
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown: Vec<String> = self
            .stages
            .iter()
            .filter(|stage| !stage.converter().is_some_and(|converter| converter.is::<Id>()))
            .map(ToString::to_string)
            .collect();
        write!(f, "[{}]", shown.join(", "))
    }
}
