//! A record profile applied to whole tables.

use tabconv_core::{ConverterSpec, RecordProfile};
use tabconv_model::Record;
use tracing::info;

use crate::error::{IngestError, Result};
use crate::preprocess::Preprocessor;
use crate::table::Table;

/// Table-level settings layered over the profile's own options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOptions {
    /// Columns dropped from the output regardless of the profile.
    pub ignore: Vec<String>,
    /// Apply the default normalization before conversion.
    pub preprocess: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            ignore: Vec::new(),
            preprocess: true,
        }
    }
}

impl TableOptions {
    #[must_use]
    pub fn with_ignored<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore.extend(columns.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_preprocess(mut self, preprocess: bool) -> Self {
        self.preprocess = preprocess;
        self
    }
}

/// A [`RecordProfile`] that reads tables, prepares their values and
/// reports failures with the offending row.
#[derive(Debug)]
pub struct TableProfile {
    profile: RecordProfile,
    preprocessor: Preprocessor,
}

impl TableProfile {
    /// Wrap `profile`, marking the ignored columns and choosing the
    /// pre-processing from `options`.
    pub fn new(mut profile: RecordProfile, options: &TableOptions) -> Result<Self> {
        for column in &options.ignore {
            profile
                .set(column.as_str(), ConverterSpec::Ignore)
                .map_err(IngestError::Config)?;
        }
        let preprocessor = if options.preprocess {
            Preprocessor::Normalize
        } else {
            Preprocessor::Disabled
        };
        Ok(Self {
            profile,
            preprocessor,
        })
    }

    #[must_use]
    pub fn with_preprocessor(mut self, preprocessor: Preprocessor) -> Self {
        self.preprocessor = preprocessor;
        self
    }

    pub fn profile(&self) -> &RecordProfile {
        &self.profile
    }

    pub fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    pub fn into_inner(self) -> RecordProfile {
        self.profile
    }

    fn prepare(&self, table: &Table) -> Vec<Record> {
        self.preprocessor.apply_all(&table.to_records())
    }

    pub fn fit(&mut self, table: &Table) -> Result<()> {
        let records = self.prepare(table);
        info!(rows = records.len(), columns = table.width(), "fitting profile");
        self.profile.fit(&records).map_err(IngestError::Fit)?;
        info!(
            keys = self.profile.len(),
            outputs = self.profile.output_labels().len(),
            "profile fitted"
        );
        Ok(())
    }

    /// Convert every row into a table headed by the output labels.
    pub fn transform(&self, table: &Table) -> Result<Table> {
        let records = self.prepare(table);
        let converted = records
            .iter()
            .enumerate()
            .map(|(row, record)| {
                self.profile
                    .transform(record)
                    .map_err(|source| IngestError::Convert { row, source })
            })
            .collect::<Result<Vec<_>>>()?;
        info!(rows = converted.len(), "converted table");
        Ok(Table::from_records(&self.profile.output_labels(), &converted))
    }

    pub fn fit_transform(&mut self, table: &Table) -> Result<Table> {
        self.fit(table)?;
        self.transform(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabconv_core::ErrorKind;

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        Table::new(
            headers.iter().map(|header| header.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn normalizes_before_inferring() {
        let input = table(&["Sex"], &[&[" M"], &["m "], &["F"]]);
        let mut profile =
            TableProfile::new(RecordProfile::new(), &TableOptions::default()).expect("profile");
        let output = profile.fit_transform(&input).expect("convert");
        assert_eq!(output.headers, vec!["Sex"]);
        assert_eq!(output.rows, vec![vec!["1"], vec!["1"], vec!["0"]]);
    }

    #[test]
    fn ignored_columns_are_dropped() {
        let input = table(&["id", "sex"], &[&["1", "m"], &["2", "f"]]);
        let options = TableOptions::default().with_ignored(["id"]);
        let mut profile = TableProfile::new(RecordProfile::new(), &options).expect("profile");
        let output = profile.fit_transform(&input).expect("convert");
        assert_eq!(output.headers, vec!["sex"]);
    }

    #[test]
    fn transform_errors_name_the_row() {
        let options = TableOptions::default().with_preprocess(false);
        let mut profile = TableProfile::new(RecordProfile::new(), &options).expect("profile");
        profile
            .fit(&table(&["c"], &[&["a"], &["b"], &["c"]]))
            .expect("fit");
        let err = profile
            .transform(&table(&["c"], &[&["a"], &["z"]]))
            .expect_err("unknown value");
        match err {
            IngestError::Convert { row, source } => {
                assert_eq!(row, 1);
                assert_eq!(source.kind(), ErrorKind::UnknownValue);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn fit_errors_keep_the_cause_as_source() {
        let ids: Vec<String> = (0..150).map(|i| format!("id-{i}")).collect();
        let rows: Vec<Vec<&str>> = ids.iter().map(|id| vec![id.as_str()]).collect();
        let rows: Vec<&[&str]> = rows.iter().map(Vec::as_slice).collect();
        let mut profile =
            TableProfile::new(RecordProfile::new(), &TableOptions::default()).expect("profile");
        let err = profile.fit(&table(&["id"], &rows)).expect_err("uninferrable");
        assert_eq!(err.to_string(), "failed to fit profile");
        let IngestError::Fit(source) = &err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(source.kind(), ErrorKind::Uninferrable);
        let chained = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(chained, Some(source.to_string()));
    }
}
