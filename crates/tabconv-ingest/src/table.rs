//! CSV tables and their conversion to and from records.

use std::collections::HashSet;
use std::path::Path;

use tabconv_model::{Record, Value};
use tracing::debug;

use crate::error::{IngestError, Result};

/// Reader and writer settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CsvOptions {
    /// Field delimiter. `None` picks one from the file extension.
    pub delimiter: Option<u8>,
}

impl CsvOptions {
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// The configured delimiter, or one picked from the extension: tab for
    /// `.tsv`, comma for `.csv`. Any other extension is rejected.
    pub fn delimiter_for(&self, path: &Path) -> Result<u8> {
        if let Some(delimiter) = self.delimiter {
            return Ok(delimiter);
        }
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => Ok(b'\t'),
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Ok(b','),
            _ => Err(IngestError::UnsupportedExtension {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// A header row plus string cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// Cells of one column, or `None` if the column does not exist.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.headers.iter().position(|header| header == name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(index).map_or("", String::as_str))
                .collect(),
        )
    }

    /// One record per row with every cell as a string value.
    pub fn to_records(&self) -> Vec<Record> {
        self.rows
            .iter()
            .map(|row| {
                self.headers
                    .iter()
                    .enumerate()
                    .map(|(index, header)| {
                        let cell = row.get(index).cloned().unwrap_or_default();
                        (header.clone(), Value::Str(cell))
                    })
                    .collect()
            })
            .collect()
    }

    /// Lay records out under the given labels. Missing fields become empty cells.
    pub fn from_records<S: AsRef<str>>(labels: &[S], records: &[Record]) -> Self {
        let headers: Vec<String> = labels.iter().map(|label| label.as_ref().to_string()).collect();
        let rows = records
            .iter()
            .map(|record| {
                headers
                    .iter()
                    .map(|label| record.get(label).map(ToString::to_string).unwrap_or_default())
                    .collect()
            })
            .collect();
        Self { headers, rows }
    }
}

/// Normalizes a header cell by trimming whitespace and a byte order mark.
pub fn normalize_header(value: &str) -> String {
    value.trim_start_matches('\u{feff}').trim().to_string()
}

fn check_headers(path: &Path, headers: &[String]) -> Result<()> {
    let mut seen = HashSet::new();
    for (index, header) in headers.iter().enumerate() {
        if header.is_empty() {
            return Err(IngestError::UnnamedColumn {
                path: path.to_path_buf(),
                index,
            });
        }
        if !seen.insert(header.as_str()) {
            return Err(IngestError::DuplicateColumn {
                path: path.to_path_buf(),
                column: header.clone(),
            });
        }
    }
    Ok(())
}

/// Read a CSV or TSV file.
///
/// Headers are trimmed and must be unique and non-empty. Rows whose cells
/// are all blank are skipped; short rows are padded with empty cells.
pub fn read_table(path: &Path, options: &CsvOptions) -> Result<Table> {
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let delimiter = options.delimiter_for(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|e| IngestError::CsvRead {
            path: path.to_path_buf(),
            source: e,
        })?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| IngestError::CsvRead {
            path: path.to_path_buf(),
            source: e,
        })?
        .iter()
        .map(normalize_header)
        .collect();
    if headers.is_empty() {
        return Err(IngestError::EmptyTable {
            path: path.to_path_buf(),
        });
    }
    check_headers(path, &headers)?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for result in reader.records() {
        let record = result.map_err(|e| IngestError::CsvRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            skipped += 1;
            continue;
        }
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(headers.len(), String::new());
        rows.push(row);
    }
    debug!(
        path = %path.display(),
        columns = headers.len(),
        rows = rows.len(),
        skipped,
        "read table"
    );
    Ok(Table { headers, rows })
}

/// Write a table, header first.
///
/// The delimiter follows the same rules as [`read_table`], so a path that
/// could not be read back is refused before anything is created.
pub fn write_table(path: &Path, table: &Table, options: &CsvOptions) -> Result<()> {
    let delimiter = options.delimiter_for(path)?;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|e| IngestError::CsvWrite {
            path: path.to_path_buf(),
            source: e,
        })?;
    writer
        .write_record(&table.headers)
        .map_err(|e| IngestError::CsvWrite {
            path: path.to_path_buf(),
            source: e,
        })?;
    for row in &table.rows {
        writer.write_record(row).map_err(|e| IngestError::CsvWrite {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    writer.flush().map_err(|e| IngestError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    debug!(path = %path.display(), rows = table.len(), "wrote table");
    Ok(())
}

/// Write converted records under their output labels.
pub fn write_records<S: AsRef<str>>(
    path: &Path,
    labels: &[S],
    records: &[Record],
    options: &CsvOptions,
) -> Result<()> {
    write_table(path, &Table::from_records(labels, records), options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabconv_model::record;

    #[test]
    fn delimiter_follows_extension() {
        let options = CsvOptions::default();
        let delimiter = |name: &str| options.delimiter_for(Path::new(name)).expect(name);
        assert_eq!(delimiter("a.tsv"), b'\t');
        assert_eq!(delimiter("a.TSV"), b'\t');
        assert_eq!(delimiter("a.csv"), b',');
        assert_eq!(delimiter("a.Csv"), b',');

        let semicolon = options.with_delimiter(b';');
        assert_eq!(semicolon.delimiter_for(Path::new("a.tsv")).expect("tsv"), b';');
        assert_eq!(semicolon.delimiter_for(Path::new("a.txt")).expect("txt"), b';');
    }

    #[test]
    fn unknown_extensions_need_a_delimiter() {
        let options = CsvOptions::default();
        for name in ["a", "a.txt", "a.csv.bak"] {
            let err = options.delimiter_for(Path::new(name)).expect_err(name);
            assert!(matches!(err, IngestError::UnsupportedExtension { .. }), "{name}");
        }
    }

    #[test]
    fn normalize_header_trims() {
        assert_eq!(normalize_header("  Age "), "Age");
        assert_eq!(normalize_header("\u{feff}id"), "id");
    }

    #[test]
    fn records_keep_column_order() {
        let table = Table::new(
            vec!["b".to_string(), "a".to_string()],
            vec![vec!["1".to_string()]],
        );
        let records = table.to_records();
        assert_eq!(records[0], record([("b", "1"), ("a", "")]));
        assert_eq!(table.column("a"), Some(vec![""]));
        assert_eq!(table.column("c"), None);
    }

    #[test]
    fn from_records_fills_missing_cells() {
        let records = vec![
            record([("x", Value::Int(1)), ("y", Value::Float(0.5))]),
            record([("x", Value::Int(0))]),
        ];
        let table = Table::from_records(&["x", "y"], &records);
        assert_eq!(table.rows, vec![vec!["1", "0.5"], vec!["0", ""]]);
    }

    #[test]
    fn duplicate_headers_are_rejected() {
        let headers = vec!["a".to_string(), "a".to_string()];
        let err = check_headers(Path::new("t.csv"), &headers).expect_err("duplicate");
        assert!(matches!(err, IngestError::DuplicateColumn { column, .. } if column == "a"));
    }
}
