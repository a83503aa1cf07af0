//! Delimited-file dataset loading.
//!
//! A [`Dataset`] is the header plus every record of the source file. Each
//! row holds exactly one cell per declared column; a cell is `None` when the
//! physical record was shorter than the header. Values are kept verbatim so
//! the repair engine can write them back unchanged.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;

use crate::error::{GovernanceError, Result};
use crate::governance::config::InputConfig;

/// One data row; `None` marks a cell the record did not supply.
pub type Row = Vec<Option<String>>;

/// In-memory tabular dataset read from a delimited file.
#[derive(Debug, Clone)]
pub struct Dataset {
    source: PathBuf,
    columns: Vec<String>,
    rows: Vec<Row>,
    input: InputConfig,
}

impl Dataset {
    /// Reads the whole file at `path`.
    ///
    /// # Errors
    /// Returns `GovernanceError::DataAccess` if the file cannot be opened,
    /// has no header row, declares a column twice, or contains a record with
    /// more fields than the header.
    pub fn load(path: &Path, input: &InputConfig) -> Result<Self> {
        let delimiter = input.delimiter_byte()?;

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .from_path(path)
            .map_err(|e| GovernanceError::data_access(path, e))?;

        let headers = reader
            .headers()
            .map_err(|e| GovernanceError::data_access(path, e))?
            .clone();

        let columns: Vec<String> = headers
            .iter()
            .map(|h| h.trim_matches('\u{feff}').trim().to_string())
            .collect();

        if columns.is_empty() || columns.iter().all(String::is_empty) {
            return Err(GovernanceError::malformed(path, "missing header row"));
        }

        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(GovernanceError::malformed(
                    path,
                    format!("duplicate column name '{}'", column),
                ));
            }
        }

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record.map_err(|e| GovernanceError::data_access(path, e))?;
            if record.len() > columns.len() {
                return Err(GovernanceError::malformed(
                    path,
                    format!(
                        "data row {} has {} fields but the header declares {}",
                        index,
                        record.len(),
                        columns.len()
                    ),
                ));
            }
            let mut row: Row = record.iter().map(|v| Some(v.to_string())).collect();
            row.resize(columns.len(), None);
            rows.push(row);
        }

        tracing::debug!(
            "Loaded {} rows x {} columns from {}",
            rows.len(),
            columns.len(),
            path.display()
        );

        Ok(Self {
            source: path.to_path_buf(),
            columns,
            rows,
            input: input.clone(),
        })
    }

    /// Builds a dataset from in-memory records.
    ///
    /// Rows shorter than `columns` are padded with absent cells; longer rows
    /// are truncated.
    pub fn from_rows(
        source: impl Into<PathBuf>,
        columns: Vec<String>,
        rows: Vec<Row>,
        input: InputConfig,
    ) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();
        Self {
            source: source.into(),
            columns,
            rows,
            input,
        }
    }

    /// Path the dataset was read from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Column names in header order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All data rows in file order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of data rows (header excluded).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Parsing rules the dataset was loaded with.
    pub fn input_config(&self) -> &InputConfig {
        &self.input
    }

    /// Trimmed value of a cell, or `None` when it is missing.
    pub fn value(&self, row: usize, column: usize) -> Option<&str> {
        let cell = self.rows.get(row)?.get(column)?.as_deref();
        if self.input.is_missing(cell) {
            None
        } else {
            cell.map(str::trim)
        }
    }

    /// Iterates `(row index, value)` for one column, `None` for missing cells.
    pub fn column_values(&self, column: usize) -> impl Iterator<Item = (usize, Option<&str>)> + '_ {
        (0..self.rows.len()).map(move |row| (row, self.value(row, column)))
    }

    /// Comparison key under the duplicate equality rule: cells compare after
    /// trimming and every missing form (absent, blank, sentinel) is equal.
    pub fn row_key(&self, row: usize) -> Vec<Option<&str>> {
        (0..self.columns.len())
            .map(|column| self.value(row, column))
            .collect()
    }

    /// Indices of rows that are the first occurrence of their key, in order.
    pub fn first_occurrences(&self) -> Vec<usize> {
        let mut seen: HashSet<Vec<Option<&str>>> = HashSet::with_capacity(self.rows.len());
        (0..self.rows.len())
            .filter(|&row| seen.insert(self.row_key(row)))
            .collect()
    }

    /// Number of rows that repeat an earlier row.
    pub fn duplicate_row_count(&self) -> usize {
        self.rows.len().saturating_sub(self.first_occurrences().len())
    }
}
