//! Trial tables: loading, filtering and type coercion
//!
//! A `TrialTable` is the raw result file, column by column. Every transform
//! returns a new table; the loaded table is never mutated.

use crate::cell::Cell;
use crate::error::{ReportError, Result};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// A named column of raw cells
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

/// Number of abnormally terminated trials in a field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SentinelCounts {
    pub timeouts: usize,
    pub errors: usize,
}

/// Benchmark trial rows as read from a result file
#[derive(Debug, Clone, PartialEq)]
pub struct TrialTable {
    /// Where the rows came from (used in error messages)
    origin: String,
    columns: Vec<Column>,
    /// 1-based data row of each row in the original input
    row_numbers: Vec<usize>,
}

impl TrialTable {
    /// Load a comma-separated result file with a header row
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = csv::Reader::from_path(path)?;
        Self::from_csv(reader, &path.display().to_string())
    }

    /// Load comma-separated data from any reader
    pub fn from_reader<R: Read>(reader: R, origin: &str) -> Result<Self> {
        Self::from_csv(csv::Reader::from_reader(reader), origin)
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>, origin: &str) -> Result<Self> {
        let headers = reader.headers()?.clone();
        let mut columns: Vec<Column> = headers
            .iter()
            .map(|name| Column {
                name: name.to_string(),
                cells: Vec::new(),
            })
            .collect();

        let mut row_numbers = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record?;
            for (column, raw) in columns.iter_mut().zip(record.iter()) {
                column.cells.push(Cell::parse(raw));
            }
            row_numbers.push(index + 1);
        }

        debug!(origin, rows = row_numbers.len(), "loaded trial table");

        Ok(Self {
            origin: origin.to_string(),
            columns,
            row_numbers,
        })
    }

    /// Name of the input this table was loaded from
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.row_numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_numbers.is_empty()
    }

    /// Header field names in input order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ReportError::MissingField {
                field: name.to_string(),
                input: self.origin.clone(),
            })
    }

    /// Check that every field a later stage references is present
    pub fn require<S: AsRef<str>>(&self, fields: &[S]) -> Result<()> {
        for field in fields {
            self.column(field.as_ref())?;
        }
        Ok(())
    }

    /// Keep only the given columns, in the given order
    pub fn select<S: AsRef<str>>(&self, fields: &[S]) -> Result<Self> {
        let columns = fields
            .iter()
            .map(|field| self.column(field.as_ref()).cloned())
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            origin: self.origin.clone(),
            columns,
            row_numbers: self.row_numbers.clone(),
        })
    }

    /// Drop every row whose status field holds `Timeout` or `Error`
    pub fn filter_failed(&self, status_field: &str) -> Result<Self> {
        let filtered = self.retain_rows(status_field, |cell| !cell.is_sentinel())?;
        debug!(
            status_field,
            before = self.len(),
            after = filtered.len(),
            "filtered failed trials"
        );
        Ok(filtered)
    }

    /// Drop every row whose field holds `Error`, keeping timeouts
    pub fn filter_errored(&self, field: &str) -> Result<Self> {
        self.retain_rows(field, |cell| !matches!(cell, Cell::Errored))
    }

    fn retain_rows<F>(&self, field: &str, keep: F) -> Result<Self>
    where
        F: Fn(&Cell) -> bool,
    {
        let mask: Vec<bool> = self.column(field)?.cells.iter().map(keep).collect();

        let columns = self
            .columns
            .iter()
            .map(|column| Column {
                name: column.name.clone(),
                cells: column
                    .cells
                    .iter()
                    .zip(&mask)
                    .filter(|&(_, &kept)| kept)
                    .map(|(cell, _)| cell.clone())
                    .collect(),
            })
            .collect();

        let row_numbers = self
            .row_numbers
            .iter()
            .zip(&mask)
            .filter(|&(_, &kept)| kept)
            .map(|(&row, _)| row)
            .collect();

        Ok(Self {
            origin: self.origin.clone(),
            columns,
            row_numbers,
        })
    }

    /// Count the `Timeout` and `Error` markers of a field
    pub fn count_sentinels(&self, field: &str) -> Result<SentinelCounts> {
        let mut counts = SentinelCounts::default();
        for cell in &self.column(field)?.cells {
            match cell {
                Cell::TimedOut => counts.timeouts += 1,
                Cell::Errored => counts.errors += 1,
                _ => {}
            }
        }
        Ok(counts)
    }

    /// Replace every `Timeout` of a field with a fixed number
    ///
    /// The value must be in the raw unit of the field.
    pub fn substitute_timeout(&self, field: &str, value: f64) -> Result<Self> {
        self.map_column(field, |cell| match cell {
            Cell::TimedOut => Cell::Number(value),
            other => other.clone(),
        })
    }

    fn map_column<F>(&self, field: &str, f: F) -> Result<Self>
    where
        F: Fn(&Cell) -> Cell,
    {
        self.column(field)?;
        let columns = self
            .columns
            .iter()
            .map(|column| {
                if column.name == field {
                    Column {
                        name: column.name.clone(),
                        cells: column.cells.iter().map(&f).collect(),
                    }
                } else {
                    column.clone()
                }
            })
            .collect();

        Ok(Self {
            origin: self.origin.clone(),
            columns,
            row_numbers: self.row_numbers.clone(),
        })
    }

    /// Add `other[field]` into `self[into]`, matching rows on `key`
    ///
    /// When `other` lists a key more than once, its first row is used.
    pub fn merge_column(&self, other: &TrialTable, key: &str, field: &str, into: &str) -> Result<Self> {
        let other_keys = other.column(key)?;
        let other_values = other.column(field)?;

        let mut lookup: HashMap<String, f64> = HashMap::new();
        for (i, (k, v)) in other_keys.cells.iter().zip(&other_values.cells).enumerate() {
            let value = v.to_number(field, other.row_numbers[i])?;
            lookup.entry(k.to_string()).or_insert(value);
        }

        let keys = &self.column(key)?.cells;
        let targets = &self.column(into)?.cells;
        let mut merged = Vec::with_capacity(targets.len());
        for (i, (k, target)) in keys.iter().zip(targets).enumerate() {
            let base = target.to_number(into, self.row_numbers[i])?;
            let extra = lookup
                .get(&k.to_string())
                .ok_or_else(|| ReportError::MissingKey {
                    field: key.to_string(),
                    key: k.to_string(),
                })?;
            merged.push(Cell::Number(base + extra));
        }

        let columns = self
            .columns
            .iter()
            .map(|column| {
                if column.name == into {
                    Column {
                        name: column.name.clone(),
                        cells: merged.clone(),
                    }
                } else {
                    column.clone()
                }
            })
            .collect();

        debug!(key, field, into, rows = self.len(), "merged column");

        Ok(Self {
            origin: self.origin.clone(),
            columns,
            row_numbers: self.row_numbers.clone(),
        })
    }

    /// Raw text of the key fields, one entry per row
    pub fn key_values<S: AsRef<str>>(&self, fields: &[S]) -> Result<Vec<Vec<String>>> {
        let columns = fields
            .iter()
            .map(|f| self.column(f.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        Ok((0..self.len())
            .map(|row| columns.iter().map(|c| c.cells[row].to_string()).collect())
            .collect())
    }

    /// Coerce the named fields to numbers and booleans
    pub fn coerce<S: AsRef<str>>(&self, numeric: &[S], boolean: &[S]) -> Result<NumericTable> {
        let mut columns = Vec::with_capacity(numeric.len() + boolean.len());

        for field in numeric {
            let field = field.as_ref();
            let values = self
                .column(field)?
                .cells
                .iter()
                .zip(&self.row_numbers)
                .map(|(cell, &row)| cell.to_number(field, row))
                .collect::<Result<Vec<_>>>()?;
            columns.push(NumericColumn {
                name: field.to_string(),
                kind: ColumnKind::Number,
                values,
            });
        }

        for field in boolean {
            let field = field.as_ref();
            let values = self
                .column(field)?
                .cells
                .iter()
                .zip(&self.row_numbers)
                .map(|(cell, &row)| cell.to_bool(field, row).map(|b| if b { 1.0 } else { 0.0 }))
                .collect::<Result<Vec<_>>>()?;
            columns.push(NumericColumn {
                name: field.to_string(),
                kind: ColumnKind::Boolean,
                values,
            });
        }

        Ok(NumericTable {
            len: self.len(),
            columns,
        })
    }
}

/// Type a numeric column was coerced from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Number,
    /// Stored as 1.0 / 0.0 so that a sum counts the true values
    Boolean,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumericColumn {
    pub name: String,
    pub kind: ColumnKind,
    pub values: Vec<f64>,
}

/// Coerced trial table
#[derive(Debug, Clone, PartialEq)]
pub struct NumericTable {
    len: usize,
    columns: Vec<NumericColumn>,
}

impl NumericTable {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn columns(&self) -> &[NumericColumn] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Result<&NumericColumn> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ReportError::UnknownColumn(name.to_string()))
    }

    pub fn values(&self, name: &str) -> Result<&[f64]> {
        Ok(&self.column(name)?.values)
    }

    /// Multiply every value of a field by a constant factor
    pub fn unit_convert(&self, field: &str, factor: f64) -> Result<Self> {
        self.column(field)?;
        let columns = self
            .columns
            .iter()
            .map(|column| {
                if column.name == field {
                    NumericColumn {
                        name: column.name.clone(),
                        kind: column.kind,
                        values: column.values.iter().map(|v| v * factor).collect(),
                    }
                } else {
                    column.clone()
                }
            })
            .collect();

        Ok(Self {
            len: self.len,
            columns,
        })
    }
}
