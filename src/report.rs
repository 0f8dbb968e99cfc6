//! Report tables and column renaming
//!
//! A `ReportTable` is the final shape of a report before rendering. Columns
//! are identified by a `ColumnKey` until a `RenameMap` gives them their
//! report-friendly labels.

use crate::aggregate::Divergence;
use crate::stats::Statistic;
use serde::Serialize;
use std::fmt;

/// Identity of a report column
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnKey {
    /// A field of the input, reported as-is (group keys, descriptions)
    Field(String),
    /// A statistic computed over a field
    Stat { field: String, statistic: Statistic },
    /// A column with a final report label
    Named(String),
    /// Number of groups folded into a row
    Count,
}

impl ColumnKey {
    pub fn field(name: impl Into<String>) -> Self {
        ColumnKey::Field(name.into())
    }

    pub fn stat(field: impl Into<String>, statistic: Statistic) -> Self {
        ColumnKey::Stat {
            field: field.into(),
            statistic,
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        ColumnKey::Named(name.into())
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKey::Field(name) | ColumnKey::Named(name) => f.write_str(name),
            ColumnKey::Stat { field, statistic } => write!(f, "{} {}", field, statistic),
            ColumnKey::Count => f.write_str("Count"),
        }
    }
}

/// One cell of a report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReportValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

/// Final table handed to a renderer
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    columns: Vec<ColumnKey>,
    rows: Vec<Vec<ReportValue>>,
}

impl ReportTable {
    pub fn new(columns: Vec<ColumnKey>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a single-row table from `(column, value)` pairs
    pub fn single_row(cells: Vec<(ColumnKey, ReportValue)>) -> Self {
        let (columns, row): (Vec<_>, Vec<_>) = cells.into_iter().unzip();
        Self {
            columns,
            rows: vec![row],
        }
    }

    pub fn push_row(&mut self, row: Vec<ReportValue>) {
        debug_assert_eq!(row.len(), self.columns.len(), "row width mismatch");
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[ColumnKey] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<ReportValue>] {
        &self.rows
    }

    /// Column labels as they will be rendered
    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.to_string()).collect()
    }

    pub fn column_index(&self, key: &ColumnKey) -> Option<usize> {
        self.columns.iter().position(|c| c == key)
    }

    /// Values of one column
    pub fn column_values(&self, key: &ColumnKey) -> Option<Vec<&ReportValue>> {
        let index = self.column_index(key)?;
        Some(self.rows.iter().map(|row| &row[index]).collect())
    }

    /// Relabel columns; columns without a mapping keep their label
    pub fn rename(&self, map: &RenameMap) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|key| match map.get(key) {
                Some(label) => ColumnKey::Named(label.to_string()),
                None => key.clone(),
            })
            .collect();

        Self {
            columns,
            rows: self.rows.clone(),
        }
    }
}

/// Explicit list of `(source column, report label)` pairs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenameMap {
    entries: Vec<(ColumnKey, String)>,
}

impl RenameMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, source: ColumnKey, label: impl Into<String>) -> Self {
        self.entries.push((source, label.into()));
        self
    }

    pub fn get(&self, source: &ColumnKey) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == source)
            .map(|(_, label)| label.as_str())
    }

    pub fn entries(&self) -> &[(ColumnKey, String)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(ColumnKey, String)> for RenameMap {
    fn from_iter<I: IntoIterator<Item = (ColumnKey, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// A rendered-ready table plus the divergences found while building it
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub table: ReportTable,
    pub divergences: Vec<Divergence>,
}

impl Report {
    pub fn new(table: ReportTable) -> Self {
        Self {
            table,
            divergences: Vec::new(),
        }
    }
}
