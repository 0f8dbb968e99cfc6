//! Grouped aggregation of coerced trial tables
//!
//! Rows are partitioned by the raw text of their key fields, in order of
//! first appearance. Each partition becomes one aggregate row. A second
//! pass can fold aggregate rows that share a coarser value (for example
//! many documents of the same length) into a mean-of-means row.

use crate::error::{ReportError, Result};
use crate::report::{ColumnKey, ReportTable, ReportValue};
use crate::stats::{self, Statistic};
use crate::table::NumericTable;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

/// Statistics requested for one numeric field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldStatistics {
    pub field: String,
    pub statistics: Vec<Statistic>,
}

/// What to compute for every group
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateSpec {
    /// Fields constant within a group, reported as the group minimum
    pub descriptions: Vec<String>,
    pub numeric: Vec<FieldStatistics>,
    /// Boolean fields, reported as the count of true values
    pub booleans: Vec<String>,
}

impl AggregateSpec {
    /// Output columns, in order
    pub fn columns(&self) -> Vec<ColumnKey> {
        let descriptions = self.descriptions.iter().map(ColumnKey::field);
        let numeric = self.numeric.iter().flat_map(|n| {
            n.statistics
                .iter()
                .map(move |&s| ColumnKey::stat(n.field.clone(), s))
        });
        let booleans = self
            .booleans
            .iter()
            .map(|b| ColumnKey::stat(b.clone(), Statistic::Sum));
        descriptions.chain(numeric).chain(booleans).collect()
    }
}

/// One aggregated group
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub key: Vec<String>,
    pub values: Vec<f64>,
}

/// A nonzero difference between two cross-validated sums of one group
#[derive(Debug, Clone, PartialEq)]
pub struct Divergence {
    pub group: Vec<String>,
    pub column: String,
    pub value: f64,
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "group [{}]: {} = {}",
            self.group.join(", "),
            self.column,
            self.value
        )
    }
}

/// One row per distinct group key
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateTable {
    key_names: Vec<String>,
    columns: Vec<ColumnKey>,
    rows: Vec<AggregateRow>,
}

impl AggregateTable {
    /// Partition `table` by `keys` (one entry per row) and aggregate each part
    pub fn group(
        table: &NumericTable,
        key_names: &[String],
        keys: &[Vec<String>],
        spec: &AggregateSpec,
    ) -> Result<Self> {
        debug_assert_eq!(keys.len(), table.len(), "one key per row");

        let mut index: HashMap<&[String], usize> = HashMap::new();
        let mut partitions: Vec<(&[String], Vec<usize>)> = Vec::new();
        for (row, key) in keys.iter().enumerate() {
            match index.get(key.as_slice()) {
                Some(&p) => partitions[p].1.push(row),
                None => {
                    index.insert(key.as_slice(), partitions.len());
                    partitions.push((key.as_slice(), vec![row]));
                }
            }
        }

        // Resolve every column once, with its statistic
        let mut sources: Vec<(&[f64], Statistic)> = Vec::new();
        for field in &spec.descriptions {
            sources.push((table.values(field)?, Statistic::Min));
        }
        for numeric in &spec.numeric {
            let values = table.values(&numeric.field)?;
            for &statistic in &numeric.statistics {
                sources.push((values, statistic));
            }
        }
        for field in &spec.booleans {
            sources.push((table.values(field)?, Statistic::Sum));
        }

        let rows: Vec<AggregateRow> = partitions
            .iter()
            .map(|(key, members)| {
                let values = sources
                    .iter()
                    .map(|(column, statistic)| {
                        let picked: Vec<f64> = members.iter().map(|&r| column[r]).collect();
                        statistic.apply(&picked)
                    })
                    .collect();
                AggregateRow {
                    key: key.to_vec(),
                    values,
                }
            })
            .collect();

        debug!(
            rows = table.len(),
            groups = rows.len(),
            "grouped trial rows"
        );

        Ok(Self {
            key_names: key_names.to_vec(),
            columns: spec.columns(),
            rows,
        })
    }

    pub fn key_names(&self) -> &[String] {
        &self.key_names
    }

    pub fn columns(&self) -> &[ColumnKey] {
        &self.columns
    }

    pub fn rows(&self) -> &[AggregateRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, key: &ColumnKey) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == key)
            .ok_or_else(|| ReportError::UnknownColumn(key.to_string()))
    }

    /// Values of one aggregate column
    pub fn column_values(&self, key: &ColumnKey) -> Result<Vec<f64>> {
        let index = self.column_index(key)?;
        Ok(self.rows.iter().map(|row| row.values[index]).collect())
    }

    /// Append `|left - right|` as a new column named `name`
    ///
    /// Every nonzero row is returned as a divergence and logged.
    pub fn with_difference(
        &self,
        left: &ColumnKey,
        right: &ColumnKey,
        name: &str,
    ) -> Result<(Self, Vec<Divergence>)> {
        let diff = difference(&self.column_values(left)?, &self.column_values(right)?);

        let mut divergences = Vec::new();
        let mut rows = self.rows.clone();
        for (row, value) in rows.iter_mut().zip(diff) {
            if value != 0.0 {
                warn!(group = ?row.key, column = name, value, "outputs differ");
                divergences.push(Divergence {
                    group: row.key.clone(),
                    column: name.to_string(),
                    value,
                });
            }
            row.values.push(value);
        }

        let mut columns = self.columns.clone();
        columns.push(ColumnKey::named(name));

        Ok((
            Self {
                key_names: self.key_names.clone(),
                columns,
                rows,
            },
            divergences,
        ))
    }

    /// Fold rows sharing a value of `secondary` into their column means
    ///
    /// Rows are sorted ascending by `secondary` first. The output starts
    /// with `secondary`, keeps the other value columns in order and ends
    /// with `Count`, the number of rows folded together. Key text columns
    /// are dropped.
    pub fn regroup_and_average(&self, secondary: &ColumnKey) -> Result<ReportTable> {
        let pivot = self.column_index(secondary)?;

        let mut order: Vec<usize> = (0..self.rows.len()).collect();
        order.sort_by(|&a, &b| self.rows[a].values[pivot].total_cmp(&self.rows[b].values[pivot]));

        let mut columns = vec![secondary.clone()];
        columns.extend(
            self.columns
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != pivot)
                .map(|(_, c)| c.clone()),
        );
        columns.push(ColumnKey::Count);

        let mut report = ReportTable::new(columns);
        for run in order.chunk_by(|&a, &b| {
            self.rows[a].values[pivot].total_cmp(&self.rows[b].values[pivot]).is_eq()
        }) {
            let mean_of = |column: usize| {
                let values: Vec<f64> = run.iter().map(|&r| self.rows[r].values[column]).collect();
                stats::mean(&values)
            };

            let mut row = vec![ReportValue::Float(self.rows[run[0]].values[pivot])];
            row.extend(
                (0..self.columns.len())
                    .filter(|&i| i != pivot)
                    .map(|i| ReportValue::Float(mean_of(i))),
            );
            row.push(ReportValue::Integer(run.len() as i64));
            report.push_row(row);
        }

        debug!(
            groups = self.rows.len(),
            rows = report.rows().len(),
            secondary = %secondary,
            "regrouped aggregate rows"
        );

        Ok(report)
    }

    /// Convert to a report table: key text columns first, then the values
    pub fn into_report(self) -> ReportTable {
        let mut columns: Vec<ColumnKey> = self.key_names.iter().map(ColumnKey::field).collect();
        columns.extend(self.columns);

        let mut report = ReportTable::new(columns);
        for row in self.rows {
            let mut cells: Vec<ReportValue> = row.key.into_iter().map(ReportValue::Text).collect();
            cells.extend(row.values.into_iter().map(ReportValue::Float));
            report.push_row(cells);
        }
        report
    }
}

/// Elementwise `|a - b|`
pub fn difference(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TrialTable;

    const VALIDATION: &str = "\
Document ID,Length document,Depth document,Automaton time (ms),Automaton output,Validator output
doc1,5,2,10,true,true
doc1,5,2,20,true,true
doc2,5,3,40,true,false
doc3,8,1,7,false,false
";

    fn spec() -> AggregateSpec {
        AggregateSpec {
            descriptions: vec!["Length document".into(), "Depth document".into()],
            numeric: vec![FieldStatistics {
                field: "Automaton time (ms)".into(),
                statistics: Statistic::NUMERIC.to_vec(),
            }],
            booleans: vec!["Automaton output".into(), "Validator output".into()],
        }
    }

    fn aggregate() -> AggregateTable {
        let trials = TrialTable::from_reader(VALIDATION.as_bytes(), "test.csv").unwrap();
        let numbers = trials
            .coerce(
                &["Length document", "Depth document", "Automaton time (ms)"],
                &["Automaton output", "Validator output"],
            )
            .unwrap();
        let key_names = vec!["Document ID".to_string()];
        let keys = trials.key_values(&key_names).unwrap();
        AggregateTable::group(&numbers, &key_names, &keys, &spec()).unwrap()
    }

    #[test]
    fn test_one_row_per_group_in_first_seen_order() {
        let table = aggregate();
        assert_eq!(table.len(), 3);
        let keys: Vec<_> = table.rows().iter().map(|r| r.key[0].as_str()).collect();
        assert_eq!(keys, vec!["doc1", "doc2", "doc3"]);
    }

    #[test]
    fn test_statistics_per_group() {
        let table = aggregate();
        let mean = table
            .column_values(&ColumnKey::stat("Automaton time (ms)", Statistic::Mean))
            .unwrap();
        assert_eq!(mean, vec![15.0, 40.0, 7.0]);
        let max = table
            .column_values(&ColumnKey::stat("Automaton time (ms)", Statistic::Max))
            .unwrap();
        assert_eq!(max, vec![20.0, 40.0, 7.0]);
        let sums = table
            .column_values(&ColumnKey::stat("Automaton output", Statistic::Sum))
            .unwrap();
        assert_eq!(sums, vec![2.0, 1.0, 0.0]);
    }

    #[test]
    fn test_descriptions_use_minimum() {
        let table = aggregate();
        let depth = table
            .column_values(&ColumnKey::field("Depth document"))
            .unwrap();
        assert_eq!(depth, vec![2.0, 3.0, 1.0]);
    }

    #[test]
    fn test_empty_input_yields_no_rows() {
        let trials = TrialTable::from_reader(
            "Document ID,Length document\n".as_bytes(),
            "empty.csv",
        )
        .unwrap();
        let numbers = trials.coerce(&["Length document"], &[]).unwrap();
        let key_names = vec!["Document ID".to_string()];
        let spec = AggregateSpec {
            descriptions: vec!["Length document".into()],
            ..Default::default()
        };
        let table = AggregateTable::group(&numbers, &key_names, &[], &spec).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_unknown_field_is_an_error() {
        let trials = TrialTable::from_reader(VALIDATION.as_bytes(), "test.csv").unwrap();
        let numbers = trials.coerce(&["Length document"], &[]).unwrap();
        let key_names = vec!["Document ID".to_string()];
        let keys = trials.key_values(&key_names).unwrap();
        let result = AggregateTable::group(&numbers, &key_names, &keys, &spec());
        assert!(matches!(result, Err(ReportError::UnknownColumn(_))));
    }

    #[test]
    fn test_difference_flags_divergent_groups() {
        let (table, divergences) = aggregate()
            .with_difference(
                &ColumnKey::stat("Automaton output", Statistic::Sum),
                &ColumnKey::stat("Validator output", Statistic::Sum),
                "DifferenceOutputs",
            )
            .unwrap();

        let diff = table
            .column_values(&ColumnKey::named("DifferenceOutputs"))
            .unwrap();
        assert_eq!(diff, vec![0.0, 1.0, 0.0]);
        assert_eq!(divergences.len(), 1);
        assert_eq!(divergences[0].group, vec!["doc2"]);
        assert_eq!(divergences[0].value, 1.0);
    }

    #[test]
    fn test_difference_is_symmetric() {
        let a = [3.0, 1.0, 4.0];
        let b = [1.0, 1.0, 9.0];
        assert_eq!(difference(&a, &b), difference(&b, &a));
        assert_eq!(difference(&a, &a), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_regroup_counts_groups_per_length() {
        let report = aggregate()
            .regroup_and_average(&ColumnKey::field("Length document"))
            .unwrap();

        assert_eq!(report.columns()[0], ColumnKey::field("Length document"));
        assert_eq!(report.columns().last(), Some(&ColumnKey::Count));
        assert_eq!(report.rows().len(), 2);

        let lengths = report
            .column_values(&ColumnKey::field("Length document"))
            .unwrap();
        assert_eq!(
            lengths,
            vec![&ReportValue::Float(5.0), &ReportValue::Float(8.0)]
        );

        let counts = report.column_values(&ColumnKey::Count).unwrap();
        assert_eq!(
            counts,
            vec![&ReportValue::Integer(2), &ReportValue::Integer(1)]
        );

        // Mean of the per-document means: (15 + 40) / 2
        let mean = report
            .column_values(&ColumnKey::stat("Automaton time (ms)", Statistic::Mean))
            .unwrap();
        assert_eq!(mean[0], &ReportValue::Float(27.5));
    }

    #[test]
    fn test_regroup_unknown_column() {
        let result = aggregate().regroup_and_average(&ColumnKey::field("Width"));
        assert!(matches!(result, Err(ReportError::UnknownColumn(_))));
    }

    #[test]
    fn test_into_report_keeps_keys_as_text() {
        let report = aggregate().into_report();
        assert_eq!(report.columns()[0], ColumnKey::field("Document ID"));
        assert_eq!(report.rows()[0][0], ReportValue::Text("doc1".into()));
        assert_eq!(report.rows().len(), 3);
    }
}
