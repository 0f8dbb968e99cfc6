//! One-row summary of a key-graph preprocessing run

use crate::error::Result;
use crate::report::{ColumnKey, Report, ReportTable, ReportValue};
use crate::stats::{self, Statistic};
use crate::table::{NumericTable, TrialTable};
use tracing::{debug, info, warn};

pub const RELATION_TIME: &str = "Relation time";
pub const RELATION_MEMORY: &str = "Relation memory";
pub const GRAPH_TIME: &str = "Graph time";
pub const GRAPH_MEMORY: &str = "Graph memory";
pub const SIZE_GRAPH: &str = "Size graph";
pub const SUCCESS: &str = "Success";

pub const MEASUREMENTS: [&str; 10] = [
    RELATION_TIME,
    RELATION_MEMORY,
    GRAPH_TIME,
    GRAPH_MEMORY,
    "Automaton time",
    "Automaton memory",
    "Size comma",
    "Size internal",
    "Size well-matched",
    SIZE_GRAPH,
];

pub fn build(input: &TrialTable) -> Result<Report> {
    let mut required = MEASUREMENTS.to_vec();
    required.push(SUCCESS);
    input.require(&required)?;

    let measurements = input
        .select(&MEASUREMENTS)?
        .filter_failed(RELATION_TIME)?
        .coerce(&MEASUREMENTS, &[])?;
    debug!(
        trials = measurements.len(),
        means = ?measurement_means(&measurements),
        "preprocessing measurements"
    );

    let outcomes = input
        .select(&[SUCCESS])?
        .filter_failed(SUCCESS)?
        .coerce::<&str>(&[], &[SUCCESS])?;
    let succeeded = Statistic::Sum.apply(outcomes.values(SUCCESS)?);
    info!(succeeded, trials = outcomes.len(), "key graphs built");
    if succeeded < measurements.len() as f64 {
        warn!(
            succeeded,
            measured = measurements.len(),
            input = input.origin(),
            "some key graphs are incorrect"
        );
    }

    let mean = |field: &str| -> Result<f64> { Ok(stats::mean(measurements.values(field)?)) };

    let table = ReportTable::single_row(vec![
        (
            ColumnKey::named("Time (s)"),
            ReportValue::Float(mean(RELATION_TIME)? + mean(GRAPH_TIME)?),
        ),
        (
            ColumnKey::named("Memory (kB)"),
            ReportValue::Float(mean(RELATION_MEMORY)? + mean(GRAPH_MEMORY)?),
        ),
        (
            ColumnKey::named(r"$|\keyGraph|$"),
            ReportValue::Float(mean(SIZE_GRAPH)?),
        ),
    ]);
    Ok(Report::new(table))
}

/// Means of every measurement of the surviving trials
pub fn measurement_means(measurements: &NumericTable) -> Vec<(String, f64)> {
    measurements
        .columns()
        .iter()
        .map(|column| (column.name.clone(), stats::mean(&column.values)))
        .collect()
}
