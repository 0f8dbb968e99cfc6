//! One-row summary of a VPDA learning benchmark run
//!
//! Timed-out trials still count: their total time is taken at the time
//! limit. Failed (out of memory) trials are left out of every average.

use crate::error::Result;
use crate::report::{ColumnKey, RenameMap, Report, ReportTable, ReportValue};
use crate::stats::{self, Statistic};
use crate::table::TrialTable;
use tracing::info;

pub const TOTAL_TIME: &str = "Total time (ms)";
pub const MEMBERSHIP_QUERIES: &str = "Membership queries";
pub const BIN_STATE: &str = "Bin state";

/// Averaged measurements; the first one decides whether a row failed
pub const MEASUREMENTS: [&str; 9] = [
    MEMBERSHIP_QUERIES,
    "Equivalence queries",
    "Rounds",
    "alphabet size",
    "VPDA size",
    "Internal transitions",
    "Return transitions",
    "Call transitions",
    "Diameter",
];

/// Report labels of the averaged fields, in report order
pub const LABELS: [(&str, &str); 9] = [
    (TOTAL_TIME, "Time (s)"),
    (MEMBERSHIP_QUERIES, "Membership"),
    ("Equivalence queries", "Equivalence"),
    ("VPDA size", r"$|\automaton|$"),
    ("alphabet size", r"$|\Sigma|$"),
    ("Internal transitions", r"$|\delta_i|$"),
    ("Return transitions", r"$|\delta_{r}|$"),
    ("Call transitions", r"$|\delta_{c}|$"),
    ("Diameter", "Diameter"),
];

/// Label of the out-of-memory column
pub const MEMORY_OUT_LABEL: &str = "MO (16GB)";

pub fn timeout_label(time_limit_secs: u64) -> String {
    format!("TO ({}s)", time_limit_secs)
}

pub fn rename_map() -> RenameMap {
    LABELS
        .iter()
        .map(|&(field, label)| (ColumnKey::stat(field, Statistic::Mean), label.to_string()))
        .collect()
}

/// Build the learning summary
///
/// `time_limit_secs` is the limit the benchmarks ran with. Total times are
/// stored in milliseconds, so a timed-out trial counts as
/// `time_limit_secs * 1000` before the conversion to seconds.
pub fn build(input: &TrialTable, time_limit_secs: u64) -> Result<Report> {
    let mut required = vec![TOTAL_TIME, BIN_STATE];
    required.extend(MEASUREMENTS);
    input.require(&required)?;

    let sentinels = input.count_sentinels(TOTAL_TIME)?;

    let measurements = input
        .select(&MEASUREMENTS)?
        .filter_failed(MEMBERSHIP_QUERIES)?
        .coerce(&MEASUREMENTS, &[])?;

    let bin_states = input
        .select(&[BIN_STATE])?
        .filter_failed(BIN_STATE)?
        .coerce::<&str>(&[], &[BIN_STATE])?;
    let with_bin_state = Statistic::Sum.apply(bin_states.values(BIN_STATE)?);
    info!(
        with_bin_state,
        trials = bin_states.len(),
        "hypotheses with a bin state"
    );

    let limit_ms = time_limit_secs as f64 * 1000.0;
    let times = input
        .select(&[TOTAL_TIME])?
        .substitute_timeout(TOTAL_TIME, limit_ms)?
        .filter_errored(TOTAL_TIME)?
        .coerce(&[TOTAL_TIME], &[])?
        .unit_convert(TOTAL_TIME, 1.0 / 1000.0)?;

    let mut cells = vec![
        (
            ColumnKey::named(timeout_label(time_limit_secs)),
            ReportValue::Integer(sentinels.timeouts as i64),
        ),
        (
            ColumnKey::named(MEMORY_OUT_LABEL),
            ReportValue::Integer(sentinels.errors as i64),
        ),
    ];

    for (field, _) in LABELS {
        let values = if field == TOTAL_TIME {
            times.values(field)?
        } else {
            measurements.values(field)?
        };
        cells.push((
            ColumnKey::stat(field, Statistic::Mean),
            ReportValue::Float(stats::mean(values)),
        ));
    }

    let table = ReportTable::single_row(cells).rename(&rename_map());
    Ok(Report::new(table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReportError;

    const HEADER: &str = "Total time (ms),Membership queries,Equivalence queries,Rounds,Bin state,alphabet size,VPDA size,Internal transitions,Return transitions,Call transitions,Diameter";

    fn results(rows: &[&str]) -> TrialTable {
        let csv = format!("{}\n{}\n", HEADER, rows.join("\n"));
        TrialTable::from_reader(csv.as_bytes(), "learning.csv").unwrap()
    }

    fn cell(report: &Report, label: &str) -> ReportValue {
        let index = report
            .table
            .headers()
            .iter()
            .position(|h| h == label)
            .unwrap_or_else(|| panic!("no column {label}"));
        report.table.rows()[0][index].clone()
    }

    #[test]
    fn test_summary_columns() {
        let report = build(&results(&["1000,10,2,3,true,5,4,6,7,8,3"]), 60).unwrap();
        assert_eq!(
            report.table.headers(),
            vec![
                "TO (60s)",
                "MO (16GB)",
                "Time (s)",
                "Membership",
                "Equivalence",
                r"$|\automaton|$",
                r"$|\Sigma|$",
                r"$|\delta_i|$",
                r"$|\delta_{r}|$",
                r"$|\delta_{c}|$",
                "Diameter",
            ]
        );
        assert_eq!(report.table.rows().len(), 1);
    }

    #[test]
    fn test_timeouts_count_at_the_limit() {
        let report = build(
            &results(&[
                "2000,10,2,3,true,5,4,6,7,8,3",
                "Timeout,30,4,5,false,5,6,6,7,8,3",
                "Error,Error,Error,Error,Error,Error,Error,Error,Error,Error,Error",
            ]),
            10,
        )
        .unwrap();

        assert_eq!(cell(&report, "TO (10s)"), ReportValue::Integer(1));
        assert_eq!(cell(&report, "MO (16GB)"), ReportValue::Integer(1));
        // (2 s + 10 s) / 2; the failed trial is excluded
        assert_eq!(cell(&report, "Time (s)"), ReportValue::Float(6.0));
        // Timed-out trials keep their query counts
        assert_eq!(cell(&report, "Membership"), ReportValue::Float(20.0));
        assert_eq!(cell(&report, r"$|\automaton|$"), ReportValue::Float(5.0));
    }

    #[test]
    fn test_all_failed_gives_nan_means() {
        let report = build(
            &results(&["Error,Error,Error,Error,Error,Error,Error,Error,Error,Error,Error"]),
            10,
        )
        .unwrap();
        assert_eq!(cell(&report, "MO (16GB)"), ReportValue::Integer(1));
        assert!(matches!(cell(&report, "Time (s)"), ReportValue::Float(f) if f.is_nan()));
    }

    #[test]
    fn test_missing_column() {
        let table = TrialTable::from_reader("Total time (ms)\n10\n".as_bytes(), "short.csv").unwrap();
        let err = build(&table, 10).unwrap_err();
        assert!(matches!(err, ReportError::MissingField { .. }));
    }

    #[test]
    fn test_malformed_measurement() {
        let err = build(&results(&["1000,ten,2,3,true,5,4,6,7,8,3"]), 60).unwrap_err();
        assert!(matches!(err, ReportError::Parse { row: 1, .. }));
    }
}
