//! Grouped reports driven by a `ReportDefinition`

use crate::aggregate::AggregateTable;
use crate::definition::ReportDefinition;
use crate::error::Result;
use crate::report::{ColumnKey, Report};
use crate::stats::Statistic;
use crate::table::TrialTable;
use tracing::debug;

/// Build a grouped report
///
/// `merge_input` is the optional second file of the definition's `[merge]`
/// section; it is ignored when the definition has none.
pub fn build(
    definition: &ReportDefinition,
    input: &TrialTable,
    merge_input: Option<&TrialTable>,
) -> Result<Report> {
    input.require(&definition.required_fields())?;

    let mut trials = match &definition.status_field {
        Some(status) => input.filter_failed(status)?,
        None => input.clone(),
    };

    if let (Some(merge), Some(other)) = (&definition.merge, merge_input) {
        other.require(&[&merge.key, &merge.field])?;
        trials = trials.merge_column(other, &merge.key, &merge.field, &merge.into)?;
    }

    let booleans: Vec<&str> = definition.booleans.iter().map(String::as_str).collect();
    let mut numbers = trials.coerce(&definition.numeric_fields(), &booleans)?;
    for conversion in &definition.conversion {
        numbers = numbers.unit_convert(&conversion.field, conversion.factor)?;
    }

    let keys = trials.key_values(&definition.group_by)?;
    let mut aggregate = AggregateTable::group(
        &numbers,
        &definition.group_by,
        &keys,
        &definition.aggregate_spec(),
    )?;

    let mut divergences = Vec::new();
    for difference in &definition.difference {
        let (with_difference, found) = aggregate.with_difference(
            &ColumnKey::stat(difference.left.clone(), Statistic::Sum),
            &ColumnKey::stat(difference.right.clone(), Statistic::Sum),
            &difference.name,
        )?;
        aggregate = with_difference;
        divergences.extend(found);
    }

    let table = match &definition.regroup_by {
        Some(secondary) => aggregate.regroup_and_average(&ColumnKey::field(secondary.clone()))?,
        None => aggregate.into_report(),
    };

    debug!(
        report = %definition.name,
        rows = table.rows().len(),
        divergences = divergences.len(),
        "grouped report built"
    );

    Ok(Report {
        table: table.rename(&definition.rename_map()),
        divergences,
    })
}
