//! Report rendering: LaTeX, aligned text, CSV and JSON
//!
//! Rendering is deterministic: the same table always produces the same
//! bytes.

use crate::error::Result;
use crate::report::{ReportTable, ReportValue};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Output format of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// LaTeX tabular fragment, without an index column
    Latex,
    /// Whitespace-aligned plain text
    Text,
    /// CSV for spreadsheet analysis
    Csv,
    /// JSON for machine parsing
    Json,
}

impl OutputFormat {
    /// File extension used for this format
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Latex => "tex",
            OutputFormat::Text => "dat",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

/// `<output_dir>/<subdirectory>/<name>.<ext>`
pub fn destination(output_dir: &Path, subdirectory: &str, name: &str, format: OutputFormat) -> PathBuf {
    output_dir
        .join(subdirectory)
        .join(format!("{}.{}", name, format.extension()))
}

/// Render a table to a string
pub fn render(table: &ReportTable, format: OutputFormat, precision: usize) -> Result<String> {
    match format {
        OutputFormat::Latex => Ok(to_latex(table, precision)),
        OutputFormat::Text => Ok(to_text(table, precision)),
        OutputFormat::Csv => to_csv(table, precision),
        OutputFormat::Json => to_json(table),
    }
}

/// Render a table and write it, creating missing directories
pub fn write_report(
    table: &ReportTable,
    path: &Path,
    format: OutputFormat,
    precision: usize,
) -> Result<()> {
    let content = render(table, format, precision)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    info!(path = %path.display(), "report written");
    Ok(())
}

fn format_value(value: &ReportValue, precision: usize, nan: &str) -> String {
    match value {
        ReportValue::Integer(i) => i.to_string(),
        ReportValue::Float(f) if f.is_nan() => nan.to_string(),
        ReportValue::Float(f) => format!("{:.*}", precision, f),
        ReportValue::Text(s) => s.clone(),
    }
}

fn is_text_column(table: &ReportTable, column: usize) -> bool {
    table
        .rows()
        .iter()
        .any(|row| matches!(row[column], ReportValue::Text(_)))
}

/// LaTeX `tabular` environment
///
/// Column labels are written verbatim so that math in them survives.
pub fn to_latex(table: &ReportTable, precision: usize) -> String {
    let alignment: String = (0..table.columns().len())
        .map(|i| if is_text_column(table, i) { 'l' } else { 'r' })
        .collect();

    let mut output = String::new();
    output.push_str(&format!("\\begin{{tabular}}{{{}}}\n", alignment));
    output.push_str(&table.headers().join(" & "));
    output.push_str(" \\\\\n");

    for row in table.rows() {
        let cells: Vec<String> = row
            .iter()
            .map(|v| format_value(v, precision, "nan"))
            .collect();
        output.push_str(&cells.join(" & "));
        output.push_str(" \\\\\n");
    }

    output.push_str("\\end{tabular}\n");
    output
}

/// Right-aligned text table, columns separated by two spaces
pub fn to_text(table: &ReportTable, precision: usize) -> String {
    let headers = table.headers();
    let cells: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|row| row.iter().map(|v| format_value(v, precision, "NaN")).collect())
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |fields: &[String]| -> String {
        fields
            .iter()
            .zip(&widths)
            .map(|(field, &width)| format!("{:>width$}", field, width = width))
            .collect::<Vec<_>>()
            .join("  ")
    };

    let mut output = line(&headers);
    output.push('\n');
    for row in &cells {
        output.push_str(&line(row));
        output.push('\n');
    }
    output
}

pub fn to_csv(table: &ReportTable, precision: usize) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.headers())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|v| format_value(v, precision, "NaN")))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    columns: Vec<String>,
    rows: &'a [Vec<ReportValue>],
}

/// JSON object with `columns` and `rows`; NaN becomes `null`
pub fn to_json(table: &ReportTable) -> Result<String> {
    let report = JsonReport {
        columns: table.headers(),
        rows: table.rows(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}
