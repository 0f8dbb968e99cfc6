//! Cell values of a trial table
//!
//! The benchmark runner writes the literal strings `Timeout` and `Error` in
//! place of a measurement when a trial did not finish. Those markers are
//! classified once, at load time, so the rest of the pipeline matches on
//! variants instead of comparing strings.

use crate::error::{ReportError, Result};
use std::fmt;

/// Marker written by the runner when a trial hit the time limit
pub const TIMEOUT_MARKER: &str = "Timeout";

/// Marker written by the runner when a trial failed (usually out of memory)
pub const ERROR_MARKER: &str = "Error";

/// One cell of a trial table
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Raw value as read from the input, not yet coerced
    Text(String),
    /// Numeric value, either coerced or substituted
    Number(f64),
    /// The trial ran out of time
    TimedOut,
    /// The trial failed
    Errored,
}

impl Cell {
    /// Classify a raw input value
    pub fn parse(raw: &str) -> Self {
        match raw {
            TIMEOUT_MARKER => Cell::TimedOut,
            ERROR_MARKER => Cell::Errored,
            other => Cell::Text(other.to_string()),
        }
    }

    /// Whether this cell marks an abnormally terminated trial
    pub fn is_sentinel(&self) -> bool {
        matches!(self, Cell::TimedOut | Cell::Errored)
    }

    /// Coerce to a floating point number
    ///
    /// `row` and `field` are only used to build the error.
    pub fn to_number(&self, field: &str, row: usize) -> Result<f64> {
        match self {
            Cell::Number(value) => Ok(*value),
            Cell::Text(raw) => raw.trim().parse::<f64>().map_err(|_| ReportError::Parse {
                field: field.to_string(),
                row,
                value: raw.clone(),
                expected: "number",
            }),
            sentinel => Err(ReportError::Parse {
                field: field.to_string(),
                row,
                value: sentinel.to_string(),
                expected: "number",
            }),
        }
    }

    /// Coerce to a boolean (`true`/`false` in any case, or `1`/`0`)
    pub fn to_bool(&self, field: &str, row: usize) -> Result<bool> {
        let parsed = match self {
            Cell::Text(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            },
            Cell::Number(value) if *value == 1.0 => Some(true),
            Cell::Number(value) if *value == 0.0 => Some(false),
            _ => None,
        };

        parsed.ok_or_else(|| ReportError::Parse {
            field: field.to_string(),
            row,
            value: self.to_string(),
            expected: "boolean",
        })
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(raw) => write!(f, "{}", raw),
            Cell::Number(value) => write!(f, "{}", value),
            Cell::TimedOut => write!(f, "{}", TIMEOUT_MARKER),
            Cell::Errored => write!(f, "{}", ERROR_MARKER),
        }
    }
}
