//! Report variants
//!
//! `learning` and `preprocessing` produce fixed one-row summaries;
//! `grouped` builds any report described by a `ReportDefinition`,
//! including the validation presets.

pub mod grouped;
pub mod learning;
pub mod preprocessing;
