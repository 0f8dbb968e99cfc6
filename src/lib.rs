//! benchreport - summary tables for VPDA learning and JSON validation benchmarks
//!
//! This library turns the CSV files written by the benchmark harnesses into
//! publication-ready tables: it drops or substitutes failed trials, coerces
//! cells to numbers, aggregates them per group and renders the result as
//! LaTeX, aligned text, CSV or JSON.

pub mod aggregate;
pub mod cell;
pub mod cli;
pub mod definition;
pub mod error;
pub mod render;
pub mod report;
pub mod stats;
pub mod table;
pub mod variants;
