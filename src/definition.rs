//! TOML report definitions for grouped reports
//!
//! A definition says which fields to group on, which statistics to compute
//! and how to label the resulting columns. The validation reports ship as
//! embedded presets; `custom` reports load a definition from a file.
//!
//! # Example
//!
//! ```toml
//! name = "queries"
//! subdirectory = "learning"
//! format = "text"
//! status_field = "Total time (ms)"
//! group_by = ["Schema"]
//! descriptions = ["alphabet size"]
//!
//! [[numeric]]
//! field = "Membership queries"
//! statistics = ["mean", "max"]
//!
//! [[rename]]
//! field = "Membership queries"
//! statistic = "mean"
//! to = "MembershipMean"
//! ```

use crate::aggregate::{AggregateSpec, FieldStatistics};
use crate::render::OutputFormat;
use crate::report::{ColumnKey, RenameMap};
use crate::stats::Statistic;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const VALIDATION_TOML: &str = include_str!("../reports/validation.toml");
const VALIDATION_EXTENDED_TOML: &str = include_str!("../reports/validation-extended.toml");

/// Names of the embedded presets
pub const PRESETS: [&str; 2] = ["validation", "validation-extended"];

fn default_subdirectory() -> String {
    "figures".to_string()
}

fn default_format() -> OutputFormat {
    OutputFormat::Text
}

fn default_statistics() -> Vec<Statistic> {
    Statistic::NUMERIC.to_vec()
}

/// Numeric field and the statistics to compute over it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericField {
    pub field: String,
    #[serde(default = "default_statistics")]
    pub statistics: Vec<Statistic>,
}

/// Multiply a field by a constant after coercion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    pub field: String,
    pub factor: f64,
}

/// `|sum(left) - sum(right)|` over two boolean fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Difference {
    pub left: String,
    pub right: String,
    pub name: String,
}

/// Add a field of a second input into a field of the main input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Merge {
    pub key: String,
    pub field: String,
    pub into: String,
}

/// One `(source column, label)` pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rename {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistic: Option<Statistic>,
    pub to: String,
}

/// A grouped report, as written in TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDefinition {
    pub name: String,

    /// Directory under the output root the report is written to
    #[serde(default = "default_subdirectory")]
    pub subdirectory: String,

    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Rows whose status field holds `Timeout` or `Error` are dropped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_field: Option<String>,

    pub group_by: Vec<String>,

    /// Fold groups sharing this description into one averaged row
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regroup_by: Option<String>,

    /// Fields constant within a group, reported as the group minimum
    #[serde(default)]
    pub descriptions: Vec<String>,

    #[serde(default)]
    pub numeric: Vec<NumericField>,

    #[serde(default)]
    pub booleans: Vec<String>,

    #[serde(default)]
    pub conversion: Vec<Conversion>,

    #[serde(default)]
    pub difference: Vec<Difference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge: Option<Merge>,

    #[serde(default)]
    pub rename: Vec<Rename>,
}

impl ReportDefinition {
    /// Load and validate a definition from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read report definition {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid report definition {}", path.display()))
    }

    /// Parse and validate a definition
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let definition: Self = toml::from_str(content).context("Failed to parse TOML")?;
        definition.validate()?;
        Ok(definition)
    }

    /// Load one of the embedded presets
    pub fn preset(name: &str) -> Result<Self> {
        let content = match name {
            "validation" => VALIDATION_TOML,
            "validation-extended" => VALIDATION_EXTENDED_TOML,
            other => bail!(
                "Unknown preset '{}' (available: {})",
                other,
                PRESETS.join(", ")
            ),
        };
        Self::from_toml_str(content).with_context(|| format!("Failed to load preset '{}'", name))
    }

    /// Check internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.group_by.is_empty() {
            bail!("group_by must name at least one field");
        }

        if let Some(regroup) = &self.regroup_by {
            if !self.descriptions.contains(regroup) {
                bail!(
                    "regroup_by field '{}' must be listed in descriptions",
                    regroup
                );
            }
        }

        for numeric in &self.numeric {
            if numeric.statistics.is_empty() {
                bail!("numeric field '{}' has no statistics", numeric.field);
            }
            if numeric.statistics.contains(&Statistic::Sum) {
                bail!(
                    "numeric field '{}': sum is reserved for boolean fields",
                    numeric.field
                );
            }
        }

        let numeric_fields = self.numeric_fields();
        for conversion in &self.conversion {
            if !numeric_fields.contains(&conversion.field.as_str()) {
                bail!(
                    "conversion field '{}' is not a numeric field or description",
                    conversion.field
                );
            }
        }

        for difference in &self.difference {
            for side in [&difference.left, &difference.right] {
                if !self.booleans.contains(side) {
                    bail!(
                        "difference '{}' references '{}', which is not a boolean field",
                        difference.name,
                        side
                    );
                }
            }
        }

        if let Some(merge) = &self.merge {
            if !numeric_fields.contains(&merge.into.as_str()) {
                bail!(
                    "merge target '{}' is not a numeric field or description",
                    merge.into
                );
            }
        }

        for rename in &self.rename {
            let key = self.resolve(rename);
            if !self.output_columns().contains(&key) {
                bail!("rename to '{}' references unknown column {}", rename.to, key);
            }
        }

        Ok(())
    }

    /// Numeric and description fields, without duplicates, in order
    pub fn numeric_fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = Vec::new();
        let candidates = self
            .descriptions
            .iter()
            .chain(self.numeric.iter().map(|n| &n.field));
        for field in candidates {
            if !fields.contains(&field.as_str()) {
                fields.push(field);
            }
        }
        fields
    }

    /// Every input field the report reads
    pub fn required_fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = self.group_by.iter().map(String::as_str).collect();
        fields.extend(self.numeric_fields());
        fields.extend(self.booleans.iter().map(String::as_str));
        fields.extend(self.status_field.as_deref());
        if let Some(merge) = &self.merge {
            fields.push(&merge.key);
        }

        let mut unique: Vec<&str> = Vec::with_capacity(fields.len());
        for field in fields {
            if !unique.contains(&field) {
                unique.push(field);
            }
        }
        unique
    }

    pub fn aggregate_spec(&self) -> AggregateSpec {
        AggregateSpec {
            descriptions: self.descriptions.clone(),
            numeric: self
                .numeric
                .iter()
                .map(|n| FieldStatistics {
                    field: n.field.clone(),
                    statistics: n.statistics.clone(),
                })
                .collect(),
            booleans: self.booleans.clone(),
        }
    }

    /// Columns of the report before renaming
    fn output_columns(&self) -> Vec<ColumnKey> {
        let mut columns: Vec<ColumnKey> = self.group_by.iter().map(ColumnKey::field).collect();
        columns.extend(self.aggregate_spec().columns());
        columns.extend(self.difference.iter().map(|d| ColumnKey::named(d.name.clone())));
        if self.regroup_by.is_some() {
            columns.push(ColumnKey::Count);
        }
        columns
    }

    fn resolve(&self, rename: &Rename) -> ColumnKey {
        match rename.statistic {
            Some(statistic) => ColumnKey::stat(rename.field.clone(), statistic),
            None if rename.field == "Count" => ColumnKey::Count,
            None if self.difference.iter().any(|d| d.name == rename.field) => {
                ColumnKey::named(rename.field.clone())
            }
            None => ColumnKey::field(rename.field.clone()),
        }
    }

    /// The declared `(source column, label)` pairs
    pub fn rename_map(&self) -> RenameMap {
        self.rename
            .iter()
            .map(|r| (self.resolve(r), r.to.clone()))
            .collect()
    }
}
