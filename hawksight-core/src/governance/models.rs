//! Governance result models.
//!
//! This module defines the data structures produced by the stages. Profiles
//! and anomalies carry counts and statistics only; compliance issues carry a
//! masked preview, never the raw matched value.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inferred column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Integers and floats
    #[serde(alias = "int64", alias = "int32", alias = "float64", alias = "float32")]
    #[serde(alias = "int", alias = "float", alias = "integer", alias = "number")]
    Numeric,
    /// Free text or mixed values
    #[serde(alias = "object", alias = "string", alias = "str")]
    Text,
    /// true/false values
    #[serde(alias = "bool")]
    Boolean,
    /// Dates and timestamps
    #[serde(alias = "datetime64[ns]", alias = "date", alias = "timestamp")]
    Datetime,
    /// No non-missing values to infer from
    Unknown,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Numeric => write!(f, "numeric"),
            DataType::Text => write!(f, "text"),
            DataType::Boolean => write!(f, "boolean"),
            DataType::Datetime => write!(f, "datetime"),
            DataType::Unknown => write!(f, "unknown"),
        }
    }
}

/// Summary statistics of a numeric column over its non-missing values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
}

/// Profile of a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    /// Column name as declared in the header
    #[serde(skip)]
    pub name: String,
    /// Inferred type
    pub dtype: DataType,
    /// Count of absent, blank or sentinel cells
    #[serde(default)]
    pub missing_count: u64,
    /// Present only for numeric columns with at least one value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_stats: Option<NumericStats>,
}

impl ColumnProfile {
    /// Creates a column profile without statistics.
    pub fn new(name: impl Into<String>, dtype: DataType, missing_count: u64) -> Self {
        Self {
            name: name.into(),
            dtype,
            missing_count,
            numeric_stats: None,
        }
    }

    /// Sets the numeric statistics.
    pub fn with_numeric_stats(mut self, stats: NumericStats) -> Self {
        self.numeric_stats = Some(stats);
        self
    }
}

/// Structural and statistical profile of a dataset.
///
/// `columns` keeps header order and serializes as a JSON object keyed by
/// column name, in that same order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Number of data rows read
    pub row_count: u64,
    /// Per-column profiles in header order
    #[serde(with = "column_map")]
    pub columns: Vec<ColumnProfile>,
}

/// A profile captured by a prior run and used as the drift reference.
pub type BaselineProfile = Profile;

impl Profile {
    /// Creates a profile.
    pub fn new(row_count: u64, columns: Vec<ColumnProfile>) -> Self {
        Self { row_count, columns }
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column names in profile order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

/// Order-preserving map representation for profile columns.
mod column_map {
    use std::fmt;

    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};

    use super::ColumnProfile;

    pub(super) fn serialize<S>(columns: &[ColumnProfile], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(columns.len()))?;
        for column in columns {
            map.serialize_entry(&column.name, column)?;
        }
        map.end()
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Vec<ColumnProfile>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ColumnsVisitor;

        impl<'de> Visitor<'de> for ColumnsVisitor {
            type Value = Vec<ColumnProfile>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from column name to column profile")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut columns = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, mut column)) =
                    access.next_entry::<String, ColumnProfile>()?
                {
                    column.name = name;
                    columns.push(column);
                }
                Ok(columns)
            }
        }

        deserializer.deserialize_map(ColumnsVisitor)
    }
}

/// Severity of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Worth reviewing
    Warning,
    /// Breaks downstream consumers or exceeds twice the configured threshold
    Critical,
}

/// Category of a detected anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnomalyKind {
    /// Column removed, added or retyped relative to the baseline
    SchemaDrift,
    /// Mean or standard deviation moved beyond the threshold
    DistributionShift,
    /// Exact duplicate rows present
    DuplicateRows,
}

/// A discrete drift or anomaly finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    /// Affected columns; empty for row-level findings
    #[serde(default)]
    pub columns: Vec<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

impl Anomaly {
    /// Creates an anomaly without a severity.
    pub fn new(kind: AnomalyKind, columns: Vec<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            columns,
            description: description.into(),
            severity: None,
        }
    }

    /// Sets the severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }
}

/// An exposed PII value found in a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceIssue {
    /// Column containing the value
    pub column: String,
    /// Zero-based data row index (header excluded)
    pub row: u64,
    /// Pattern category that matched (e.g. "email")
    pub category: String,
    /// Preview with all but the leading character of each token masked
    pub masked_value: String,
    pub description: String,
}

/// Sources, transformations and outputs that produced a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageDescription {
    pub sources: Vec<String>,
    pub transformations: Vec<String>,
    pub outputs: Vec<String>,
}

/// The persisted governance record.
///
/// Exactly six fields; compilation adds nothing beyond the capture time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernanceReport {
    /// UTC instant the report was compiled
    pub timestamp: DateTime<Utc>,
    pub profile: Profile,
    pub anomalies: Vec<Anomaly>,
    pub compliance_issues: Vec<ComplianceIssue>,
    pub cleaned_path: PathBuf,
    pub lineage: LineageDescription,
}
