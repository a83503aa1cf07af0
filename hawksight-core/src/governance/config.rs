//! Governance pipeline configuration.
//!
//! This module provides the thresholds and conventions used by the stages:
//! input parsing rules, type-inference and drift thresholds, the PII pattern
//! set with its masking convention, and repair output naming.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default share of non-missing values that must parse as a stricter type.
pub const DEFAULT_TYPE_THRESHOLD: f64 = 0.95;

/// Default relative change in mean or std that counts as distribution shift.
pub const DEFAULT_DRIFT_THRESHOLD: f64 = 0.20;

/// Delimited-file parsing rules shared by every stage that reads the source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Field delimiter (single ASCII character)
    pub delimiter: char,
    /// Cell contents treated as missing in addition to empty cells
    pub null_sentinels: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            null_sentinels: ["NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "None", "<NA>", "#N/A"]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

impl InputConfig {
    /// Returns the delimiter as the byte the csv reader and writer expect.
    pub fn delimiter_byte(&self) -> Result<u8, ConfigValidationError> {
        let c = self.delimiter;
        if !c.is_ascii() || matches!(c, '"' | '\n' | '\r') {
            return Err(ConfigValidationError::InvalidDelimiter(c));
        }
        Ok(c as u8)
    }

    /// Returns true when a cell is absent, blank or a null sentinel.
    pub fn is_missing(&self, cell: Option<&str>) -> bool {
        match cell {
            None => true,
            Some(raw) => {
                let trimmed = raw.trim();
                trimmed.is_empty() || self.null_sentinels.iter().any(|s| s == trimmed)
            }
        }
    }
}

/// Profiler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Minimum share (0.0-1.0] of non-missing values that must parse as
    /// boolean, numeric or datetime for the column to take that type
    pub type_threshold: f64,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            type_threshold: DEFAULT_TYPE_THRESHOLD,
        }
    }
}

/// Drift and anomaly detection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    /// Relative change in mean or std above which a column has shifted
    pub relative_change_threshold: f64,
    /// Fail instead of degrading to duplicate-only detection when no
    /// baseline profile is supplied
    pub require_baseline: bool,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            relative_change_threshold: DEFAULT_DRIFT_THRESHOLD,
            require_baseline: false,
        }
    }
}

impl DriftConfig {
    /// Creates a new drift config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the relative change threshold.
    pub fn with_relative_change_threshold(mut self, threshold: f64) -> Self {
        self.relative_change_threshold = threshold;
        self
    }

    /// Builder method to require a baseline profile.
    pub fn with_require_baseline(mut self, required: bool) -> Self {
        self.require_baseline = required;
        self
    }
}

/// A value pattern that identifies one PII category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PiiPattern {
    /// Category reported on matching cells (e.g. "email")
    pub category: String,
    /// Regex matched against each cell
    pub pattern: String,
}

impl PiiPattern {
    /// Creates a new PII pattern.
    pub fn new(category: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            pattern: pattern.into(),
        }
    }
}

/// PII screening configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceConfig {
    /// Patterns tested in order; the first match names the issue category
    pub patterns: Vec<PiiPattern>,
    /// A cell containing any of these tokens is already masked
    pub mask_tokens: Vec<String>,
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            patterns: vec![
                PiiPattern::new("email", r"(?i)\b[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}\b"),
                PiiPattern::new("ssn", r"\b\d{3}-\d{2}-\d{4}\b"),
            ],
            mask_tokens: vec!["***".to_string(), "[REDACTED]".to_string()],
        }
    }
}

impl ComplianceConfig {
    /// Builder method to add a pattern after the defaults.
    pub fn add_pattern(mut self, pattern: PiiPattern) -> Self {
        self.patterns.push(pattern);
        self
    }

    /// Builder method to replace the masking tokens.
    pub fn with_mask_tokens(mut self, tokens: Vec<String>) -> Self {
        self.mask_tokens = tokens;
        self
    }
}

/// Repair engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairConfig {
    /// Written into cells a short record did not supply
    pub fill_value: String,
    /// Appended to the input file stem to name the cleaned file
    pub suffix: String,
    /// Directory for cleaned files; next to the input when unset
    pub output_dir: Option<PathBuf>,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            fill_value: String::new(),
            suffix: "_cleaned".to_string(),
            output_dir: None,
        }
    }
}

/// Complete pipeline configuration.
///
/// Every section falls back to its defaults when omitted, so a JSON
/// configuration file only needs the settings it changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceConfig {
    /// Source parsing rules
    pub input: InputConfig,
    /// Profiler settings
    pub profiling: ProfileConfig,
    /// Drift detector settings
    pub drift: DriftConfig,
    /// PII scanner settings
    pub compliance: ComplianceConfig,
    /// Repair engine settings
    pub repair: RepairConfig,
    /// Directory receiving persisted governance reports
    pub reports_dir: PathBuf,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            input: InputConfig::default(),
            profiling: ProfileConfig::default(),
            drift: DriftConfig::default(),
            compliance: ComplianceConfig::default(),
            repair: RepairConfig::default(),
            reports_dir: PathBuf::from("reports"),
        }
    }
}

/// Validation errors for governance configuration.
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("type_threshold must be in (0.0, 1.0], got {0}")]
    InvalidTypeThreshold(f64),
    #[error("relative_change_threshold must be a positive finite number, got {0}")]
    InvalidDriftThreshold(f64),
    #[error("delimiter must be a single ASCII character other than quote or newline, got {0:?}")]
    InvalidDelimiter(char),
    #[error("PII pattern '{category}' does not compile: {message}")]
    InvalidPattern { category: String, message: String },
    #[error("repair suffix must not be empty")]
    EmptySuffix,
}

impl GovernanceConfig {
    /// Creates a new governance config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the type-inference threshold.
    pub fn with_type_threshold(mut self, threshold: f64) -> Self {
        if !(0.0..=1.0).contains(&threshold) {
            tracing::warn!(
                "type_threshold {} clamped to valid range [0.0, 1.0]",
                threshold
            );
        }
        self.profiling.type_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Builder method to set the drift threshold.
    pub fn with_drift_threshold(mut self, threshold: f64) -> Self {
        self.drift.relative_change_threshold = threshold;
        self
    }

    /// Builder method to replace the drift settings.
    pub fn with_drift(mut self, drift: DriftConfig) -> Self {
        self.drift = drift;
        self
    }

    /// Builder method to replace the compliance settings.
    pub fn with_compliance(mut self, compliance: ComplianceConfig) -> Self {
        self.compliance = compliance;
        self
    }

    /// Builder method to set the field delimiter.
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.input.delimiter = delimiter;
        self
    }

    /// Builder method to set the reports directory.
    pub fn with_reports_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.reports_dir = dir.into();
        self
    }

    /// Builder method to set the cleaned-file directory.
    pub fn with_repair_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.repair.output_dir = Some(dir.into());
        self
    }

    /// Validates the configuration.
    ///
    /// Returns an error if any threshold is out of range, the delimiter
    /// cannot be used, a PII pattern fails to compile, or the repair
    /// suffix would let the cleaned file overwrite its source.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let t = self.profiling.type_threshold;
        if !(t > 0.0 && t <= 1.0) {
            return Err(ConfigValidationError::InvalidTypeThreshold(t));
        }
        let d = self.drift.relative_change_threshold;
        if !(d.is_finite() && d > 0.0) {
            return Err(ConfigValidationError::InvalidDriftThreshold(d));
        }
        self.input.delimiter_byte()?;
        for pattern in &self.compliance.patterns {
            regex::Regex::new(&pattern.pattern).map_err(|e| {
                ConfigValidationError::InvalidPattern {
                    category: pattern.category.clone(),
                    message: e.to_string(),
                }
            })?;
        }
        if self.repair.suffix.is_empty() {
            return Err(ConfigValidationError::EmptySuffix);
        }
        Ok(())
    }
}

impl From<ConfigValidationError> for crate::error::GovernanceError {
    fn from(error: ConfigValidationError) -> Self {
        crate::error::GovernanceError::configuration(error.to_string())
    }
}
