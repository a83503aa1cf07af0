//! Core data-governance stages for HawkSight.
//!
//! This crate profiles a tabular file, detects drift against a baseline,
//! screens text columns for exposed PII, writes a deduplicated copy, and
//! persists a governance report describing all of it. The stages are plain
//! functions over a file path; [`GovernancePipeline`] chains them over a
//! [`RunContext`].
//!
//! # Privacy Guarantees
//! - Source files are read-only; repair always writes a new file
//! - Raw PII values never leave the scanner; reports carry masked previews
//! - No network access
//!
//! # Architecture
//! - `dataset`: delimited-file loading and the missing-value rule
//! - `governance`: the five stages and their models and configuration
//! - `pipeline` / `context`: stage orchestration over run-scoped state
//! - `validation`: JSON Schema check of persisted reports

pub mod baseline;
pub mod context;
pub mod dataset;
pub mod error;
pub mod governance;
pub mod logging;
pub mod pipeline;
pub mod validation;

// Re-export commonly used types
pub use baseline::{BaselineStore, JsonBaselineStore};
pub use context::RunContext;
pub use dataset::Dataset;
pub use error::{GovernanceError, Result, Stage};
pub use governance::{
    Anomaly, AnomalyKind, BaselineProfile, ColumnProfile, ComplianceConfig, ComplianceIssue,
    ConfigValidationError, DataType, DriftConfig, GovernanceConfig, GovernanceReport,
    InputConfig, LineageDescription, NumericStats, PiiPattern, Profile, ProfileConfig,
    RepairConfig, Severity,
};
pub use logging::init_logging;
pub use pipeline::GovernancePipeline;
pub use validation::{
    ValidationError, initialize_report_validator, validate_and_parse_report,
    validate_report_output,
};
