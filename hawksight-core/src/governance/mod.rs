//! Data-governance stages.
//!
//! This module provides the five stages that run over a tabular file:
//! - **Profiling**: column types, missing counts, numeric statistics
//! - **Drift detection**: schema drift and distribution shift against a
//!   baseline, plus duplicate rows
//! - **Compliance**: unmasked PII in text columns
//! - **Repair**: deduplication and schema alignment into a new file
//! - **Reporting**: compile, validate and persist the governance report
//!
//! # Privacy Guarantees
//! - Profiles and anomalies expose counts and statistics only
//! - Compliance issues carry a masked preview, never the matched value
//! - The source file is never modified
//!
//! # Example
//! ```rust,no_run
//! use std::path::Path;
//! use hawksight_core::governance::{GovernanceConfig, profiler};
//!
//! # fn example() -> hawksight_core::Result<()> {
//! let config = GovernanceConfig::default();
//! let profile = profiler::profile(Path::new("customers.csv"), &config)?;
//! println!("{} rows", profile.row_count);
//! # Ok(())
//! # }
//! ```

pub mod compliance;
pub mod config;
pub mod drift;
pub mod models;
pub mod profiler;
pub mod repair;
pub mod report;

// Re-export public API
pub use config::{
    ComplianceConfig, ConfigValidationError, DriftConfig, GovernanceConfig, InputConfig,
    PiiPattern, ProfileConfig, RepairConfig,
};
pub use models::{
    Anomaly, AnomalyKind, BaselineProfile, ColumnProfile, ComplianceIssue, DataType,
    GovernanceReport, LineageDescription, NumericStats, Profile, Severity,
};
