//! Report compilation, lineage and persistence.
//!
//! Compilation is pure aggregation of the upstream stage outputs plus a UTC
//! capture time. Persistence validates the report against the embedded
//! schema and writes it under a timestamped name that never replaces an
//! existing report.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::{GovernanceError, Result};
use crate::validation::{validate_and_parse_report, validate_report_output};

use super::models::{Anomaly, ComplianceIssue, GovernanceReport, LineageDescription, Profile};

/// Prefix of every persisted report file name.
pub const REPORT_FILE_PREFIX: &str = "governance_report_";

/// Collision suffixes tried before giving up.
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Assembles a report from stage outputs. No I/O.
pub fn compile(
    profile: Profile,
    anomalies: Vec<Anomaly>,
    compliance_issues: Vec<ComplianceIssue>,
    cleaned_path: PathBuf,
    lineage: LineageDescription,
) -> GovernanceReport {
    GovernanceReport {
        timestamp: Utc::now(),
        profile,
        anomalies,
        compliance_issues,
        cleaned_path,
        lineage,
    }
}

/// Describes the pipeline's lineage in generic terms.
///
/// Side-effect free; the same call always yields the same description.
pub fn describe_lineage() -> LineageDescription {
    LineageDescription {
        sources: vec!["input dataset".to_string()],
        transformations: [
            "profile: infer column types, missing counts and numeric statistics",
            "detect: compare against baseline for schema drift and distribution shift; count duplicate rows",
            "scan: match text columns against PII patterns",
            "repair: drop duplicate rows and align every record to the header",
            "report: compile findings into a governance report",
        ]
        .iter()
        .map(|s| (*s).to_string())
        .collect(),
        outputs: vec!["cleaned dataset".to_string(), "governance report".to_string()],
    }
}

impl LineageDescription {
    /// Replaces the generic sources with a concrete input path.
    pub fn with_source(mut self, source: &Path) -> Self {
        self.sources = vec![source.display().to_string()];
        self
    }

    /// Replaces the generic cleaned-dataset output with a concrete path.
    pub fn with_cleaned_output(mut self, cleaned: &Path) -> Self {
        let rendered = cleaned.display().to_string();
        match self.outputs.iter_mut().find(|o| *o == "cleaned dataset") {
            Some(output) => *output = rendered,
            None => self.outputs.insert(0, rendered),
        }
        self
    }

    /// Renders the lineage as byte-stable pretty JSON.
    pub fn render(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| GovernanceError::configuration(format!("cannot render lineage: {}", e)))
    }
}

/// File name for a report captured at the report's timestamp, with an
/// optional collision suffix.
pub fn report_file_name(report: &GovernanceReport, attempt: u32) -> String {
    let stamp = report.timestamp.format("%Y%m%dT%H%M%SZ");
    if attempt == 0 {
        format!("{}{}.json", REPORT_FILE_PREFIX, stamp)
    } else {
        format!("{}{}_{}.json", REPORT_FILE_PREFIX, stamp, attempt)
    }
}

/// Validates and writes `report` into `reports_dir`, creating the
/// directory if needed. Returns the path written.
///
/// # Errors
/// Returns `GovernanceError::ReportValidation` if the report does not match
/// the report schema, or `GovernanceError::Write` if the directory or file
/// cannot be created.
pub fn persist(report: &GovernanceReport, reports_dir: &Path) -> Result<PathBuf> {
    let value = serde_json::to_value(report)
        .map_err(|e| GovernanceError::ReportValidation(e.into()))?;
    validate_report_output(&value)?;
    let contents = serde_json::to_string_pretty(report)
        .map_err(|e| GovernanceError::ReportValidation(e.into()))?;

    fs::create_dir_all(reports_dir).map_err(|e| GovernanceError::write_failed(reports_dir, e))?;

    for attempt in 0..MAX_NAME_ATTEMPTS {
        let path = reports_dir.join(report_file_name(report, attempt));
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(GovernanceError::write_failed(&path, e)),
        };

        if let Err(e) = file.write_all(contents.as_bytes()).and_then(|()| file.sync_all()) {
            let _ = fs::remove_file(&path);
            return Err(GovernanceError::write_failed(&path, e));
        }

        tracing::info!("Governance report saved to {}", path.display());
        return Ok(path);
    }

    Err(GovernanceError::write_failed(
        reports_dir,
        std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!("no free report name after {} attempts", MAX_NAME_ATTEMPTS),
        ),
    ))
}

/// Loads and validates a persisted report.
///
/// # Errors
/// Returns `GovernanceError::DataAccess` if the file cannot be read, or
/// `GovernanceError::ReportValidation` if it is not a valid report.
pub fn load_report(path: &Path) -> Result<GovernanceReport> {
    let contents = fs::read_to_string(path).map_err(|e| GovernanceError::data_access(path, e))?;
    Ok(validate_and_parse_report(&contents)?)
}
