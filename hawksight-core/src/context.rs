//! Run-scoped state shared by the pipeline stages.
//!
//! Each stage owns the fields it writes. A field left unset by an upstream
//! stage degrades downstream behavior (no baseline means no drift checks)
//! or fails the stage that needs it (the reporter).

use std::path::PathBuf;

use uuid::Uuid;

use crate::governance::models::{Anomaly, ComplianceIssue, Profile};

/// State for one pipeline run over one file.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Correlates log events of this run
    pub run_id: Uuid,
    /// Written by the profiler
    pub profile: Option<Profile>,
    /// Drift reference supplied by the caller
    pub baseline_profile: Option<Profile>,
    /// Written by the detector
    pub anomalies: Option<Vec<Anomaly>>,
    /// Written by the scanner
    pub compliance_issues: Option<Vec<ComplianceIssue>>,
    /// Written by the repair engine
    pub cleaned_path: Option<PathBuf>,
    /// Written by the reporter
    pub report_path: Option<PathBuf>,
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RunContext {
    /// Creates an empty context with a fresh run id.
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            profile: None,
            baseline_profile: None,
            anomalies: None,
            compliance_issues: None,
            cleaned_path: None,
            report_path: None,
        }
    }

    /// Builder method to supply a baseline profile.
    pub fn with_baseline(mut self, baseline: Profile) -> Self {
        self.baseline_profile = Some(baseline);
        self
    }
}
