//! Pipeline driver.
//!
//! `GovernancePipeline` wires the five stages together over a
//! [`RunContext`]. Each `run_*` method reads its inputs from the context,
//! calls the stage function, and stores the output under its own field.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, info_span};

use crate::context::RunContext;
use crate::dataset::Dataset;
use crate::error::{GovernanceError, Result, Stage};
use crate::governance::config::GovernanceConfig;
use crate::governance::models::{Anomaly, ComplianceIssue, Profile};
use crate::governance::{compliance, drift, profiler, repair, report};

/// Runs the governance stages for one file at a time.
///
/// # Example
///
/// ```rust,no_run
/// use std::path::Path;
/// use hawksight_core::{GovernancePipeline, RunContext};
///
/// # fn example() -> hawksight_core::Result<()> {
/// let pipeline = GovernancePipeline::with_defaults();
/// let mut ctx = RunContext::new();
/// let report_path = pipeline.run(Path::new("customers.csv"), &mut ctx)?;
/// println!("report written to {}", report_path.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GovernancePipeline {
    config: GovernanceConfig,
}

impl GovernancePipeline {
    /// Creates a new pipeline with the given configuration.
    pub fn new(config: GovernanceConfig) -> Self {
        Self { config }
    }

    /// Creates a new pipeline with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(GovernanceConfig::default())
    }

    /// Returns a reference to the pipeline configuration.
    pub fn config(&self) -> &GovernanceConfig {
        &self.config
    }

    /// Runs profile, detect, scan, repair and report in order.
    ///
    /// Returns the path of the persisted report.
    ///
    /// # Errors
    /// Returns `GovernanceError::Configuration` if the configuration is
    /// invalid. Any stage failure stops the run and is returned as
    /// `GovernanceError::StageFailed` naming that stage; outputs of the
    /// stages that already completed remain in `ctx`.
    pub fn run(&self, path: &Path, ctx: &mut RunContext) -> Result<PathBuf> {
        self.config.validate()?;

        let span = info_span!("governance_run", run_id = %ctx.run_id, source = %path.display());
        let _guard = span.enter();
        let start = Instant::now();

        info!("Starting governance run");

        self.run_profiler(path, ctx)
            .map_err(|e| e.in_stage(Stage::Profile))?;
        self.run_detector(path, ctx)
            .map_err(|e| e.in_stage(Stage::Drift))?;
        self.run_scanner(path, ctx)
            .map_err(|e| e.in_stage(Stage::Compliance))?;
        self.run_repair(path, ctx)
            .map_err(|e| e.in_stage(Stage::Repair))?;
        let report_path = self
            .run_reporter(path, ctx)
            .map_err(|e| e.in_stage(Stage::Report))?;

        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Governance run complete"
        );
        Ok(report_path)
    }

    /// Profiles the file and stores the result in `ctx.profile`.
    pub fn run_profiler(&self, path: &Path, ctx: &mut RunContext) -> Result<()> {
        let start = Instant::now();
        let profile = profiler::profile(path, &self.config)?;
        debug!(
            rows = profile.row_count,
            columns = profile.columns.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Profiling complete"
        );
        ctx.profile = Some(profile);
        Ok(())
    }

    /// Detects drift against `ctx.baseline_profile` and stores the findings
    /// in `ctx.anomalies`. Reuses `ctx.profile` when present.
    pub fn run_detector(&self, path: &Path, ctx: &mut RunContext) -> Result<()> {
        let start = Instant::now();
        let anomalies = match &ctx.profile {
            Some(current) => {
                let dataset = Dataset::load(path, &self.config.input)?;
                drift::detect_with_profile(
                    &dataset,
                    current,
                    ctx.baseline_profile.as_ref(),
                    &self.config.drift,
                )?
            }
            None => drift::detect(path, ctx.baseline_profile.as_ref(), &self.config)?,
        };
        debug!(
            anomalies = anomalies.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Drift detection complete"
        );
        ctx.anomalies = Some(anomalies);
        Ok(())
    }

    /// Scans for unmasked PII and stores the issues in
    /// `ctx.compliance_issues`. Reuses `ctx.profile` when present.
    pub fn run_scanner(&self, path: &Path, ctx: &mut RunContext) -> Result<()> {
        let start = Instant::now();
        let issues = match &ctx.profile {
            Some(current) => {
                let dataset = Dataset::load(path, &self.config.input)?;
                compliance::scan_dataset(&dataset, current, &self.config.compliance)?
            }
            None => compliance::scan(path, &self.config)?,
        };
        debug!(
            issues = issues.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Compliance scan complete"
        );
        ctx.compliance_issues = Some(issues);
        Ok(())
    }

    /// Writes the cleaned file and stores its path in `ctx.cleaned_path`.
    pub fn run_repair(&self, path: &Path, ctx: &mut RunContext) -> Result<()> {
        let cleaned = repair::repair(path, &self.config)?;
        ctx.cleaned_path = Some(cleaned);
        Ok(())
    }

    /// Compiles and persists the report from the upstream outputs in `ctx`,
    /// storing the written path in `ctx.report_path`.
    ///
    /// # Errors
    /// Returns `GovernanceError::Configuration` naming the first missing
    /// upstream output.
    pub fn run_reporter(&self, path: &Path, ctx: &mut RunContext) -> Result<PathBuf> {
        let profile: Profile = required(ctx.profile.clone(), "profile")?;
        let anomalies: Vec<Anomaly> = required(ctx.anomalies.clone(), "anomalies")?;
        let issues: Vec<ComplianceIssue> =
            required(ctx.compliance_issues.clone(), "compliance_issues")?;
        let cleaned_path = required(ctx.cleaned_path.clone(), "cleaned_path")?;

        let lineage = report::describe_lineage()
            .with_source(path)
            .with_cleaned_output(&cleaned_path);
        let compiled = report::compile(profile, anomalies, issues, cleaned_path, lineage);
        let report_path = report::persist(&compiled, &self.config.reports_dir)?;

        ctx.report_path = Some(report_path.clone());
        Ok(report_path)
    }
}

fn required<T>(value: Option<T>, key: &str) -> Result<T> {
    value.ok_or_else(|| {
        GovernanceError::configuration(format!("run context is missing '{}'", key))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::governance::config::DriftConfig;
    use crate::governance::models::AnomalyKind;
    use std::fs;

    fn setup(contents: &str) -> (tempfile::TempDir, PathBuf, GovernancePipeline) {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("data.csv");
        fs::write(&input, contents).unwrap();
        let config = GovernanceConfig::default().with_reports_dir(dir.path().join("reports"));
        (dir, input, GovernancePipeline::new(config))
    }

    #[test]
    fn test_pipeline_run_fills_context() {
        let (_dir, input, pipeline) = setup("id,email\n1,a@b.io\n1,a@b.io\n2,x\n");
        let mut ctx = RunContext::new();

        let report_path = pipeline.run(&input, &mut ctx).unwrap();

        assert_eq!(ctx.profile.as_ref().unwrap().row_count, 3);
        assert_eq!(ctx.anomalies.as_ref().unwrap().len(), 1);
        assert_eq!(ctx.anomalies.as_ref().unwrap()[0].kind, AnomalyKind::DuplicateRows);
        assert_eq!(ctx.compliance_issues.as_ref().unwrap().len(), 2);
        assert!(ctx.cleaned_path.as_ref().unwrap().exists());
        assert_eq!(ctx.report_path.as_ref(), Some(&report_path));
        assert!(report_path.exists());
    }

    #[test]
    fn test_pipeline_missing_input_names_stage() {
        let (dir, _input, pipeline) = setup("a\n1\n");
        let mut ctx = RunContext::new();

        let err = pipeline
            .run(&dir.path().join("missing.csv"), &mut ctx)
            .unwrap_err();

        assert_eq!(err.stage(), Some(Stage::Profile));
        assert!(err.to_string().contains("profile"));
        assert!(ctx.profile.is_none());
    }

    #[test]
    fn test_pipeline_required_baseline_fails_drift_stage() {
        let (dir, input, _) = setup("a\n1\n");
        let config = GovernanceConfig::default()
            .with_reports_dir(dir.path().join("r"))
            .with_drift(DriftConfig::new().with_require_baseline(true));
        let pipeline = GovernancePipeline::new(config);
        let mut ctx = RunContext::new();

        let err = pipeline.run(&input, &mut ctx).unwrap_err();

        assert_eq!(err.stage(), Some(Stage::Drift));
        assert!(ctx.profile.is_some());
        assert!(ctx.anomalies.is_none());
    }

    #[test]
    fn test_reporter_requires_upstream_outputs() {
        let (_dir, input, pipeline) = setup("a\n1\n");
        let mut ctx = RunContext::new();
        pipeline.run_profiler(&input, &mut ctx).unwrap();

        let err = pipeline.run_reporter(&input, &mut ctx).unwrap_err();

        assert!(matches!(err, GovernanceError::Configuration { .. }));
        assert!(err.to_string().contains("anomalies"));
    }

    #[test]
    fn test_detector_without_profile() {
        let (_dir, input, pipeline) = setup("a\n1\n1\n");
        let mut ctx = RunContext::new();

        pipeline.run_detector(&input, &mut ctx).unwrap();

        assert_eq!(ctx.anomalies.unwrap().len(), 1);
        assert!(ctx.profile.is_none());
    }

    #[test]
    fn test_pipeline_extreme_values_produce_valid_report() {
        let (_dir, input, pipeline) = setup("x\n1e308\n1e308\n-1e308\n");
        let mut ctx = RunContext::new();

        let report_path = pipeline.run(&input, &mut ctx).unwrap();

        let loaded = report::load_report(&report_path).unwrap();
        let stats = loaded.profile.column("x").unwrap().numeric_stats.unwrap();
        assert!(stats.mean.is_finite());
        assert!(stats.std.is_finite());
    }

    #[test]
    fn test_invalid_config_rejected_before_stages() {
        let (_dir, input, _) = setup("a\n1\n");
        let pipeline = GovernancePipeline::new(GovernanceConfig::default().with_drift_threshold(-1.0));
        let mut ctx = RunContext::new();

        let err = pipeline.run(&input, &mut ctx).unwrap_err();

        assert!(matches!(err, GovernanceError::Configuration { .. }));
        assert!(ctx.profile.is_none());
    }
}
