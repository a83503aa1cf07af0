//! Configuration loading for the CLI.
//!
//! A JSON file supplies the base configuration; command-line flags override
//! individual settings on top of it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use hawksight_core::{DriftConfig, GovernanceConfig};
use tracing::{debug, warn};

/// Settings that can be overridden from the command line.
#[derive(Args, Debug, Clone, Default)]
pub struct OverrideArgs {
    /// Field delimiter of the input files
    #[arg(long, help = "Field delimiter (default ',')")]
    pub delimiter: Option<char>,

    /// Type-inference threshold
    #[arg(
        long,
        help = "Share of values that must parse as a type for the column to take it (0.0-1.0]"
    )]
    pub type_threshold: Option<f64>,

    /// Drift threshold
    #[arg(
        long,
        help = "Relative change in mean or std that counts as distribution shift"
    )]
    pub drift_threshold: Option<f64>,

    /// Fail drift detection when no baseline is available
    #[arg(long, help = "Treat a missing baseline as an error")]
    pub require_baseline: bool,

    /// Directory for persisted reports
    #[arg(long, help = "Directory receiving governance reports")]
    pub reports_dir: Option<PathBuf>,

    /// Directory for cleaned files
    #[arg(long, help = "Directory for cleaned files (default: next to the input)")]
    pub output_dir: Option<PathBuf>,
}

/// Reads the configuration file, or returns defaults when none is given.
pub async fn load_config(path: Option<&Path>) -> Result<GovernanceConfig> {
    let Some(path) = path else {
        debug!("No configuration file given, using defaults");
        return Ok(GovernanceConfig::default());
    };

    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
    let config: GovernanceConfig = serde_json::from_str(&contents)
        .with_context(|| format!("Invalid configuration file {}", path.display()))?;

    debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Applies command-line overrides and validates the result.
pub fn apply_overrides(mut config: GovernanceConfig, overrides: &OverrideArgs) -> Result<GovernanceConfig> {
    if let Some(delimiter) = overrides.delimiter {
        config = config.with_delimiter(delimiter);
    }
    if let Some(threshold) = overrides.type_threshold {
        config = config.with_type_threshold(threshold);
    }
    if let Some(threshold) = overrides.drift_threshold {
        if threshold <= 0.0 {
            warn!("Drift threshold {} must be positive", threshold);
        }
        config = config.with_drift_threshold(threshold);
    }
    if overrides.require_baseline {
        let drift = DriftConfig::new()
            .with_relative_change_threshold(config.drift.relative_change_threshold)
            .with_require_baseline(true);
        config = config.with_drift(drift);
    }
    if let Some(dir) = &overrides.reports_dir {
        config = config.with_reports_dir(dir);
    }
    if let Some(dir) = &overrides.output_dir {
        config = config.with_repair_output_dir(dir);
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}
