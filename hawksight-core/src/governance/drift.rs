//! Drift and anomaly detection against a baseline profile.
//!
//! Findings are emitted in a fixed order: schema drift (removed, added,
//! retyped columns), then distribution shifts, then one duplicate-rows
//! summary. Without a baseline only duplicate detection runs.

use std::path::Path;

use crate::dataset::Dataset;
use crate::error::GovernanceError;
use crate::Result;

use super::config::{DriftConfig, GovernanceConfig};
use super::models::{Anomaly, AnomalyKind, DataType, Profile, Severity};
use super::profiler::profile_dataset;

/// Detects drift and anomalies in the dataset at `path`.
///
/// # Errors
/// Returns `GovernanceError::DataAccess` if the file cannot be read, or
/// `GovernanceError::Configuration` if the configuration requires a
/// baseline and none is given.
pub fn detect(
    path: &Path,
    baseline: Option<&Profile>,
    config: &GovernanceConfig,
) -> Result<Vec<Anomaly>> {
    let dataset = Dataset::load(path, &config.input)?;
    let current = profile_dataset(&dataset, &config.profiling);
    detect_with_profile(&dataset, &current, baseline, &config.drift)
}

/// Detects drift and anomalies reusing an already computed profile.
pub fn detect_with_profile(
    dataset: &Dataset,
    current: &Profile,
    baseline: Option<&Profile>,
    config: &DriftConfig,
) -> Result<Vec<Anomaly>> {
    let mut anomalies = Vec::new();

    match baseline {
        Some(baseline) => {
            anomalies.extend(detect_schema_drift(baseline, current));
            anomalies.extend(detect_distribution_shift(
                baseline,
                current,
                config.relative_change_threshold,
            ));
        }
        None if config.require_baseline => {
            return Err(GovernanceError::configuration(
                "drift detection requires a baseline profile but none was supplied",
            ));
        }
        None => {
            tracing::info!(
                "No baseline profile for {}; running duplicate detection only",
                dataset.source().display()
            );
        }
    }

    if let Some(duplicates) = detect_duplicates(dataset) {
        anomalies.push(duplicates);
    }

    tracing::debug!(
        "Detected {} anomalies in {}",
        anomalies.len(),
        dataset.source().display()
    );

    Ok(anomalies)
}

/// Compares column sets and types between baseline and current profiles.
pub fn detect_schema_drift(baseline: &Profile, current: &Profile) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();

    for column in &baseline.columns {
        if current.column(&column.name).is_none() {
            anomalies.push(
                Anomaly::new(
                    AnomalyKind::SchemaDrift,
                    vec![column.name.clone()],
                    format!("column removed: '{}'", column.name),
                )
                .with_severity(Severity::Critical),
            );
        }
    }

    for column in &current.columns {
        if baseline.column(&column.name).is_none() {
            anomalies.push(
                Anomaly::new(
                    AnomalyKind::SchemaDrift,
                    vec![column.name.clone()],
                    format!("column added: '{}'", column.name),
                )
                .with_severity(Severity::Warning),
            );
        }
    }

    for column in &current.columns {
        if let Some(previous) = baseline.column(&column.name)
            && previous.dtype != column.dtype
        {
            anomalies.push(
                Anomaly::new(
                    AnomalyKind::SchemaDrift,
                    vec![column.name.clone()],
                    format!(
                        "type changed: '{}' was {} and is now {}",
                        column.name, previous.dtype, column.dtype
                    ),
                )
                .with_severity(Severity::Critical),
            );
        }
    }

    anomalies
}

/// Flags numeric columns whose mean or standard deviation moved by more
/// than `threshold` relative to the baseline.
pub fn detect_distribution_shift(
    baseline: &Profile,
    current: &Profile,
    threshold: f64,
) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();

    for column in &current.columns {
        let Some(previous) = baseline.column(&column.name) else {
            continue;
        };
        if column.dtype != DataType::Numeric || previous.dtype != DataType::Numeric {
            continue;
        }
        let (Some(now), Some(then)) = (column.numeric_stats, previous.numeric_stats) else {
            continue;
        };

        let mean_change = relative_change(then.mean, now.mean);
        let std_change = relative_change(then.std, now.std);
        let worst = mean_change.max(std_change);
        if worst <= threshold {
            continue;
        }

        let mut shifted = Vec::new();
        if mean_change > threshold {
            shifted.push(format!(
                "mean {} -> {} ({})",
                then.mean,
                now.mean,
                format_change(mean_change)
            ));
        }
        if std_change > threshold {
            shifted.push(format!(
                "std {} -> {} ({})",
                then.std,
                now.std,
                format_change(std_change)
            ));
        }

        let severity = if worst > threshold * 2.0 {
            Severity::Critical
        } else {
            Severity::Warning
        };

        anomalies.push(
            Anomaly::new(
                AnomalyKind::DistributionShift,
                vec![column.name.clone()],
                format!(
                    "distribution shift in '{}': {}",
                    column.name,
                    shifted.join(", ")
                ),
            )
            .with_severity(severity),
        );
    }

    anomalies
}

/// Summarizes exact duplicate rows, if any.
pub fn detect_duplicates(dataset: &Dataset) -> Option<Anomaly> {
    let count = dataset.duplicate_row_count();
    if count == 0 {
        return None;
    }
    let noun = if count == 1 { "row" } else { "rows" };
    Some(
        Anomaly::new(
            AnomalyKind::DuplicateRows,
            Vec::new(),
            format!("{} duplicate {} found", count, noun),
        )
        .with_severity(Severity::Warning),
    )
}

/// Relative change from `baseline` to `current`.
///
/// A zero baseline has no scale: any non-zero current value is an
/// unbounded change, an unchanged zero is no change.
pub fn relative_change(baseline: f64, current: f64) -> f64 {
    let delta = (current - baseline).abs();
    if baseline == 0.0 {
        if delta == 0.0 { 0.0 } else { f64::INFINITY }
    } else {
        delta / baseline.abs()
    }
}

fn format_change(change: f64) -> String {
    if change.is_finite() {
        format!("{:.1}% change", change * 100.0)
    } else {
        "change from zero".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::governance::config::{InputConfig, ProfileConfig};
    use crate::governance::models::{ColumnProfile, NumericStats};

    fn dataset(columns: &[&str], rows: &[&[&str]]) -> Dataset {
        Dataset::from_rows(
            "mem.csv",
            columns.iter().map(|c| (*c).to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|v| Some((*v).to_string())).collect())
                .collect(),
            InputConfig::default(),
        )
    }

    fn numeric(name: &str, mean: f64, std: f64) -> ColumnProfile {
        ColumnProfile::new(name, DataType::Numeric, 0).with_numeric_stats(NumericStats {
            min: mean,
            max: mean,
            mean,
            std,
        })
    }

    fn run(ds: &Dataset, baseline: Option<&Profile>) -> Vec<Anomaly> {
        let current = profile_dataset(ds, &ProfileConfig::default());
        detect_with_profile(ds, &current, baseline, &DriftConfig::default()).unwrap()
    }

    #[test]
    fn test_no_baseline_only_duplicates() {
        let ds = dataset(&["a", "b"], &[&["1", "x"], &["1", "x"], &["2", "y"]]);
        let anomalies = run(&ds, None);

        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].kind, AnomalyKind::DuplicateRows);
        assert!(anomalies[0].description.contains("1 duplicate row"));
    }

    #[test]
    fn test_no_baseline_no_duplicates() {
        let ds = dataset(&["a"], &[&["1"], &["2"]]);
        assert!(run(&ds, None).is_empty());
    }

    #[test]
    fn test_require_baseline() {
        let ds = dataset(&["a"], &[&["1"]]);
        let current = profile_dataset(&ds, &ProfileConfig::default());
        let config = DriftConfig::new().with_require_baseline(true);
        let err = detect_with_profile(&ds, &current, None, &config).unwrap_err();
        assert!(matches!(err, GovernanceError::Configuration { .. }));
    }

    #[test]
    fn test_removed_column_is_not_shift() {
        let baseline = Profile::new(
            2,
            vec![numeric("age", 30.0, 5.0), ColumnProfile::new("name", DataType::Text, 0)],
        );
        let ds = dataset(&["name"], &[&["Alice"], &["Bob"]]);
        let anomalies = run(&ds, Some(&baseline));

        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].kind, AnomalyKind::SchemaDrift);
        assert_eq!(anomalies[0].columns, ["age"]);
        assert!(anomalies[0].description.contains("removed"));
        assert!(
            !anomalies
                .iter()
                .any(|a| a.kind == AnomalyKind::DistributionShift)
        );
    }

    #[test]
    fn test_schema_drift_order() {
        let baseline = Profile::new(
            1,
            vec![
                ColumnProfile::new("gone_b", DataType::Text, 0),
                ColumnProfile::new("kept", DataType::Text, 0),
                ColumnProfile::new("gone_a", DataType::Text, 0),
            ],
        );
        let ds = dataset(&["new_z", "kept", "new_y"], &[&["1", "2", "x"]]);
        let anomalies = run(&ds, Some(&baseline));
        let descriptions: Vec<&str> = anomalies.iter().map(|a| a.description.as_str()).collect();

        assert_eq!(
            descriptions,
            [
                "column removed: 'gone_b'",
                "column removed: 'gone_a'",
                "column added: 'new_z'",
                "column added: 'new_y'",
                "type changed: 'kept' was text and is now numeric",
            ]
        );
        assert_eq!(anomalies[0].severity, Some(Severity::Critical));
        assert_eq!(anomalies[2].severity, Some(Severity::Warning));
        assert_eq!(anomalies[4].severity, Some(Severity::Critical));
    }

    /// Baseline equal to the current profile except for the mean of `x`.
    fn baseline_with_mean(ds: &Dataset, mean: f64) -> Profile {
        let mut baseline = profile_dataset(ds, &ProfileConfig::default());
        for column in &mut baseline.columns {
            if column.name == "x"
                && let Some(stats) = column.numeric_stats.as_mut()
            {
                stats.mean = mean;
            }
        }
        baseline
    }

    #[test]
    fn test_distribution_shift_above_threshold() {
        let ds = dataset(&["id", "x"], &[&["1", "13"], &["2", "13"], &["3", "13"]]);
        let baseline = baseline_with_mean(&ds, 10.0);
        let anomalies = run(&ds, Some(&baseline));

        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].kind, AnomalyKind::DistributionShift);
        assert_eq!(anomalies[0].columns, ["x"]);
        assert!(anomalies[0].description.contains("30.0% change"));
        assert_eq!(anomalies[0].severity, Some(Severity::Warning));
    }

    #[test]
    fn test_distribution_within_threshold() {
        let ds = dataset(&["id", "x"], &[&["1", "11"], &["2", "11"], &["3", "11"]]);
        let baseline = baseline_with_mean(&ds, 10.0);
        let anomalies = run(&ds, Some(&baseline));

        assert!(anomalies.is_empty());
    }

    #[test]
    fn test_distribution_shift_on_std() {
        let baseline = Profile::new(2, vec![numeric("x", 10.0, 1.0)]);
        let ds = dataset(&["x"], &[&["5"], &["15"]]);
        let anomalies = run(&ds, Some(&baseline));

        assert_eq!(anomalies.len(), 1);
        assert!(anomalies[0].description.contains("std"));
        assert!(!anomalies[0].description.contains("mean"));
        assert_eq!(anomalies[0].severity, Some(Severity::Critical));
    }

    #[test]
    fn test_baseline_without_stats_skips_shift() {
        let baseline = Profile::new(2, vec![ColumnProfile::new("x", DataType::Numeric, 0)]);
        let ds = dataset(&["x"], &[&["100"], &["200"]]);
        assert!(run(&ds, Some(&baseline)).is_empty());
    }

    #[test]
    fn test_shift_order_follows_current_profile() {
        let baseline = Profile::new(1, vec![numeric("b", 1.0, 0.0), numeric("a", 1.0, 0.0)]);
        let ds = dataset(&["a", "b"], &[&["5", "5"]]);
        let anomalies = run(&ds, Some(&baseline));

        assert_eq!(anomalies.len(), 2);
        assert_eq!(anomalies[0].columns, ["a"]);
        assert_eq!(anomalies[1].columns, ["b"]);
    }

    #[test]
    fn test_full_ordering() {
        let baseline = Profile::new(
            3,
            vec![numeric("x", 10.0, 0.0), ColumnProfile::new("old", DataType::Text, 0)],
        );
        let ds = dataset(&["x"], &[&["20"], &["20"], &["20"]]);
        let kinds: Vec<AnomalyKind> = run(&ds, Some(&baseline)).iter().map(|a| a.kind).collect();

        assert_eq!(
            kinds,
            [
                AnomalyKind::SchemaDrift,
                AnomalyKind::DistributionShift,
                AnomalyKind::DuplicateRows
            ]
        );
    }

    #[test]
    fn test_relative_change() {
        assert!((relative_change(10.0, 13.0) - 0.3).abs() < 1e-9);
        assert!((relative_change(-10.0, -8.0) - 0.2).abs() < 1e-9);
        assert_eq!(relative_change(0.0, 0.0), 0.0);
        assert!(relative_change(0.0, 1.0).is_infinite());
    }
}
