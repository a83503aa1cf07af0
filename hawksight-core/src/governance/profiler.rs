//! Structural and statistical profiling.
//!
//! The profiler infers one type per column from its non-missing values,
//! counts missing cells, and summarizes numeric columns.

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::Result;
use crate::dataset::Dataset;

use super::config::{GovernanceConfig, ProfileConfig};
use super::models::{ColumnProfile, DataType, NumericStats, Profile};

/// Types a column may resolve to before falling back to text, strictest
/// first.
const STRICT_TYPES: [DataType; 3] = [DataType::Boolean, DataType::Numeric, DataType::Datetime];

/// Profiles the dataset at `path`.
///
/// # Errors
/// Returns `GovernanceError::DataAccess` if the file cannot be opened or
/// parsed as tabular data.
pub fn profile(path: &Path, config: &GovernanceConfig) -> Result<Profile> {
    let dataset = Dataset::load(path, &config.input)?;
    Ok(profile_dataset(&dataset, &config.profiling))
}

/// Profiles an already loaded dataset.
pub fn profile_dataset(dataset: &Dataset, config: &ProfileConfig) -> Profile {
    let columns = dataset
        .columns()
        .iter()
        .enumerate()
        .map(|(index, name)| profile_column(dataset, index, name, config.type_threshold))
        .collect();

    Profile::new(dataset.row_count() as u64, columns)
}

fn profile_column(dataset: &Dataset, index: usize, name: &str, threshold: f64) -> ColumnProfile {
    let values: Vec<&str> = dataset
        .column_values(index)
        .filter_map(|(_, value)| value)
        .collect();
    let missing_count = dataset.row_count().saturating_sub(values.len()) as u64;

    let dtype = infer_type(&values, threshold);
    let column = ColumnProfile::new(name, dtype, missing_count);

    if dtype != DataType::Numeric {
        return column;
    }

    let numbers: Vec<f64> = values.iter().filter_map(|v| parse_numeric(v)).collect();
    match calculate_statistics(&numbers) {
        Some(stats) => column.with_numeric_stats(stats),
        None => column,
    }
}

/// Resolves a column type from its non-missing values.
///
/// The first strict type whose share of values reaches `threshold` wins;
/// otherwise the column is text. No values at all means unknown.
pub fn infer_type(values: &[&str], threshold: f64) -> DataType {
    if values.is_empty() {
        return DataType::Unknown;
    }

    let total = values.len() as f64;
    for candidate in STRICT_TYPES {
        let matching = values.iter().filter(|v| matches_type(v, candidate)).count();
        if matching as f64 / total >= threshold {
            return candidate;
        }
    }
    DataType::Text
}

/// Returns true when `value` parses as `dtype`. Text and unknown match
/// nothing.
pub fn matches_type(value: &str, dtype: DataType) -> bool {
    match dtype {
        DataType::Boolean => parse_boolean(value).is_some(),
        DataType::Numeric => parse_numeric(value).is_some(),
        DataType::Datetime => is_datetime(value),
        DataType::Text | DataType::Unknown => false,
    }
}

fn parse_boolean(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Parses a finite number. "inf" and similar spellings are rejected so they
/// cannot poison the statistics.
pub fn parse_numeric(value: &str) -> Option<f64> {
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => None,
    }
}

fn is_datetime(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").is_ok()
}

/// Calculates min, max, mean and population standard deviation.
///
/// Returns `None` for an empty slice. A single value yields that value for
/// every statistic and a standard deviation of zero.
///
/// Values are divided by the largest magnitude before summing, so finite
/// inputs near `f64::MAX` still produce finite statistics.
pub fn calculate_statistics(values: &[f64]) -> Option<NumericStats> {
    let first = *values.first()?;
    let n = values.len() as f64;

    let (min, max) = values
        .iter()
        .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let scale = min.abs().max(max.abs());
    if scale == 0.0 {
        return Some(NumericStats {
            min,
            max,
            mean: 0.0,
            std: 0.0,
        });
    }

    let scaled_mean = values.iter().map(|x| x / scale).sum::<f64>() / n;
    let scaled_variance = values
        .iter()
        .map(|x| (x / scale - scaled_mean).powi(2))
        .sum::<f64>()
        / n;

    Some(NumericStats {
        min,
        max,
        mean: scaled_mean * scale,
        std: scaled_variance.sqrt() * scale,
    })
}
