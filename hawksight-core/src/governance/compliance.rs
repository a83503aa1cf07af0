//! PII exposure screening.
//!
//! Text-valued cells are matched against the configured patterns: every
//! cell of a text column, and the cells of a typed column that do not parse
//! as its type. Cells already carrying a masking token are considered
//! protected.

use std::path::Path;

use regex::Regex;

use crate::Result;
use crate::dataset::Dataset;

use super::config::{ComplianceConfig, ConfigValidationError, GovernanceConfig};
use super::models::{ComplianceIssue, Profile};
use super::profiler::{matches_type, profile_dataset};

/// A configured pattern with its compiled regex.
#[derive(Debug)]
struct CompiledPattern<'a> {
    category: &'a str,
    regex: Regex,
}

/// Scans the dataset at `path` for unmasked PII.
///
/// # Errors
/// Returns `GovernanceError::DataAccess` if the file cannot be read, or
/// `GovernanceError::Configuration` if a pattern does not compile.
pub fn scan(path: &Path, config: &GovernanceConfig) -> Result<Vec<ComplianceIssue>> {
    let dataset = Dataset::load(path, &config.input)?;
    let profile = profile_dataset(&dataset, &config.profiling);
    scan_dataset(&dataset, &profile, &config.compliance)
}

/// Scans the text-valued cells of a loaded dataset, column then row.
pub fn scan_dataset(
    dataset: &Dataset,
    profile: &Profile,
    config: &ComplianceConfig,
) -> Result<Vec<ComplianceIssue>> {
    let patterns = compile_patterns(config)?;
    let mut issues = Vec::new();

    for (index, name) in dataset.columns().iter().enumerate() {
        let Some(dtype) = profile.column(name).map(|c| c.dtype) else {
            continue;
        };

        for (row, value) in dataset.column_values(index) {
            let Some(value) = value else {
                continue;
            };
            if matches_type(value, dtype) || is_masked(value, &config.mask_tokens) {
                continue;
            }
            if let Some(pattern) = patterns.iter().find(|p| p.regex.is_match(value)) {
                issues.push(ComplianceIssue {
                    column: name.clone(),
                    row: row as u64,
                    category: pattern.category.to_string(),
                    masked_value: mask_value(value),
                    description: format!(
                        "unmasked {} in column '{}' at row {}",
                        pattern.category, name, row
                    ),
                });
            }
        }
    }

    if !issues.is_empty() {
        tracing::warn!(
            "Found {} unmasked PII values in {}",
            issues.len(),
            dataset.source().display()
        );
    }

    Ok(issues)
}

fn compile_patterns(config: &ComplianceConfig) -> Result<Vec<CompiledPattern<'_>>> {
    let mut compiled = Vec::with_capacity(config.patterns.len());
    for p in &config.patterns {
        let regex = Regex::new(&p.pattern).map_err(|e| ConfigValidationError::InvalidPattern {
            category: p.category.clone(),
            message: e.to_string(),
        })?;
        compiled.push(CompiledPattern {
            category: &p.category,
            regex,
        });
    }
    Ok(compiled)
}

fn is_masked(value: &str, tokens: &[String]) -> bool {
    tokens
        .iter()
        .any(|token| !token.is_empty() && value.contains(token.as_str()))
}

/// Masks a value for display: the first character of every alphanumeric
/// run survives, the rest become `*`, separators are kept.
///
/// ```
/// use hawksight_core::governance::compliance::mask_value;
///
/// assert_eq!(mask_value("alice@example.com"), "a****@e******.c**");
/// assert_eq!(mask_value("123-45-6789"), "1**-4*-6***");
/// ```
pub fn mask_value(value: &str) -> String {
    let mut previous_alphanumeric = false;
    value
        .chars()
        .map(|c| {
            let alphanumeric = c.is_alphanumeric();
            let masked = if alphanumeric && previous_alphanumeric { '*' } else { c };
            previous_alphanumeric = alphanumeric;
            masked
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GovernanceError;
    use crate::governance::config::{InputConfig, PiiPattern, ProfileConfig};
    use crate::governance::models::DataType;

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

    fn scan_with(ds: &Dataset, config: &ComplianceConfig) -> Vec<ComplianceIssue> {
        let profile = profile_dataset(ds, &ProfileConfig::default());
        scan_dataset(ds, &profile, config).unwrap()
    }

    #[test]
    fn test_unmasked_email_is_flagged() {
        let ds = dataset(&["email"], &[&["alice@example.com"]]);
        let issues = scan_with(&ds, &ComplianceConfig::default());

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].column, "email");
        assert_eq!(issues[0].row, 0);
        assert_eq!(issues[0].category, "email");
        assert_eq!(issues[0].masked_value, "a****@e******.c**");
        assert!(!issues[0].masked_value.contains("alice"));
    }

    #[test]
    fn test_masked_email_is_ignored() {
        let ds = dataset(&["email"], &[&["a***@example.com"], &["[REDACTED]"]]);
        assert!(scan_with(&ds, &ComplianceConfig::default()).is_empty());
    }

    #[test]
    fn test_ssn_detected() {
        let ds = dataset(&["note"], &[&["ssn 123-45-6789 on file"], &["nothing here"]]);
        let issues = scan_with(&ds, &ComplianceConfig::default());

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].category, "ssn");
        assert_eq!(issues[0].row, 0);
    }

    #[test]
    fn test_cells_parsing_as_column_type_are_skipped() {
        let ds = dataset(&["id", "email"], &[&["1", "x@y.io"], &["2", "bob"]]);
        let issues = scan_with(&ds, &ComplianceConfig::default());

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].column, "email");
        assert_eq!(issues[0].row, 0);
    }

    #[test]
    fn test_stray_text_in_numeric_column_is_scanned() {
        let mut rows: Vec<&[&str]> = vec![&["7"][..]; 19];
        rows.push(&["alice@example.com"]);
        let ds = dataset(&["contact"], &rows);
        let profile = profile_dataset(&ds, &ProfileConfig::default());
        assert_eq!(profile.column("contact").unwrap().dtype, DataType::Numeric);

        let issues = scan_dataset(&ds, &profile, &ComplianceConfig::default()).unwrap();

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].column, "contact");
        assert_eq!(issues[0].row, 19);
        assert_eq!(issues[0].category, "email");
    }

    #[test]
    fn test_column_then_row_order() {
        let ds = dataset(
            &["a", "b"],
            &[&["x", "b1@mail.com"], &["a1@mail.com", "y"], &["a2@mail.com", "b2@mail.com"]],
        );
        let issues = scan_with(&ds, &ComplianceConfig::default());
        let positions: Vec<(&str, u64)> = issues.iter().map(|i| (i.column.as_str(), i.row)).collect();

        assert_eq!(positions, [("a", 1), ("a", 2), ("b", 0), ("b", 2)]);
    }

    #[test]
    fn test_one_issue_per_cell_first_pattern_wins() {
        let ds = dataset(&["c"], &[&["bob@mail.com 123-45-6789"]]);
        let issues = scan_with(&ds, &ComplianceConfig::default());

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].category, "email");
    }

    #[test]
    fn test_custom_pattern_and_tokens() {
        let config = ComplianceConfig::default()
            .add_pattern(PiiPattern::new("phone", r"\b\d{3}-\d{3}-\d{4}\b"))
            .with_mask_tokens(vec!["XXX".to_string()]);
        let ds = dataset(&["c"], &[&["call 555-123-4567"], &["bob@example.com"], &["XXX@example.com"]]);
        let issues = scan_with(&ds, &config);
        let categories: Vec<&str> = issues.iter().map(|i| i.category.as_str()).collect();

        assert_eq!(categories, ["phone", "email"]);
        assert_eq!(issues[1].row, 1);
    }

    #[test]
    fn test_invalid_pattern_is_configuration_error() {
        let config = ComplianceConfig::default().add_pattern(PiiPattern::new("bad", "("));
        let ds = dataset(&["c"], &[&["x"]]);
        let profile = profile_dataset(&ds, &ProfileConfig::default());
        let err = scan_dataset(&ds, &profile, &config).unwrap_err();

        assert!(matches!(err, GovernanceError::Configuration { .. }));
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn test_mask_value() {
        assert_eq!(mask_value("alice@example.com"), "a****@e******.c**");
        assert_eq!(mask_value("123-45-6789"), "1**-4*-6***");
        assert_eq!(mask_value(""), "");
    }
}
