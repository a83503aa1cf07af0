//! Property tests for profiling and repair.
//!
//! Validates the row-count and missing-count invariants of the profiler and
//! that repair output is duplicate-free, never longer than its input, and
//! stable when repaired again.

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]

use std::fs;

use hawksight_core::governance::profiler::profile_dataset;
use hawksight_core::governance::repair::repair;
use hawksight_core::{Dataset, GovernanceConfig, InputConfig, ProfileConfig};
use proptest::prelude::*;

const COLUMNS: [&str; 3] = ["a", "b", "c"];

/// Rows of small alphanumeric cells so duplicates occur often.
fn rows_strategy() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(
        prop::collection::vec("[a-c0-2]{1,2}", COLUMNS.len()),
        0..40,
    )
}

fn to_csv(rows: &[Vec<String>]) -> String {
    let mut out = COLUMNS.join(",");
    out.push('\n');
    for row in rows {
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

fn to_dataset(rows: &[Vec<String>]) -> Dataset {
    Dataset::from_rows(
        "mem.csv",
        COLUMNS.iter().map(|c| (*c).to_string()).collect(),
        rows.iter()
            .map(|r| r.iter().map(|v| Some(v.clone())).collect())
            .collect(),
        InputConfig::default(),
    )
}

proptest! {
    #[test]
    fn test_profile_row_count_matches_rows(rows in rows_strategy()) {
        let profile = profile_dataset(&to_dataset(&rows), &ProfileConfig::default());
        prop_assert_eq!(profile.row_count, rows.len() as u64);
        prop_assert_eq!(profile.columns.len(), COLUMNS.len());
    }

    #[test]
    fn test_profile_no_missing_cells(rows in rows_strategy()) {
        let profile = profile_dataset(&to_dataset(&rows), &ProfileConfig::default());
        prop_assert!(profile.columns.iter().all(|c| c.missing_count == 0));
    }

    #[test]
    fn test_repair_output_is_duplicate_free_and_idempotent(rows in rows_strategy()) {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.csv");
        fs::write(&input, to_csv(&rows)).unwrap();
        let config = GovernanceConfig::default();

        let cleaned = repair(&input, &config).unwrap();
        let cleaned_dataset = Dataset::load(&cleaned, &config.input).unwrap();
        prop_assert_eq!(cleaned_dataset.duplicate_row_count(), 0);
        prop_assert!(cleaned_dataset.row_count() <= rows.len());
        let expected: Vec<String> = COLUMNS.iter().map(|c| (*c).to_string()).collect();
        prop_assert_eq!(cleaned_dataset.columns(), expected.as_slice());

        let first = fs::read_to_string(&cleaned).unwrap();
        let again = repair(&cleaned, &config).unwrap();
        prop_assert_eq!(fs::read_to_string(again).unwrap(), first);
    }
}
