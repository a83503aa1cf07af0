//! Deduplication and schema alignment.
//!
//! The repair engine writes a new file and never touches its input. Output
//! goes to a temporary sibling first and is renamed into place, so a failed
//! write leaves nothing behind at the destination.

use std::ffi::OsStr;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;

use crate::dataset::Dataset;
use crate::error::{GovernanceError, Result};

use super::config::{GovernanceConfig, RepairConfig};

/// Repairs the dataset at `path` and returns the cleaned file's path.
///
/// Rows repeating an earlier row are dropped (first occurrence kept, order
/// stable) and cells a short record did not supply are filled with
/// `fill_value`. Every header column is written.
///
/// # Errors
/// Returns `GovernanceError::DataAccess` if the input cannot be read,
/// `GovernanceError::Configuration` if the destination would be the input
/// itself, or `GovernanceError::Write` if the destination cannot be written.
pub fn repair(path: &Path, config: &GovernanceConfig) -> Result<PathBuf> {
    let dataset = Dataset::load(path, &config.input)?;
    let destination = cleaned_path_for(path, &config.repair);
    write_cleaned(&dataset, &destination, &config.repair)?;
    Ok(destination)
}

/// Computes `<stem><suffix>.<ext>` next to the input, or inside
/// `output_dir` when one is configured.
pub fn cleaned_path_for(input: &Path, config: &RepairConfig) -> PathBuf {
    let mut file_name = input.file_stem().map(OsStr::to_os_string).unwrap_or_default();
    file_name.push(&config.suffix);
    if let Some(ext) = input.extension() {
        file_name.push(".");
        file_name.push(ext);
    }

    let dir = match &config.output_dir {
        Some(dir) => dir.clone(),
        None => input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
    };
    dir.join(file_name)
}

/// Writes the deduplicated rows of `dataset` to `destination`.
pub fn write_cleaned(dataset: &Dataset, destination: &Path, config: &RepairConfig) -> Result<()> {
    if is_same_file(dataset.source(), destination) {
        return Err(GovernanceError::configuration(format!(
            "cleaned output '{}' would overwrite its input",
            destination.display()
        )));
    }

    let dir = destination
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(|e| GovernanceError::write_failed(dir, e))?;

    let delimiter = dataset.input_config().delimiter_byte()?;
    let mut staged = tempfile::Builder::new()
        .prefix(".hawksight-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| GovernanceError::write_failed(destination, e))?;

    let kept = dataset.first_occurrences();
    {
        let mut writer = WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(staged.as_file_mut());

        writer
            .write_record(dataset.columns())
            .map_err(|e| GovernanceError::write_failed(destination, e))?;

        for &index in &kept {
            let record = dataset.rows()[index]
                .iter()
                .map(|cell| cell.as_deref().unwrap_or(config.fill_value.as_str()));
            writer
                .write_record(record)
                .map_err(|e| GovernanceError::write_failed(destination, e))?;
        }

        writer
            .flush()
            .map_err(|e| GovernanceError::write_failed(destination, e))?;
    }
    staged
        .as_file_mut()
        .flush()
        .map_err(|e| GovernanceError::write_failed(destination, e))?;

    staged
        .persist(destination)
        .map_err(|e| GovernanceError::write_failed(destination, e.error))?;

    tracing::info!(
        "Wrote {} rows to {} ({} duplicates removed)",
        kept.len(),
        destination.display(),
        dataset.row_count().saturating_sub(kept.len())
    );

    Ok(())
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
