//! Output of stage results.
//!
//! Results are printed to stdout as pretty JSON, or written to a file when
//! an output path is given.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

/// Renders `value` as pretty JSON.
pub fn render_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("JSON serialization failed")
}

/// Writes `value` to `output_path`, or prints it when no path is given.
pub async fn emit_json<T: Serialize>(value: &T, output_path: Option<&Path>) -> Result<()> {
    let json_data = render_json(value)?;
    match output_path {
        Some(path) => save_json(&json_data, path).await,
        None => {
            println!("{}", json_data);
            Ok(())
        }
    }
}

/// Saves JSON data to file.
pub async fn save_json(json_data: &str, output_path: &Path) -> Result<()> {
    tokio::fs::write(output_path, json_data)
        .await
        .with_context(|| format!("Failed to write to {}", output_path.display()))?;
    tracing::info!("Output written to {}", output_path.display());
    Ok(())
}
