//! Baseline profile storage.
//!
//! A baseline is a [`Profile`] captured by an earlier run and used as the
//! drift reference. Stores are pluggable; the JSON file store covers the
//! common case of one baseline per dataset kept next to the data.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{GovernanceError, Result};
use crate::governance::models::Profile;

/// Loads and saves a baseline profile.
pub trait BaselineStore {
    /// Returns the stored baseline, or `None` when none has been saved.
    fn load(&self) -> Result<Option<Profile>>;

    /// Replaces the stored baseline.
    fn save(&self, profile: &Profile) -> Result<()>;
}

/// Baseline kept as a JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonBaselineStore {
    path: PathBuf,
}

impl JsonBaselineStore {
    /// Creates a store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BaselineStore for JsonBaselineStore {
    fn load(&self) -> Result<Option<Profile>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No baseline at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(GovernanceError::data_access(&self.path, e)),
        };

        let profile = serde_json::from_str(&contents)
            .map_err(|e| GovernanceError::data_access(&self.path, e))?;
        Ok(Some(profile))
    }

    fn save(&self, profile: &Profile) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| GovernanceError::write_failed(parent, e))?;
        }
        let contents = serde_json::to_string_pretty(profile)
            .map_err(|e| GovernanceError::write_failed(&self.path, e))?;
        fs::write(&self.path, contents).map_err(|e| GovernanceError::write_failed(&self.path, e))?;

        tracing::info!("Baseline profile saved to {}", self.path.display());
        Ok(())
    }
}
