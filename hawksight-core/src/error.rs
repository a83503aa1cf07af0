//! Error types for the governance stages.
//!
//! Every stage fails atomically: it either returns its complete result or
//! one of these errors. No stage hands back a partially populated profile,
//! anomaly list, issue list, cleaned file or report.

use std::fmt;
use std::path::Path;

use thiserror::Error;

use crate::validation::ValidationError;

/// Pipeline stage names used to attribute failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Structural and statistical profiling
    Profile,
    /// Schema drift, distribution shift and duplicate detection
    Drift,
    /// PII exposure screening
    Compliance,
    /// Deduplication and schema alignment
    Repair,
    /// Report compilation and persistence
    Report,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Profile => write!(f, "profile"),
            Stage::Drift => write!(f, "drift"),
            Stage::Compliance => write!(f, "compliance"),
            Stage::Repair => write!(f, "repair"),
            Stage::Report => write!(f, "report"),
        }
    }
}

/// Main error type for HawkSight operations.
#[derive(Debug, Error)]
pub enum GovernanceError {
    /// Source file missing, unreadable or not parsable as tabular data
    #[error("Data access failed: {context}")]
    DataAccess {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Destination not writable
    #[error("Write failed: {context}")]
    Write {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Invalid threshold, missing required input or baseline
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Compiled report does not match the report format
    #[error("Report validation failed: {0}")]
    ReportValidation(#[from] ValidationError),

    /// A pipeline stage failed; wraps the underlying cause
    #[error("Stage '{stage}' failed: {source}")]
    StageFailed {
        stage: Stage,
        #[source]
        source: Box<GovernanceError>,
    },
}

/// Convenience type alias for Results with GovernanceError
pub type Result<T> = std::result::Result<T, GovernanceError>;

impl GovernanceError {
    /// Creates a data access error for the given file.
    pub fn data_access<E>(path: &Path, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::DataAccess {
            context: format!("cannot read '{}'", path.display()),
            source: Box::new(error),
        }
    }

    /// Creates a data access error with a custom message and no underlying
    /// I/O cause (malformed records, missing header).
    pub fn malformed(path: &Path, message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self::DataAccess {
            context: format!("'{}' is not valid tabular data", path.display()),
            source: message.into(),
        }
    }

    /// Creates a write error for the given destination.
    pub fn write_failed<E>(path: &Path, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Write {
            context: format!("cannot write '{}'", path.display()),
            source: Box::new(error),
        }
    }

    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Attributes this error to a pipeline stage.
    pub fn in_stage(self, stage: Stage) -> Self {
        match self {
            already @ Self::StageFailed { .. } => already,
            other => Self::StageFailed {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// Returns the failing stage when the error was attributed to one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::StageFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
