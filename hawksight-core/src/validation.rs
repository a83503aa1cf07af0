//! JSON Schema validation for persisted governance reports.
//!
//! Every report is checked against an embedded schema before it is written
//! and again when it is loaded back. The schema pins the six top-level keys
//! and the shape of each section, so a report on disk always has the same
//! layout regardless of which run produced it.
//!
//! # Example
//! ```rust
//! use hawksight_core::validation::validate_report_output;
//! use serde_json::json;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let report = json!({
//!     "timestamp": "2024-01-15T10:30:00Z",
//!     "profile": {"row_count": 0, "columns": {}},
//!     "anomalies": [],
//!     "compliance_issues": [],
//!     "cleaned_path": "data_cleaned.csv",
//!     "lineage": {"sources": [], "transformations": [], "outputs": []}
//! });
//!
//! validate_report_output(&report)?;
//! # Ok(())
//! # }
//! ```

use std::sync::OnceLock;

use jsonschema::Validator;
use serde_json::Value;
use thiserror::Error;

use crate::governance::models::GovernanceReport;

/// Report validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Embedded schema could not be compiled
    #[error("JSON Schema compilation failed: {message}")]
    SchemaCompilation { message: String },

    /// Report does not conform to the schema
    #[error("Report validation failed with {error_count} errors: {errors:?}")]
    ValidationFailed {
        error_count: usize,
        errors: Vec<String>,
    },

    /// JSON parsing error
    #[error("JSON parsing failed: {source}")]
    JsonParsing {
        #[from]
        source: serde_json::Error,
    },
}

/// Embedded JSON Schema for governance reports
const REPORT_SCHEMA: &str = r#"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "title": "HawkSight Governance Report",
  "type": "object",
  "additionalProperties": false,
  "required": ["timestamp", "profile", "anomalies", "compliance_issues", "cleaned_path", "lineage"],
  "properties": {
    "timestamp": {
      "type": "string",
      "pattern": "^\\d{4}-\\d{2}-\\d{2}T\\d{2}:\\d{2}:\\d{2}(\\.\\d+)?(Z|[+-]\\d{2}:\\d{2})$"
    },
    "profile": {
      "type": "object",
      "required": ["row_count", "columns"],
      "properties": {
        "row_count": { "type": "integer", "minimum": 0 },
        "columns": {
          "type": "object",
          "additionalProperties": {
            "type": "object",
            "required": ["dtype"],
            "properties": {
              "dtype": { "enum": ["numeric", "text", "boolean", "datetime", "unknown"] },
              "missing_count": { "type": "integer", "minimum": 0 },
              "numeric_stats": {
                "type": "object",
                "required": ["min", "max", "mean", "std"],
                "properties": {
                  "min": { "type": "number" },
                  "max": { "type": "number" },
                  "mean": { "type": "number" },
                  "std": { "type": "number", "minimum": 0 }
                }
              }
            }
          }
        }
      }
    },
    "anomalies": {
      "type": "array",
      "items": {
        "type": "object",
        "required": ["kind", "description"],
        "properties": {
          "kind": { "enum": ["schema-drift", "distribution-shift", "duplicate-rows"] },
          "columns": { "type": "array", "items": { "type": "string" } },
          "description": { "type": "string" },
          "severity": { "enum": ["warning", "critical"] }
        }
      }
    },
    "compliance_issues": {
      "type": "array",
      "items": {
        "type": "object",
        "required": ["column", "row", "category", "masked_value", "description"],
        "properties": {
          "column": { "type": "string" },
          "row": { "type": "integer", "minimum": 0 },
          "category": { "type": "string", "minLength": 1 },
          "masked_value": { "type": "string" },
          "description": { "type": "string" }
        }
      }
    },
    "cleaned_path": { "type": "string", "minLength": 1 },
    "lineage": {
      "type": "object",
      "required": ["sources", "transformations", "outputs"],
      "properties": {
        "sources": { "type": "array", "items": { "type": "string" } },
        "transformations": { "type": "array", "items": { "type": "string" } },
        "outputs": { "type": "array", "items": { "type": "string" } }
      }
    }
  }
}"#;

/// Compiled report schema (initialized once)
static COMPILED_SCHEMA: OnceLock<Validator> = OnceLock::new();

/// Compiles the embedded report schema and caches it.
///
/// Safe to call more than once; later calls keep the first compilation.
///
/// # Errors
/// Returns `ValidationError::SchemaCompilation` if the embedded schema is invalid.
pub fn initialize_report_validator() -> Result<(), ValidationError> {
    if COMPILED_SCHEMA.get().is_some() {
        return Ok(());
    }

    let schema_json = get_schema_definition()?;
    let compiled = jsonschema::validator_for(&schema_json).map_err(|e| {
        ValidationError::SchemaCompilation {
            message: format!("Schema compilation error: {}", e),
        }
    })?;

    let _ = COMPILED_SCHEMA.set(compiled);
    Ok(())
}

fn report_validator() -> Result<&'static Validator, ValidationError> {
    initialize_report_validator()?;
    COMPILED_SCHEMA
        .get()
        .ok_or_else(|| ValidationError::SchemaCompilation {
            message: "Report validator not initialized".to_string(),
        })
}

/// Validates the JSON form of a governance report.
///
/// # Errors
/// Returns `ValidationError::ValidationFailed` if the value does not match
/// the report schema.
pub fn validate_report_output(json_value: &Value) -> Result<(), ValidationError> {
    let schema = report_validator()?;

    if let Err(validation_error) = schema.validate(json_value) {
        return Err(ValidationError::ValidationFailed {
            error_count: 1,
            errors: vec![format!("Report validation failed: {}", validation_error)],
        });
    }

    Ok(())
}

/// Parses, validates and deserializes a persisted report.
pub fn validate_and_parse_report(json_str: &str) -> Result<GovernanceReport, ValidationError> {
    let json_value: Value = serde_json::from_str(json_str)?;
    validate_report_output(&json_value)?;
    let report = serde_json::from_str(json_str)?;
    Ok(report)
}

/// Returns the embedded report schema as a parsed value.
pub fn get_schema_definition() -> Result<Value, ValidationError> {
    serde_json::from_str(REPORT_SCHEMA).map_err(|e| ValidationError::SchemaCompilation {
        message: format!("Failed to parse embedded schema: {}", e),
    })
}
