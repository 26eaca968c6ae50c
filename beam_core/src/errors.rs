//! # Error Types
//!
//! Structured error types for beam_core. Every variant carries enough
//! context to tell which input was wrong and why, and serializes to JSON so
//! the CLI can hand errors to other tools.
//!
//! ## Example
//!
//! ```rust
//! use beam_core::errors::{CalcError, CalcResult};
//!
//! fn validate_length(length: f64) -> CalcResult<()> {
//!     if length <= 0.0 {
//!         return Err(CalcError::configuration("L", length.to_string(), "Beam length must be positive"));
//!     }
//!     Ok(())
//! }
//!
//! assert_eq!(validate_length(-1.0).unwrap_err().error_code(), "CONFIGURATION_ERROR");
//! ```

use beam_fe::FeError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for beam_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for beam operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// Beam data cannot form a valid model (bad length, nu = -1, too few nodes)
    #[error("Configuration error for '{field}': {value} - {reason}")]
    Configuration {
        field: String,
        value: String,
        reason: String,
    },

    /// Direction not valid for the requested result type
    #[error("Invalid direction '{direction}' for {result_type}; expected one of {valid}")]
    InvalidDirection {
        result_type: String,
        direction: String,
        valid: String,
    },

    /// Combination name not registered on the model
    #[error("Unknown load combination: {combo_name}")]
    UnknownCombo { combo_name: String },

    /// Extraction only supports single-member beams
    #[error("Unsupported topology: model has {member_count} member(s) - {reason}")]
    UnsupportedTopology { member_count: usize, reason: String },

    /// An input value is invalid (out of range, empty, mismatched lengths)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// Malformed line in a beam text file
    #[error("Parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// The FE engine rejected the model or failed to solve it
    #[error("Analysis failed: {reason}")]
    AnalysisFailed { reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CalcError {
    /// Create a Configuration error
    pub fn configuration(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::Configuration {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn unknown_combo(combo_name: impl Into<String>) -> Self {
        CalcError::UnknownCombo {
            combo_name: combo_name.into(),
        }
    }

    pub fn parse(line: usize, reason: impl Into<String>) -> Self {
        CalcError::Parse {
            line,
            reason: reason.into(),
        }
    }

    pub fn analysis_failed(reason: impl Into<String>) -> Self {
        CalcError::AnalysisFailed { reason: reason.into() }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::Configuration { .. } => "CONFIGURATION_ERROR",
            CalcError::InvalidDirection { .. } => "INVALID_DIRECTION",
            CalcError::UnknownCombo { .. } => "UNKNOWN_COMBO",
            CalcError::UnsupportedTopology { .. } => "UNSUPPORTED_TOPOLOGY",
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::Parse { .. } => "PARSE_ERROR",
            CalcError::AnalysisFailed { .. } => "ANALYSIS_FAILED",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<FeError> for CalcError {
    fn from(err: FeError) -> Self {
        match err {
            FeError::ComboNotFound(name) => CalcError::UnknownCombo { combo_name: name },
            other => CalcError::AnalysisFailed {
                reason: other.to_string(),
            },
        }
    }
}
