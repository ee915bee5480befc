//! Error types for ScholarNet
//!
//! Provides a comprehensive error handling system with:
//! - Distinct error types for different failure modes
//! - Severity classification (fatal vs. stage-local degradation)
//! - Error codes for log and report consumers

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    ValidationError,
    InvalidFormat,

    // Input errors (2xxx)
    InputNotFound,
    InputReadError,
    MalformedRecord,

    // Analysis errors (3xxx)
    ConvergenceFailure,
    ModelFitError,

    // Output errors (4xxx)
    OutputWriteError,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            // Validation (1xxx)
            ErrorCode::ValidationError => 1001,
            ErrorCode::InvalidFormat => 1003,

            // Input (2xxx)
            ErrorCode::InputNotFound => 2001,
            ErrorCode::InputReadError => 2002,
            ErrorCode::MalformedRecord => 2003,

            // Analysis (3xxx)
            ErrorCode::ConvergenceFailure => 3002,
            ErrorCode::ModelFitError => 3003,

            // Output (4xxx)
            ErrorCode::OutputWriteError => 4001,

            // Internal (9xxx)
            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
            ErrorCode::SerializationError => 9003,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>
    },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    // Input errors
    #[error("Input not found: {path}")]
    InputNotFound { path: String },

    #[error("Failed to read {path}: {message}")]
    InputRead { path: String, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // Analysis errors
    #[error("{algorithm} did not converge within {iterations} iterations")]
    Convergence { algorithm: String, iterations: usize },

    #[error("Model {model} failed to fit: {message}")]
    ModelFit { model: String, message: String },

    // Output errors
    #[error("Failed to write {path}: {message}")]
    OutputWrite { path: String, message: String },

    // Internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            AppError::InputNotFound { .. } => ErrorCode::InputNotFound,
            AppError::InputRead { .. } => ErrorCode::InputReadError,
            AppError::Csv(_) => ErrorCode::MalformedRecord,
            AppError::Convergence { .. } => ErrorCode::ConvergenceFailure,
            AppError::ModelFit { .. } => ErrorCode::ModelFitError,
            AppError::OutputWrite { .. } => ErrorCode::OutputWriteError,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
            AppError::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Whether the pipeline can continue after this error by degrading a
    /// single stage (one metric, one model) instead of aborting the run
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Convergence { .. } | AppError::ModelFit { .. }
        )
    }

    /// Check if this error was caused by bad input data or configuration
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            AppError::Validation { .. }
                | AppError::InvalidFormat { .. }
                | AppError::InputNotFound { .. }
                | AppError::InputRead { .. }
                | AppError::Csv(_)
                | AppError::Configuration { .. }
        )
    }

    /// Shorthand for a model fit failure
    pub fn model_fit(model: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::ModelFit {
            model: model.into(),
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal {
            message: err.to_string()
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration {
            message: err.to_string()
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let field = err.field_errors().keys().next().map(|k| k.to_string());
        AppError::Validation {
            message: err.to_string(),
            field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        let err = AppError::InputNotFound { path: "data/publications.csv".into() };
        assert_eq!(err.code(), ErrorCode::InputNotFound);
        assert_eq!(err.code().as_code(), 2001);
        assert!(err.is_input_error());
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_model_fit_is_recoverable() {
        let err = AppError::model_fit("BoostedTrees", "learning rate must be positive");
        assert_eq!(err.code(), ErrorCode::ModelFitError);
        assert!(err.is_recoverable());
        assert!(!err.is_input_error());
        assert!(err.to_string().contains("BoostedTrees"));
    }

    #[test]
    fn test_convergence_error() {
        let err = AppError::Convergence {
            algorithm: "eigenvector_centrality".into(),
            iterations: 1000,
        };
        assert!(err.is_recoverable());
        assert_eq!(
            err.to_string(),
            "eigenvector_centrality did not converge within 1000 iterations"
        );
    }
}
