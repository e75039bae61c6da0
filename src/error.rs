// In: src/error.rs

//! This module defines the single, unified error type for the entire prepcv library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrepCvError {
    // =========================================================================
    // === Description Construction Errors
    // =========================================================================
    #[error(
        "Invalid parameter '{parameter}' for function '{operation}'. Valid parameters are: {valid}"
    )]
    Validation {
        operation: String,
        parameter: String,
        valid: String,
    },

    #[error("Operation '{0}' appears more than once in a pipeline description")]
    DuplicateOperation(String),

    #[error("No operation named '{0}' is known to the catalog")]
    UnknownOperation(String),

    #[error("Pipeline description expands to more combinations than can be counted: {0}")]
    TooManyCombinations(String),

    // =========================================================================
    // === Search & Selection Errors
    // =========================================================================
    #[error("Pipeline execution failed at stage {stage} ('{operation}'): {source}")]
    Execution {
        stage: usize,
        operation: String,
        #[source]
        source: Box<PrepCvError>,
    },

    #[error("Search was invoked on an empty candidate pool")]
    NoCandidates,

    #[error("All {0} candidates failed to execute; nothing left to rank")]
    AllCandidatesFailed(usize),

    #[error("Selection protocol violated: {0}")]
    Protocol(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // =========================================================================
    // === Operation-Level Errors (raised by kernels, wrapped by `Execution`)
    // =========================================================================
    #[error("Missing required parameter '{0}'")]
    MissingParameter(String),

    #[error("Invalid value for parameter '{parameter}': {message}")]
    InvalidParameterValue { parameter: String, message: String },

    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the underlying I/O subsystem (oracle prompt, experiment files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library, typically during experiment or winner serialization.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

impl PrepCvError {
    /// Shorthand used by kernels to reject a parameter value.
    pub fn invalid_value(parameter: &str, message: impl Into<String>) -> Self {
        PrepCvError::InvalidParameterValue {
            parameter: parameter.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PrepCvError>;
