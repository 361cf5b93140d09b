//! Shared error type across pdg crates.

use thiserror::Error;

/// Stable error codes surfaced in logs and HTTP error bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Configuration could not be read, parsed or validated.
    Config,
    /// A metric declared a type outside the supported set.
    UnknownMetricType,
    /// A gauge sequence reached a tick without an operation.
    Operation,
    /// Label values did not line up with the declared label names.
    LabelArity,
    /// Internal server error.
    Internal,
}

impl ErrorCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Config => "CONFIG_ERROR",
            ErrorCode::UnknownMetricType => "UNKNOWN_METRIC_TYPE",
            ErrorCode::Operation => "OPERATION_ERROR",
            ErrorCode::LabelArity => "LABEL_ARITY",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, PdgError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum PdgError {
    #[error("config error: {0}")]
    Config(String),
    #[error("unknown metric type {kind:?} for metric {metric}")]
    UnknownMetricType { metric: String, kind: String },
    #[error("gauge {metric}: sequence {sequence} has no operation (expected inc, dec or set)")]
    MissingOperation { metric: String, sequence: usize },
    #[error("metric {metric}: expected {expected} label values, got {got}")]
    LabelArity {
        metric: String,
        expected: usize,
        got: usize,
    },
    #[error("internal: {0}")]
    Internal(String),
}

impl PdgError {
    /// Map to a stable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            PdgError::Config(_) => ErrorCode::Config,
            PdgError::UnknownMetricType { .. } => ErrorCode::UnknownMetricType,
            PdgError::MissingOperation { .. } => ErrorCode::Operation,
            PdgError::LabelArity { .. } => ErrorCode::LabelArity,
            PdgError::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Errors raised while generating values that must stop the process.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PdgError::MissingOperation { .. } | PdgError::LabelArity { .. }
        )
    }
}
