//! Error types for the feature pipeline.
//!
//! Only a handful of kinds are real failures: transforming before fitting,
//! refitting a fitted instance, and input that does not carry the columns
//! (or values) the pipeline needs. Malformed ids and cabins, unseen categories
//! and degenerate quantile columns are handled by fallback policies and never
//! surface here.
//!
//! Errors serialize as `{code, message}` so they can be handed to callers that
//! only speak JSON.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the feature pipeline.
#[derive(Error, Debug)]
pub enum PreprocessingError {
    /// `transform` was called on a preprocessor that has not been fitted.
    #[error("Preprocessor has not been fitted; call fit_transform first")]
    NotFitted,

    /// `fit_transform` was called on a preprocessor that is already fitted.
    #[error("Preprocessor is already fitted; create a new instance to refit")]
    AlreadyFitted,

    /// The input table does not satisfy the required schema.
    #[error("Schema error: {0}")]
    Schema(String),

    /// A loaded parameter record is inconsistent.
    #[error("Invalid fitted parameters: {0}")]
    InvalidParameters(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PreprocessingError>,
    },
}

impl PreprocessingError {
    /// Shorthand for a missing required column.
    pub fn missing_column(field: &str, accepted: &[&str]) -> Self {
        PreprocessingError::Schema(format!(
            "required column '{}' not found (accepted names: {})",
            field,
            accepted.join(", ")
        ))
    }

    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PreprocessingError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code for programmatic handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFitted => "NOT_FITTED",
            Self::AlreadyFitted => "ALREADY_FITTED",
            Self::Schema(_) => "SCHEMA_ERROR",
            Self::InvalidParameters(_) => "INVALID_PARAMETERS",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error is a `NotFitted` error, looking through context.
    pub fn is_not_fitted(&self) -> bool {
        match self {
            Self::NotFitted => true,
            Self::WithContext { source, .. } => source.is_not_fitted(),
            _ => false,
        }
    }

    /// Check if this error is a schema error, looking through context.
    pub fn is_schema_error(&self) -> bool {
        match self {
            Self::Schema(_) => true,
            Self::WithContext { source, .. } => source.is_schema_error(),
            _ => false,
        }
    }
}

impl Serialize for PreprocessingError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PreprocessingError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PreprocessingError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PreprocessingError::Polars(e).with_context(context))
    }
}
