//! Error types for the rowscope analysis pipeline.
//!
//! The hierarchy follows the layers of the crate:
//!
//! - [`CsvError`] - delimited-text reading errors (defined in [`crate::parser`])
//! - [`PlanError`] - analysis plan decoding errors
//! - [`AnalysisError`] - top-level orchestration errors
//! - [`ServerError`] - HTTP boundary errors
//!
//! Conversion is automatic via `From` implementations so `?` works across
//! layer boundaries. None of the in-memory transforms return errors: missing
//! columns and unparseable cells are handled as data, not failures.

use thiserror::Error;

pub use crate::parser::CsvError;

// =============================================================================
// Plan Errors
// =============================================================================

/// Errors while decoding or validating an analysis plan.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The plan is not valid JSON or does not match the plan shape.
    #[error("Invalid analysis plan: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A column list was given empty.
    #[error("'{0}' needs at least one column")]
    EmptyColumns(String),
}

// =============================================================================
// Analysis Errors (top-level)
// =============================================================================

/// Top-level errors returned by the CLI and API drivers.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Reading a source failed.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Plan decoding error.
    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    /// Filesystem error outside of source reading (plan files, outputs).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No source was given.
    #[error("No input sources given")]
    NoSources,

    /// Every source failed to load.
    #[error("All {0} sources failed to load")]
    AllSourcesFailed(usize),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Analysis error.
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for reading operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for plan operations.
pub type PlanResult<T> = Result<T, PlanError>;

/// Result type for top-level analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
