//! # rowscope - tabular data pipeline
//!
//! rowscope loads one or more delimited-text files, transforms the rows in
//! place (filter, pluck, deduplicate) and derives views from the result:
//! groups, boolean partitions, days-since buckets and true/false tallies.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV files  │────▶│   Parser    │────▶│  Pipeline   │────▶│    Views    │
//! │  (any enc)  │     │  (auto-enc) │     │ (in place)  │     │ (snapshots) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rowscope::Analysis;
//!
//! let mut analysis = Analysis::new();
//! analysis.load(&["tasks.csv"]);
//! analysis.filter(&["done".into()]);
//! let summary = analysis.analyze_boolean_column("done").summary;
//! println!("{}% done", summary.true_percentage);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Records, record sets and group containers
//! - [`parser`] - Delimited-text reading with auto-detection
//! - [`transform`] - Normalization, pipeline, grouping and plans
//! - [`analysis`] - Date and boolean analyzers and the facade
//! - [`config`] - Runtime configuration
//! - [`api`] - HTTP API server and log streaming

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Analysis
pub mod analysis;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{AnalysisError, PlanError, ServerError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{BooleanGroups, GroupMap, Record, RecordSet};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, parse_bytes_auto, parse_csv_file_auto,
    parse_delimited, CsvError, ParseResult,
};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    example_plan, group_by_key, group_by_key_boolean, group_by_keys, normalize_boolean,
    steps_description, AnalysisPlan, Pipeline, Step,
};

// =============================================================================
// Re-exports - Analysis
// =============================================================================

pub use analysis::{
    Analysis, AnalysisReport, BooleanAnalysis, BooleanSummary, DateBucket, LoadReport,
    SourceFailure, SourceInfo,
};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, AnalyzeResponse, HealthResponse};
pub use config::ServerConfig;

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
