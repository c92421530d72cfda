//! REST API types.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::analysis::{AnalysisReport, LoadReport, SourceFailure, SourceInfo};

/// Response to `POST /api/analyze`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    /// Unique job identifier
    pub job_id: String,

    /// "ready" when every source loaded, "warning" when some were skipped
    pub status: String,

    /// Sources that loaded
    pub sources: Vec<SourceInfo>,

    /// Sources that were skipped, with the reason
    pub failures: Vec<SourceFailure>,

    /// Plan output
    pub report: AnalysisReport,
}

impl AnalyzeResponse {
    pub fn new(load: LoadReport, report: AnalysisReport) -> Self {
        let status = if load.has_failures() { "warning" } else { "ready" };

        Self {
            job_id: Uuid::new_v4().to_string(),
            status: status.to_string(),
            sources: load.sources,
            failures: load.failures,
            report,
        }
    }
}

/// Health check body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            service: "rowscope".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "sources": [],
        "failures": [],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Analysis;
    use crate::transform::plan::AnalysisPlan;

    #[test]
    fn test_status_reflects_failures() {
        let mut analysis = Analysis::new();
        let report = analysis.run_plan(&AnalysisPlan::default());

        let mut load = LoadReport::default();
        let ok = AnalyzeResponse::new(load.clone(), report.clone());
        assert_eq!(ok.status, "ready");

        load.failures.push(SourceFailure {
            name: "bad.csv".into(),
            error: "Line 2: Expected 2 fields, found 3".into(),
        });
        let warn = AnalyzeResponse::new(load, report);
        assert_eq!(warn.status, "warning");
        assert_ne!(ok.job_id, warn.job_id);
    }

    #[test]
    fn test_error_response_shape() {
        let body = error_response("No file provided");
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "No file provided");
        assert!(body["jobId"].as_str().is_some_and(|id| !id.is_empty()));
    }
}
