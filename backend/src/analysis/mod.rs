//! Analysis facade: load sources, transform, group and analyze.
//!
//! [`Analysis`] owns one [`Pipeline`] and drives the whole run:
//!
//! ```text
//! ┌──────────┐   ┌──────────────────────────┐   ┌─────────────────────────┐
//! │  load()  │──▶│ filter → pluck → dedupe  │──▶│ group / dates / booleans│
//! │ (files)  │   │   (in place, in order)   │   │   (read-only snapshots) │
//! └──────────┘   └──────────────────────────┘   └─────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use rowscope::Analysis;
//!
//! let mut analysis = Analysis::new();
//! let report = analysis.load(&["a.csv", "b.csv"]);
//! analysis
//!     .filter(&["id".into()])
//!     .deduplicate(&["id".into()]);
//! let buckets = analysis.analyze_date_column("created");
//! ```
//!
//! Sources are appended in the order given. A source that cannot be read is
//! skipped with a warning and reported in [`LoadReport::failures`]; the other
//! sources still load.

pub mod booleans;
pub mod dates;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::api::logs::{log_info, log_info_indent, log_success, log_warning, log_warning_indent};
use crate::models::{BooleanGroups, GroupMap, Record, RecordSet};
use crate::parser::{parse_bytes_auto, parse_csv_file_auto, CsvError, ParseResult};
use crate::transform::grouper;
use crate::transform::pipeline::Pipeline;
use crate::transform::plan::AnalysisPlan;

pub use booleans::{analyze_boolean_column, BooleanAnalysis, BooleanDetails, BooleanSummary};
pub use dates::{analyze_date_column, parse_date, DateBucket};

/// A source that loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo {
    pub name: String,
    pub encoding: String,
    pub delimiter: String,
    pub row_count: usize,
    pub columns: Vec<String>,
}

/// A source that was skipped.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFailure {
    pub name: String,
    pub error: String,
}

/// Outcome of loading several sources.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    pub sources: Vec<SourceInfo>,
    pub failures: Vec<SourceFailure>,
    /// Rows held after loading.
    pub row_count: usize,
}

impl LoadReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Rows left after one plan step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepSummary {
    pub step: String,
    pub columns: Vec<String>,
    pub rows_after: usize,
}

/// Everything a plan asked for.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub row_count: usize,
    pub columns: Vec<String>,
    pub steps: Vec<StepSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<RecordSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<GroupMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boolean_groups: Option<BooleanGroups>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_buckets: Option<Vec<DateBucket>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boolean_analysis: Option<BooleanAnalysis>,
}

/// One analysis run over an exclusively owned record set.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pipeline: Pipeline,
}

impl Analysis {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from rows that are already in memory.
    pub fn from_records(records: Vec<Record>) -> Self {
        Self {
            pipeline: Pipeline::new(records),
        }
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Read files one after another and append their rows in path order.
    pub fn load<P: AsRef<Path>>(&mut self, paths: &[P]) -> LoadReport {
        let mut report = LoadReport::default();

        for path in paths {
            let path = path.as_ref();
            log_info(format!("📖 Reading {}", path.display()));
            self.absorb(&mut report, path.display().to_string(), parse_csv_file_auto(path));
        }

        report.row_count = self.row_count();
        report
    }

    /// Read files in parallel on the blocking pool.
    ///
    /// Rows are still appended in path order, whatever order the reads
    /// finish in.
    pub async fn load_concurrent(&mut self, paths: &[PathBuf]) -> LoadReport {
        log_info(format!("📖 Reading {} sources in parallel", paths.len()));

        let reads = paths.iter().cloned().map(|path| {
            tokio::task::spawn_blocking(move || parse_csv_file_auto(&path))
        });
        let results = futures::future::join_all(reads).await;

        let mut report = LoadReport::default();
        for (path, joined) in paths.iter().zip(results) {
            let result = joined
                .unwrap_or_else(|e| Err(CsvError::new(0, format!("Reader task failed: {}", e))));
            self.absorb(&mut report, path.display().to_string(), result);
        }

        report.row_count = self.row_count();
        report
    }

    /// Parse in-memory sources and append their rows in order.
    pub fn load_sources(&mut self, sources: &[(String, Vec<u8>)]) -> LoadReport {
        let mut report = LoadReport::default();

        for (name, bytes) in sources {
            log_info(format!("📖 Reading {} ({} bytes)", name, bytes.len()));
            self.absorb(&mut report, name.clone(), parse_bytes_auto(bytes));
        }

        report.row_count = self.row_count();
        report
    }

    /// Parse one in-memory source and append its rows.
    ///
    /// Unlike [`Analysis::load`], the error is returned to the caller.
    pub fn load_bytes(&mut self, name: &str, bytes: &[u8]) -> Result<SourceInfo, CsvError> {
        let parsed = parse_bytes_auto(bytes)?;
        Ok(self.append_parsed(name.to_string(), parsed))
    }

    fn absorb(
        &mut self,
        report: &mut LoadReport,
        name: String,
        result: Result<ParseResult, CsvError>,
    ) {
        match result {
            Ok(parsed) => {
                let info = self.append_parsed(name, parsed);
                report.sources.push(info);
            }
            Err(e) => {
                log_warning(format!("Skipping {}", name));
                log_warning_indent(e.to_string(), 1);
                report.failures.push(SourceFailure {
                    name,
                    error: e.to_string(),
                });
            }
        }
    }

    fn append_parsed(&mut self, name: String, parsed: ParseResult) -> SourceInfo {
        log_success(format!(
            "{}: {} rows (encoding {}, delimiter '{}')",
            name,
            parsed.records.len(),
            parsed.encoding,
            format_delimiter(parsed.delimiter)
        ));
        log_info_indent(format!("Columns: {}", parsed.headers.join(", ")), 1);

        let info = SourceInfo {
            name,
            encoding: parsed.encoding,
            delimiter: format_delimiter(parsed.delimiter).to_string(),
            row_count: parsed.records.len(),
            columns: parsed.headers,
        };
        self.pipeline.append(parsed.records);
        info
    }

    // =========================================================================
    // Transforms
    // =========================================================================

    pub fn filter(&mut self, columns: &[String]) -> &mut Self {
        self.pipeline.filter(columns);
        self
    }

    pub fn pluck(&mut self, columns: &[String]) -> &mut Self {
        self.pipeline.pluck(columns);
        self
    }

    pub fn deduplicate(&mut self, columns: &[String]) -> &mut Self {
        self.pipeline.deduplicate(columns);
        self
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Days-since buckets relative to the current time.
    pub fn analyze_date_column(&self, column: &str) -> Vec<DateBucket> {
        self.analyze_date_column_at(column, Utc::now())
    }

    pub fn analyze_date_column_at(&self, column: &str, now: DateTime<Utc>) -> Vec<DateBucket> {
        dates::analyze_date_column(self.pipeline.records(), column, now)
    }

    pub fn analyze_boolean_column(&self, column: &str) -> BooleanAnalysis {
        booleans::analyze_boolean_column(self.pipeline.records(), column)
    }

    pub fn group_by_key(&self, key: &str) -> GroupMap {
        grouper::group_by_key(self.pipeline.records(), key)
    }

    pub fn group_by_keys(&self, keys: &[String]) -> GroupMap {
        grouper::group_by_keys(self.pipeline.records(), keys)
    }

    pub fn group_by_key_boolean(&self, key: &str) -> BooleanGroups {
        grouper::group_by_key_boolean(self.pipeline.records(), key)
    }

    pub fn row_count(&self) -> usize {
        self.pipeline.len()
    }

    /// Column names of the first record.
    pub fn columns(&self) -> Vec<String> {
        self.pipeline.columns()
    }

    pub fn records(&self) -> &[Record] {
        self.pipeline.records()
    }

    pub fn record_set(&self) -> &RecordSet {
        self.pipeline.record_set()
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    // =========================================================================
    // Plans
    // =========================================================================

    /// Apply the plan's steps in order, then compute the views it asks for.
    pub fn run_plan(&mut self, plan: &AnalysisPlan) -> AnalysisReport {
        self.run_plan_at(plan, Utc::now())
    }

    pub fn run_plan_at(&mut self, plan: &AnalysisPlan, now: DateTime<Utc>) -> AnalysisReport {
        log_info(format!("⚙️  Applying {} steps to {} rows", plan.steps.len(), self.row_count()));

        let mut steps = Vec::with_capacity(plan.steps.len());
        for step in &plan.steps {
            step.apply(&mut self.pipeline);
            steps.push(StepSummary {
                step: step.name().to_string(),
                columns: step.columns().to_vec(),
                rows_after: self.row_count(),
            });
        }

        let groups = plan.group_by.as_ref().map(|keys| match keys.as_slice() {
            [single] => self.group_by_key(single),
            _ => self.group_by_keys(keys),
        });
        if let Some(groups) = &groups {
            log_success(format!("{} groups", groups.len()));
        }

        let boolean_groups = plan
            .group_by_boolean
            .as_deref()
            .map(|key| self.group_by_key_boolean(key));

        let date_buckets = plan
            .date_column
            .as_deref()
            .map(|column| self.analyze_date_column_at(column, now));
        if let Some(buckets) = &date_buckets {
            log_success(format!("{} date buckets", buckets.len()));
        }

        let boolean_analysis = plan
            .boolean_column
            .as_deref()
            .map(|column| self.analyze_boolean_column(column));
        if let Some(analysis) = &boolean_analysis {
            log_success(format!(
                "{} of {} true ({}%)",
                analysis.summary.true_count, analysis.summary.total, analysis.summary.true_percentage
            ));
        }

        AnalysisReport {
            row_count: self.row_count(),
            columns: self.columns(),
            steps,
            records: plan.include_records.then(|| self.record_set().clone()),
            groups,
            boolean_groups,
            date_buckets,
            boolean_analysis,
        }
    }
}

/// Printable delimiter
pub fn format_delimiter(d: char) -> &'static str {
    match d {
        ';' => ";",
        ',' => ",",
        '\t' => "\\t",
        '|' => "|",
        _ => "?",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::plan::Step;
    use chrono::TimeZone;
    use serde_json::{json, Value};
    use std::fs;
    use tempfile::tempdir;

    fn records(values: Vec<Value>) -> Vec<Record> {
        values
            .into_iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_load_keeps_file_order_and_skips_bad_files() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("first.csv");
        let broken = dir.path().join("broken.csv");
        let second = dir.path().join("second.csv");
        fs::write(&first, "id,name\n1,a\n2,b\n").unwrap();
        fs::write(&broken, "id,name\n1,a,extra\n").unwrap();
        fs::write(&second, "id;name\n3;c\n").unwrap();
        let missing = dir.path().join("missing.csv");

        let mut analysis = Analysis::new();
        let report = analysis.load(&[&first, &broken, &missing, &second]);

        assert_eq!(report.row_count, 3);
        assert_eq!(report.sources.len(), 2);
        assert_eq!(report.failures.len(), 2);
        assert!(report.failures[0].name.ends_with("broken.csv"));
        assert!(report.has_failures());

        let ids: Vec<&str> = analysis.records().iter().filter_map(|r| r["id"].as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(analysis.columns(), vec!["id", "name"]);
    }

    #[tokio::test]
    async fn test_load_concurrent_keeps_file_order() {
        let dir = tempdir().unwrap();
        let mut paths = Vec::new();
        for i in 0..6 {
            let path = dir.path().join(format!("part{}.csv", i));
            let rows: String = (0..50).map(|r| format!("{}-{}\n", i, r)).collect();
            fs::write(&path, format!("key\n{}", rows)).unwrap();
            paths.push(path);
        }

        let mut analysis = Analysis::new();
        let report = analysis.load_concurrent(&paths).await;

        assert_eq!(report.row_count, 300);
        let keys: Vec<&str> = analysis.records().iter().filter_map(|r| r["key"].as_str()).collect();
        let expected: Vec<String> = (0..6)
            .flat_map(|i| (0..50).map(move |r| format!("{}-{}", i, r)))
            .collect();
        assert_eq!(keys, expected);
    }

    #[test]
    fn test_load_sources_continues_after_failure() {
        let mut analysis = Analysis::new();
        let report = analysis.load_sources(&[
            ("a.csv".to_string(), b"id\n1\n".to_vec()),
            ("bad.csv".to_string(), Vec::new()),
            ("b.csv".to_string(), b"id\n2\n".to_vec()),
        ]);

        assert_eq!(report.row_count, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].name, "bad.csv");
        assert!(report.failures[0].error.contains("Empty"));
    }

    #[test]
    fn test_load_bytes_returns_error() {
        let mut analysis = Analysis::new();
        assert!(analysis.load_bytes("empty.csv", b"").is_err());

        let info = analysis.load_bytes("ok.csv", b"id,done\n1,yes\n").unwrap();
        assert_eq!(info.row_count, 1);
        assert_eq!(info.delimiter, ",");
        assert_eq!(analysis.row_count(), 1);
    }

    #[test]
    fn test_facade_chain_and_views() {
        let mut analysis = Analysis::from_records(records(vec![
            json!({"id": "1", "team": "red", "done": "yes"}),
            json!({"id": "1", "team": "red", "done": "no"}),
            json!({"id": "2", "team": "", "done": "no"}),
            json!({"id": "3", "team": "blue", "done": "maybe"}),
        ]));

        analysis.filter(&cols(&["team"])).deduplicate(&cols(&["id"]));

        assert_eq!(analysis.row_count(), 2);
        let groups = analysis.group_by_key("team");
        assert_eq!(groups.keys().collect::<Vec<_>>(), vec!["red", "blue"]);

        let booleans = analysis.analyze_boolean_column("done");
        assert_eq!(booleans.summary.total, 1);
        assert_eq!(booleans.summary.true_percentage, 100.0);

        let partition = analysis.group_by_key_boolean("done");
        assert_eq!(partition.undefined.len(), 1);

        // views never mutate
        assert_eq!(analysis.row_count(), 2);
    }

    #[test]
    fn test_run_plan() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();
        let mut analysis = Analysis::from_records(records(vec![
            json!({"id": "1", "team": "red", "created": "2024-03-05", "x": "drop"}),
            json!({"id": "1", "team": "red", "created": "2024-03-01", "x": "drop"}),
            json!({"id": "2", "team": "blue", "created": "2024-03-05", "x": "drop"}),
        ]));
        let plan = AnalysisPlan {
            steps: vec![
                Step::Deduplicate { columns: cols(&["id"]) },
                Step::Pluck { columns: cols(&["id", "team", "created"]) },
            ],
            group_by: Some(cols(&["team", "id"])),
            date_column: Some("created".to_string()),
            ..AnalysisPlan::default()
        };

        let report = analysis.run_plan_at(&plan, now);

        assert_eq!(report.row_count, 2);
        assert_eq!(report.columns, vec!["id", "team", "created"]);
        assert_eq!(report.steps[0].rows_after, 2);
        assert_eq!(report.steps[1].step, "pluck");

        let groups = report.groups.as_ref().unwrap();
        assert_eq!(groups.keys().collect::<Vec<_>>(), vec!["red|1", "blue|2"]);

        let buckets = report.date_buckets.as_ref().unwrap();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].category, "10 days since");
        assert_eq!(buckets[0].count, 2);

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("booleanAnalysis").is_none());
        assert_eq!(json["records"].as_array().map(Vec::len), Some(2));
    }
}
