//! Analysis plan definition.
//!
//! A plan is the JSON form of a pipeline run: an ordered list of transform
//! steps followed by the views to compute over the result. Steps always run
//! in the order written; nothing is reordered.

use serde::{Deserialize, Serialize};

use super::pipeline::Pipeline;
use crate::error::{PlanError, PlanResult};

/// One transform step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Step {
    /// Keep rows where every column is present and non-empty
    Filter { columns: Vec<String> },

    /// Keep only the listed columns on every row
    Pluck { columns: Vec<String> },

    /// Keep the first row per composite key
    #[serde(alias = "dedupe")]
    Deduplicate { columns: Vec<String> },
}

impl Step {
    /// Apply this step to a pipeline
    pub fn apply(&self, pipeline: &mut Pipeline) {
        match self {
            Step::Filter { columns } => pipeline.filter(columns),
            Step::Pluck { columns } => pipeline.pluck(columns),
            Step::Deduplicate { columns } => pipeline.deduplicate(columns),
        };
    }

    pub fn columns(&self) -> &[String] {
        match self {
            Step::Filter { columns } | Step::Pluck { columns } | Step::Deduplicate { columns } => {
                columns
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Step::Filter { .. } => "filter",
            Step::Pluck { .. } => "pluck",
            Step::Deduplicate { .. } => "deduplicate",
        }
    }
}

/// A complete run: steps, then requested views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisPlan {
    /// Transform steps, applied in order
    #[serde(default)]
    pub steps: Vec<Step>,

    /// Group by one column, or by the pipe-joined values of several
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<Vec<String>>,

    /// Partition into true / false / undefined on this column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by_boolean: Option<String>,

    /// Bucket rows by days since the date in this column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_column: Option<String>,

    /// Tally true / false values of this column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boolean_column: Option<String>,

    /// Include the transformed rows in the report
    #[serde(default = "default_include_records")]
    pub include_records: bool,
}

fn default_include_records() -> bool {
    true
}

impl Default for AnalysisPlan {
    fn default() -> Self {
        Self {
            steps: Vec::new(),
            group_by: None,
            group_by_boolean: None,
            date_column: None,
            boolean_column: None,
            include_records: default_include_records(),
        }
    }
}

impl AnalysisPlan {
    /// Parse a plan from JSON
    pub fn from_json(json: &str) -> PlanResult<Self> {
        let plan: Self = serde_json::from_str(json)?;
        plan.validate()?;
        Ok(plan)
    }

    /// Serialize the plan to pretty JSON
    pub fn to_json(&self) -> PlanResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject shapes that cannot produce a view.
    pub fn validate(&self) -> PlanResult<()> {
        if self.group_by.as_ref().is_some_and(Vec::is_empty) {
            return Err(PlanError::EmptyColumns("groupBy".to_string()));
        }
        Ok(())
    }

    /// Whether the plan asks for anything besides the transformed rows.
    pub fn has_views(&self) -> bool {
        self.group_by.is_some()
            || self.group_by_boolean.is_some()
            || self.date_column.is_some()
            || self.boolean_column.is_some()
    }
}

/// Example plan used by `rowscope example-plan`
pub fn example_plan() -> AnalysisPlan {
    AnalysisPlan {
        steps: vec![
            Step::Filter {
                columns: vec!["id".to_string()],
            },
            Step::Pluck {
                columns: vec![
                    "id".to_string(),
                    "team".to_string(),
                    "done".to_string(),
                    "created".to_string(),
                ],
            },
            Step::Deduplicate {
                columns: vec!["id".to_string()],
            },
        ],
        group_by: Some(vec!["team".to_string()]),
        group_by_boolean: Some("done".to_string()),
        date_column: Some("created".to_string()),
        boolean_column: Some("done".to_string()),
        include_records: false,
    }
}

/// Markdown description of steps and views
pub fn steps_description() -> String {
    r#"Available pipeline steps (applied in order):

| Step | Description | Parameters |
|------|-------------|------------|
| filter | Keep rows where every column is present and not empty | columns: list of column names |
| pluck | Keep only the listed columns (missing ones are omitted) | columns: list of column names |
| deduplicate | Keep the first row per pipe-joined key (alias: dedupe) | columns: list of column names |

Available views (computed on the rows left after the steps):

| Field | Description |
|-------|-------------|
| groupBy | One column: group by its value. Several: group by "a|b|..." |
| groupByBoolean | Partition into true / false / undefined |
| dateColumn | Bucket by "<N> days since", first row kept as sample |
| booleanColumn | True / false counts and true percentage |
| includeRecords | Include the transformed rows (default true) |

Example plan in JSON:
{
  "steps": [
    {"type": "filter", "columns": ["id"]},
    {"type": "pluck", "columns": ["id", "done", "created"]},
    {"type": "dedupe", "columns": ["id"]}
  ],
  "dateColumn": "created",
  "booleanColumn": "done"
}"#
    .to_string()
}
