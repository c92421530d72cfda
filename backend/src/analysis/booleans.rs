//! True/false tallies over a boolean-like column.

use serde::Serialize;

use crate::models::Record;
use crate::transform::boolean::normalize_boolean;

/// Counts for a boolean column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BooleanSummary {
    /// Records classified as true or false.
    pub total: usize,
    pub true_count: usize,
    pub false_count: usize,
    /// `true_count / total * 100`, two decimals. `0.0` when `total` is zero.
    pub true_percentage: f64,
}

/// Classified records per bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BooleanDetails {
    #[serde(rename = "true")]
    pub truthy: Vec<Record>,
    #[serde(rename = "false")]
    pub falsy: Vec<Record>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BooleanAnalysis {
    pub summary: BooleanSummary,
    pub details: BooleanDetails,
}

/// Round to two decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Share of `part` in `total` as a percentage, `0.0` for an empty total.
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(part as f64 / total as f64 * 100.0)
}

/// Tally `column` over `records`.
///
/// Only rows where the value normalizes to true or false are counted; absent
/// and unrecognized values are dropped from both buckets. Use
/// [`crate::transform::grouper::group_by_key_boolean`] to keep them.
pub fn analyze_boolean_column(records: &[Record], column: &str) -> BooleanAnalysis {
    let mut details = BooleanDetails::default();

    for record in records {
        match record.get(column).and_then(normalize_boolean) {
            Some(true) => details.truthy.push(record.clone()),
            Some(false) => details.falsy.push(record.clone()),
            None => {}
        }
    }

    let true_count = details.truthy.len();
    let false_count = details.falsy.len();
    let total = true_count + false_count;

    BooleanAnalysis {
        summary: BooleanSummary {
            total,
            true_count,
            false_count,
            true_percentage: percentage(true_count, total),
        },
        details,
    }
}
