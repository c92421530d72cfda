//! In-place transform pipeline over an owned record set.
//!
//! A [`Pipeline`] holds the current rows exclusively. `filter`, `pluck` and
//! `deduplicate` mutate them in the order the caller applies them and return
//! `&mut Self` so calls chain:
//!
//! ```rust,ignore
//! use rowscope::Pipeline;
//!
//! let mut pipeline = Pipeline::new(records);
//! pipeline
//!     .filter(&["id".into()])
//!     .pluck(&["id".into(), "done".into()])
//!     .deduplicate(&["id".into()]);
//! println!("{} rows left", pipeline.len());
//! ```
//!
//! None of the operations fail. Unknown columns drop rows (filter), are
//! omitted (pluck) or contribute an empty key part (deduplicate).

use std::collections::HashSet;

use crate::api::logs::log_info;
use crate::models::{cell_text, composite_key, has_cell, Record, RecordSet};

/// Owned, ordered record buffer with chainable transforms.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    records: RecordSet,
}

impl Pipeline {
    pub fn new(records: impl Into<RecordSet>) -> Self {
        Self {
            records: records.into(),
        }
    }

    /// Append rows after the current ones.
    pub fn append(&mut self, records: Vec<Record>) {
        self.records.extend(records);
    }

    /// Keep records where every column is present and not empty text.
    ///
    /// An empty column list keeps everything.
    pub fn filter(&mut self, columns: &[String]) -> &mut Self {
        if columns.is_empty() {
            return self;
        }

        let before = self.records.len();
        self.records.retain(|record| {
            columns
                .iter()
                .all(|c| cell_text(record, c).is_some_and(|v| !v.is_empty()))
        });
        log_info(format!(
            "filter [{}]: {} → {} rows",
            columns.join(", "),
            before,
            self.records.len()
        ));
        self
    }

    /// Reshape every record to the listed columns that exist on it, in list
    /// order. Columns missing from a record are left out, not filled.
    pub fn pluck(&mut self, columns: &[String]) -> &mut Self {
        self.records.reshape(|record| {
            let mut shaped = Record::new();
            for column in columns {
                if let Some(value) = record.get(column) {
                    shaped.insert(column.clone(), value.clone());
                }
            }
            shaped
        });
        log_info(format!(
            "pluck [{}]: {} rows",
            columns.join(", "),
            self.records.len()
        ));
        self
    }

    /// Keep the first record for each pipe-joined key over `columns`.
    ///
    /// An empty column list keeps everything.
    pub fn deduplicate(&mut self, columns: &[String]) -> &mut Self {
        if columns.is_empty() {
            return self;
        }

        let before = self.records.len();
        let mut seen = HashSet::new();
        self.records
            .retain(|record| seen.insert(composite_key(record, columns)));
        log_info(format!(
            "deduplicate [{}]: {} → {} rows",
            columns.join(", "),
            before,
            self.records.len()
        ));
        self
    }

    /// Current records, in order.
    pub fn records(&self) -> &[Record] {
        self.records.as_slice()
    }

    pub fn record_set(&self) -> &RecordSet {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Column names of the first record.
    pub fn columns(&self) -> Vec<String> {
        self.records.columns()
    }

    /// Number of records carrying a non-null value for `column`.
    pub fn count_present(&self, column: &str) -> usize {
        self.records.iter().filter(|r| has_cell(r, column)).count()
    }

    pub fn into_records(self) -> RecordSet {
        self.records
    }
}
