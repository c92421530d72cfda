//! Domain models for the rowscope pipeline.
//!
//! - [`Record`] - one row, column name to cell value, in header order
//! - [`RecordSet`] - the ordered rows held by a pipeline
//! - [`GroupMap`] - groups keyed by value, in first-appearance order
//! - [`BooleanGroups`] - the three-way `true` / `false` / `undefined` partition
//!
//! Cells are `serde_json::Value`s so rows move straight to and from JSON.
//! The reader only ever produces `Value::String`; `Value::Null` and a missing
//! key both mean the cell is absent.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::HashMap;

/// One row of tabular data.
pub type Record = Map<String, Value>;

/// Separator used when several column values form one key.
pub const KEY_SEPARATOR: &str = "|";

/// Group key used by single-column grouping when the column is absent.
pub const MISSING_KEY: &str = "undefined";

// =============================================================================
// Cell access
// =============================================================================

/// Text of a cell, or `None` when the column is absent or null.
///
/// Booleans and numbers are rendered with their JSON spelling. Arrays and
/// objects only appear through the JSON API and are rendered as compact JSON.
pub fn cell_text<'a>(record: &'a Record, column: &str) -> Option<Cow<'a, str>> {
    match record.get(column)? {
        Value::Null => None,
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        other => Some(Cow::Owned(other.to_string())),
    }
}

/// Whether a cell is present and not null.
pub fn has_cell(record: &Record, column: &str) -> bool {
    record.get(column).is_some_and(|v| !v.is_null())
}

/// Pipe-joined key over several columns; absent cells contribute `""`.
pub fn composite_key(record: &Record, columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| cell_text(record, c).unwrap_or(Cow::Borrowed("")))
        .collect::<Vec<_>>()
        .join(KEY_SEPARATOR)
}

// =============================================================================
// Record Set
// =============================================================================

/// Ordered sequence of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordSet {
    records: Vec<Record>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn as_slice(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Append rows at the end, keeping their order.
    pub fn extend(&mut self, records: impl IntoIterator<Item = Record>) {
        self.records.extend(records);
    }

    /// Column names of the first record. The shape of later rows is assumed,
    /// not checked.
    pub fn columns(&self) -> Vec<String> {
        self.records
            .first()
            .map(|r| r.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Keep only records matching `keep`, in order.
    pub(crate) fn retain(&mut self, keep: impl FnMut(&Record) -> bool) {
        self.records.retain(keep);
    }

    /// Replace every record with the output of `reshape`, in order.
    pub(crate) fn reshape(&mut self, reshape: impl FnMut(&Record) -> Record) {
        self.records = self.records.iter().map(reshape).collect();
    }

    pub fn into_vec(self) -> Vec<Record> {
        self.records
    }
}

impl From<Vec<Record>> for RecordSet {
    fn from(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

// =============================================================================
// Groups
// =============================================================================

/// Records partitioned by key, keys kept in first-appearance order.
///
/// Serializes as a JSON object whose members follow that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupMap {
    groups: Vec<(String, Vec<Record>)>,
    index: HashMap<String, usize>,
}

impl GroupMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to the group for `key`, creating it if needed.
    pub fn push(&mut self, key: String, record: Record) {
        match self.index.get(&key) {
            Some(&i) => self.groups[i].1.push(record),
            None => {
                self.index.insert(key.clone(), self.groups.len());
                self.groups.push((key, vec![record]));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&[Record]> {
        self.index.get(key).map(|&i| self.groups[i].1.as_slice())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Record])> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of records across all groups.
    pub fn record_count(&self) -> usize {
        self.groups.iter().map(|(_, v)| v.len()).sum()
    }
}

impl Serialize for GroupMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for (key, records) in &self.groups {
            map.serialize_entry(key, records)?;
        }
        map.end()
    }
}

/// Three-way boolean partition. Every input record lands in exactly one
/// bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BooleanGroups {
    #[serde(rename = "true")]
    pub truthy: Vec<Record>,
    #[serde(rename = "false")]
    pub falsy: Vec<Record>,
    pub undefined: Vec<Record>,
}

impl BooleanGroups {
    pub fn total(&self) -> usize {
        self.truthy.len() + self.falsy.len() + self.undefined.len()
    }
}
