//! Group records by column values.
//!
//! All functions read a snapshot and build fresh groups; the input is never
//! modified, so calling them twice over the same rows gives the same result.
//!
//! ```text
//! rows                         group_by_key("team")
//! ┌────────────────────────┐   ┌──────────────────────────┐
//! │ id: 1, team: red       │   │ red:       [id 1, id 3]  │
//! │ id: 2, team: blue      │ → │ blue:      [id 2]        │
//! │ id: 3, team: red       │   │ undefined: [id 4]        │
//! │ id: 4                  │   └──────────────────────────┘
//! └────────────────────────┘
//! ```

use crate::models::{cell_text, composite_key, BooleanGroups, GroupMap, Record, MISSING_KEY};
use crate::transform::boolean::normalize_boolean;

/// Group by the value of one column. Absent cells go to `"undefined"`.
pub fn group_by_key(records: &[Record], key: &str) -> GroupMap {
    let mut groups = GroupMap::new();

    for record in records {
        let group = cell_text(record, key)
            .map(|v| v.into_owned())
            .unwrap_or_else(|| MISSING_KEY.to_string());
        groups.push(group, record.clone());
    }

    groups
}

/// Group by the pipe-joined values of several columns, in the given order.
pub fn group_by_keys(records: &[Record], keys: &[String]) -> GroupMap {
    let mut groups = GroupMap::new();

    for record in records {
        groups.push(composite_key(record, keys), record.clone());
    }

    groups
}

/// Partition into `true`, `false` and `undefined` by normalizing one column.
///
/// Unlike the boolean analysis, unrecognized and absent values are kept in
/// the `undefined` bucket.
pub fn group_by_key_boolean(records: &[Record], key: &str) -> BooleanGroups {
    let mut groups = BooleanGroups::default();

    for record in records {
        let bucket = match record.get(key).and_then(normalize_boolean) {
            Some(true) => &mut groups.truthy,
            Some(false) => &mut groups.falsy,
            None => &mut groups.undefined,
        };
        bucket.push(record.clone());
    }

    groups
}
