//! Boolean normalization shared by grouping and analysis.

use serde_json::Value;

/// Spellings accepted as `true` (after trim + lowercase).
pub const TRUE_VALUES: [&str; 4] = ["true", "1", "yes", "on"];

/// Spellings accepted as `false` (after trim + lowercase).
pub const FALSE_VALUES: [&str; 4] = ["false", "0", "no", "off"];

/// Map a cell to `Some(true)`, `Some(false)` or `None` when unrecognized.
///
/// Native booleans are stringified first, text is trimmed and lower-cased.
/// Numbers, null, arrays and objects are never recognized.
pub fn normalize_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => normalize_boolean_str(&b.to_string()),
        Value::String(s) => normalize_boolean_str(s),
        _ => None,
    }
}

/// Text form of [`normalize_boolean`].
pub fn normalize_boolean_str(raw: &str) -> Option<bool> {
    let normalized = raw.trim().to_lowercase();
    if TRUE_VALUES.contains(&normalized.as_str()) {
        Some(true)
    } else if FALSE_VALUES.contains(&normalized.as_str()) {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_known_spellings() {
        assert_eq!(normalize_boolean(&json!("TRUE")), Some(true));
        assert_eq!(normalize_boolean(&json!("0")), Some(false));
        assert_eq!(normalize_boolean(&json!(" Yes ")), Some(true));
        assert_eq!(normalize_boolean(&json!("off")), Some(false));
        assert_eq!(normalize_boolean(&json!("On")), Some(true));
        assert_eq!(normalize_boolean(&json!("NO")), Some(false));
    }

    #[test]
    fn test_native_booleans() {
        assert_eq!(normalize_boolean(&json!(true)), Some(true));
        assert_eq!(normalize_boolean(&json!(false)), Some(false));
    }

    #[test]
    fn test_unrecognized() {
        assert_eq!(normalize_boolean(&json!("maybe")), None);
        assert_eq!(normalize_boolean(&json!("")), None);
        assert_eq!(normalize_boolean(&json!(1)), None);
        assert_eq!(normalize_boolean(&Value::Null), None);
        assert_eq!(normalize_boolean(&json!(["true"])), None);
    }
}
