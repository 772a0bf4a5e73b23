// 🧹 Coercion - Lenient readers for stored JSON fields
//
// Each returns None for anything absent, null, or malformed, so callers
// can fall back to a default instead of propagating a bad value.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};

/// Finite number, or a string that parses to one
pub fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

pub fn text(value: Option<&Value>) -> Option<String> {
    value?.as_str().map(str::to_string)
}

/// RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC)
pub fn timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    let raw = value?.as_str()?.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub fn object(value: Option<&Value>) -> Option<&Map<String, Value>> {
    value?.as_object()
}

pub fn array(value: Option<&Value>) -> Option<&Vec<Value>> {
    value?.as_array()
}

/// True when a key holds something other than null
pub fn is_present(value: Option<&Value>) -> bool {
    matches!(value, Some(v) if !v.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    #[test]
    fn test_number_accepts_finite_numbers_and_numeric_strings() {
        assert_eq!(number(Some(&json!(12.5))), Some(12.5));
        assert_eq!(number(Some(&json!(-3))), Some(-3.0));
        assert_eq!(number(Some(&json!(" 4000 "))), Some(4000.0));
    }

    #[test]
    fn test_number_rejects_everything_else() {
        assert_eq!(number(None), None);
        assert_eq!(number(Some(&Value::Null)), None);
        assert_eq!(number(Some(&json!("abc"))), None);
        assert_eq!(number(Some(&json!(""))), None);
        assert_eq!(number(Some(&json!("NaN"))), None);
        assert_eq!(number(Some(&json!("inf"))), None);
        assert_eq!(number(Some(&json!(true))), None);
        assert_eq!(number(Some(&json!({"value": 1}))), None);
    }

    #[test]
    fn test_timestamp_formats() {
        let full = timestamp(Some(&json!("2024-03-01T10:30:00Z"))).unwrap();
        assert_eq!(full.hour(), 10);

        let offset = timestamp(Some(&json!("2024-03-01T10:30:00-05:00"))).unwrap();
        assert_eq!(offset.hour(), 15);

        let date_only = timestamp(Some(&json!("2024-12-31"))).unwrap();
        assert_eq!(date_only.day(), 31);
        assert_eq!(date_only.hour(), 0);

        assert!(timestamp(Some(&json!("yesterday"))).is_none());
        assert!(timestamp(Some(&json!(1700000000))).is_none());
    }

    #[test]
    fn test_is_present() {
        assert!(is_present(Some(&json!(0))));
        assert!(!is_present(Some(&Value::Null)));
        assert!(!is_present(None));
    }
}
