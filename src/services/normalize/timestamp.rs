//! Timestamp resolution across heterogeneous time encodings.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Epoch values above this magnitude are milliseconds, below it seconds.
const EPOCH_MILLIS_CUTOFF: f64 = 1e12;

/// Resolve a raw JSON value into an absolute UTC time.
///
/// Accepts numeric or numeric-string epoch values (milliseconds when the
/// magnitude exceeds 1e12, seconds otherwise) and ISO-8601 strings. A
/// trailing `Z` reads as +00:00; strings without any offset are assumed
/// UTC. Anything unparseable resolves to `None`, never an error: callers
/// treat a missing time as "no timestamp available".
pub fn resolve_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_f64().and_then(from_epoch),
        Value::String(s) => resolve_str(s),
        _ => None,
    }
}

fn resolve_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    // Numeric strings are epoch values.
    if s.chars()
        .all(|c| c.is_ascii_digit() || c == '.' || c == '-' || c == '+')
    {
        if let Ok(n) = s.parse::<f64>() {
            return from_epoch(n);
        }
    }

    // Offset-carrying ISO-8601 (a trailing Z parses as +00:00).
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // Offset-less forms are assumed UTC.
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }

    None
}

fn from_epoch(n: f64) -> Option<DateTime<Utc>> {
    if !n.is_finite() {
        return None;
    }
    let millis = if n.abs() > EPOCH_MILLIS_CUTOFF {
        n
    } else {
        n * 1000.0
    };
    DateTime::from_timestamp_millis(millis as i64)
}

/// Resolve the first parseable value among a node's candidate time fields.
pub fn resolve_first(node: &Value, keys: &[&str]) -> Option<DateTime<Utc>> {
    keys.iter()
        .filter_map(|k| node.get(k))
        .find_map(resolve_timestamp)
}
