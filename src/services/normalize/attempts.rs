//! Attempt reconciliation across runner retry shapes.

use serde_json::Value;

use crate::models::Attempt;

use super::status::normalize_status;
use super::timestamp::resolve_first;

/// Attempt-array keys in priority order. The first non-empty array wins
/// exclusively; sources are never merged.
const ATTEMPT_KEYS: [&str; 3] = ["retries", "attempts", "results"];

/// Candidate start-time fields on an attempt or test node.
const TIME_KEYS: [&str; 3] = ["startTime", "start_time", "startedAt"];

/// Extract the ordered attempt sequence for one raw test node.
///
/// When no attempt-array field is present at all, a single attempt is
/// synthesized from the test node's own status/duration/error fields, so
/// every test yields at least one attempt.
pub fn reconcile_attempts(test: &Value) -> Vec<Attempt> {
    for key in ATTEMPT_KEYS {
        if let Some(arr) = test.get(key).and_then(Value::as_array) {
            if !arr.is_empty() {
                return arr.iter().map(|raw| attempt_from(raw, Some(test))).collect();
            }
        }
    }

    vec![attempt_from(test, None)]
}

/// Build one attempt from a raw element, falling back to the enclosing
/// test node's status when the element has none.
fn attempt_from(raw: &Value, enclosing_test: Option<&Value>) -> Attempt {
    let status_str = status_field(raw)
        .or_else(|| enclosing_test.and_then(status_field));
    let status = normalize_status(status_str);

    Attempt::new(
        status,
        duration_ms(raw),
        errors_of(raw),
        resolve_first(raw, &TIME_KEYS),
    )
}

fn status_field(node: &Value) -> Option<&str> {
    node.get("status")
        .or_else(|| node.get("outcome"))
        .and_then(Value::as_str)
}

fn duration_ms(node: &Value) -> Option<i64> {
    node.get("duration")
        .or_else(|| node.get("durationMs"))
        .and_then(Value::as_i64)
        .filter(|d| *d >= 0)
}

fn errors_of(node: &Value) -> Vec<Value> {
    if let Some(arr) = node.get("errors").and_then(Value::as_array) {
        return arr.clone();
    }
    match node.get("error") {
        Some(Value::Null) | None => Vec::new(),
        Some(single) => vec![single.clone()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TestStatus;
    use serde_json::json;

    #[test]
    fn test_retries_win_over_results() {
        let test = json!({
            "retries": [{"status": "failed"}, {"status": "passed"}],
            "results": [{"status": "skipped"}]
        });

        let attempts = reconcile_attempts(&test);
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].status, TestStatus::Failed);
        assert_eq!(attempts[1].status, TestStatus::Passed);
    }

    #[test]
    fn test_empty_priority_source_falls_through() {
        let test = json!({
            "retries": [],
            "attempts": [{"outcome": "timedOut"}]
        });

        let attempts = reconcile_attempts(&test);
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].status, TestStatus::TimedOut);
    }

    #[test]
    fn test_element_status_falls_back_to_test_node() {
        let test = json!({
            "status": "passed",
            "results": [{"duration": 42}]
        });

        let attempts = reconcile_attempts(&test);
        assert_eq!(attempts[0].status, TestStatus::Passed);
        assert_eq!(attempts[0].duration_ms, Some(42));
    }

    #[test]
    fn test_synthesized_attempt_from_bare_test() {
        let test = json!({
            "status": "failed",
            "durationMs": 900,
            "error": {"message": "boom"}
        });

        let attempts = reconcile_attempts(&test);
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].status, TestStatus::Failed);
        assert_eq!(attempts[0].duration_ms, Some(900));
        assert_eq!(attempts[0].errors.len(), 1);
    }

    #[test]
    fn test_statusless_test_synthesizes_unknown() {
        let attempts = reconcile_attempts(&json!({"title": "mystery"}));
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].status, TestStatus::Unknown);
        assert_eq!(attempts[0].duration_ms, None);
        assert!(attempts[0].errors.is_empty());
    }

    #[test]
    fn test_attempt_start_time_resolved() {
        let test = json!({
            "results": [{"status": "passed", "startTime": "2024-01-01T00:00:00Z"}]
        });

        let attempts = reconcile_attempts(&test);
        assert!(attempts[0].started_at.is_some());
    }

    #[test]
    fn test_negative_duration_dropped() {
        let test = json!({"status": "passed", "duration": -5});
        let attempts = reconcile_attempts(&test);
        assert_eq!(attempts[0].duration_ms, None);
    }
}
