//! Report normalization: raw report trees into canonical test records.
//!
//! The walker yields raw test nodes with lineage, the attempt reconciler
//! flattens retry shapes, and the timestamp resolver pins down start
//! times. The builder composes the three into `TestRecord`s.

pub mod attempts;
pub mod status;
pub mod timestamp;
pub mod walker;

use serde_json::Value;

use crate::models::{TestRecord, DEFAULT_PROJECT, UNKNOWN_SPEC, UNKNOWN_SUITE, UNKNOWN_TEST};

use attempts::reconcile_attempts;
use timestamp::resolve_first;
use walker::walk_report;

/// Test-level fallback time fields, tried only after the last attempt's
/// own start time.
const TEST_TIME_KEYS: [&str; 3] = ["startTime", "start_time", "startedAt"];

/// Build the canonical record set for one raw report.
///
/// Pure and side-effect-free: the input is never mutated, and building
/// twice from the same report yields records with identical identity keys
/// and field values. Every leaf test node reachable by the walker produces
/// exactly one record.
pub fn build_records(report: &Value) -> Vec<TestRecord> {
    walk_report(report)
        .map(|walked| {
            let title = non_empty(walked.test.get("title")).unwrap_or_else(|| UNKNOWN_TEST.into());
            let suite_title = default_if_empty(walked.suite_title, UNKNOWN_SUITE);
            let spec_title = default_if_empty(walked.spec_title, UNKNOWN_SPEC);
            let project = project_of(walked.test);

            let attempts = reconcile_attempts(walked.test);

            // Last-attempt-wins: the final attempt's own start time is the
            // most recent activity, with the test-level field as fallback.
            let last_started_at = attempts
                .last()
                .and_then(|a| a.started_at)
                .or_else(|| resolve_first(walked.test, &TEST_TIME_KEYS));

            let source_id = non_empty(walked.test.get("id"));

            TestRecord::from_attempts(
                source_id,
                suite_title,
                spec_title,
                title,
                project,
                attempts,
                last_started_at,
            )
        })
        .collect()
}

fn project_of(test: &Value) -> String {
    for key in ["projectName", "project", "projectId"] {
        if let Some(p) = non_empty(test.get(key)) {
            return p;
        }
    }
    DEFAULT_PROJECT.to_string()
}

fn non_empty(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn default_if_empty(s: String, default: &str) -> String {
    if s.trim().is_empty() {
        default.to_string()
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TestStatus;
    use serde_json::json;

    fn sample_report() -> Value {
        json!({
            "suites": [{
                "title": "Login",
                "specs": [{
                    "title": "login.spec.ts",
                    "tests": [{
                        "title": "shows error on bad password",
                        "projectName": "chromium",
                        "results": [
                            {"status": "failed", "duration": 1200},
                            {"status": "passed", "duration": 800, "startTime": "2024-03-01T12:00:00Z"}
                        ]
                    }]
                }]
            }]
        })
    }

    #[test]
    fn test_builds_one_record_per_leaf_test() {
        let report = sample_report();
        let records = build_records(&report);
        assert_eq!(records.len(), 1);

        let rec = &records[0];
        assert_eq!(rec.suite_title, "Login");
        assert_eq!(rec.spec_title, "login.spec.ts");
        assert_eq!(rec.title, "shows error on bad password");
        assert_eq!(rec.project, "chromium");
        assert_eq!(rec.attempts.len(), 2);
        assert_eq!(rec.final_status, TestStatus::Passed);
        assert!(rec.failed_once);
        assert!(rec.is_flaky);
    }

    #[test]
    fn test_building_twice_is_idempotent() {
        let report = sample_report();
        let first = build_records(&report);
        let second = build_records(&report);

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.final_status, b.final_status);
            assert_eq!(a.attempts.len(), b.attempts.len());
        }
    }

    #[test]
    fn test_placeholder_defaults_for_absent_fields() {
        let report = json!({
            "suites": [{
                "specs": [{"tests": [{}]}]
            }]
        });

        let records = build_records(&report);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].suite_title, UNKNOWN_SUITE);
        assert_eq!(records[0].spec_title, UNKNOWN_SPEC);
        assert_eq!(records[0].title, UNKNOWN_TEST);
        assert_eq!(records[0].project, DEFAULT_PROJECT);
        assert_eq!(records[0].final_status, TestStatus::Unknown);
    }

    #[test]
    fn test_empty_report_builds_nothing() {
        assert!(build_records(&json!({})).is_empty());
    }

    #[test]
    fn test_last_attempt_time_wins_over_test_level() {
        let report = json!({
            "suites": [{
                "title": "S",
                "tests": [{
                    "title": "t",
                    "startTime": "2020-01-01T00:00:00Z",
                    "results": [
                        {"status": "passed", "startTime": "2024-01-01T00:00:00Z"}
                    ]
                }]
            }]
        });

        let records = build_records(&report);
        let at = records[0].last_started_at.unwrap();
        assert_eq!(at.timestamp(), 1_704_067_200);
    }

    #[test]
    fn test_test_level_time_used_when_attempts_carry_none() {
        let report = json!({
            "suites": [{
                "title": "S",
                "tests": [{
                    "title": "t",
                    "status": "passed",
                    "startTime": 1_704_067_200
                }]
            }]
        });

        let records = build_records(&report);
        assert_eq!(records[0].last_started_at.unwrap().timestamp(), 1_704_067_200);
    }
}
