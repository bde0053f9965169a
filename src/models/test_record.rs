//! Canonical test record reconciled from raw report nodes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::attempt::{Attempt, TestStatus};

/// Placeholder used when a suite carries no resolvable title.
pub const UNKNOWN_SUITE: &str = "Unknown suite";

/// Placeholder used when a spec carries no resolvable title.
pub const UNKNOWN_SPEC: &str = "Unknown spec";

/// Placeholder used when a test carries no resolvable title.
pub const UNKNOWN_TEST: &str = "Unknown test";

/// Default project name when the runner reports none.
pub const DEFAULT_PROJECT: &str = "default";

/// Canonical per-test record, built once per normalization pass.
///
/// Immutable after construction and never persisted: the full set is
/// recomputed from the raw report on each query cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRecord {
    /// Stable identity key: the source `id` when present, else the
    /// composite `suite::spec::title::project`
    pub id: String,
    /// Enclosing suite title
    pub suite_title: String,
    /// Enclosing spec title
    pub spec_title: String,
    /// Test title
    pub title: String,
    /// Runner project name
    pub project: String,
    /// Execution attempts in execution order
    pub attempts: Vec<Attempt>,
    /// Status of the last attempt
    pub final_status: TestStatus,
    /// True when any attempt failed, timed out, or was interrupted
    pub failed_once: bool,
    /// True when the test failed at least once but passed on the final
    /// attempt
    pub is_flaky: bool,
    /// Start time of the most recent activity for this test
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_started_at: Option<DateTime<Utc>>,
}

impl TestRecord {
    /// Build a record from its reconciled parts, deriving final status and
    /// the flaky/failed-once classification from the attempt sequence.
    pub fn from_attempts(
        id: Option<String>,
        suite_title: String,
        spec_title: String,
        title: String,
        project: String,
        attempts: Vec<Attempt>,
        last_started_at: Option<DateTime<Utc>>,
    ) -> Self {
        let final_status = attempts
            .last()
            .map(|a| a.status.clone())
            .unwrap_or(TestStatus::Unknown);
        let failed_once = attempts.iter().any(|a| a.status.is_failure());
        let is_flaky = failed_once && final_status == TestStatus::Passed;

        let id = id.unwrap_or_else(|| {
            format!("{}::{}::{}::{}", suite_title, spec_title, title, project)
        });

        TestRecord {
            id,
            suite_title,
            spec_title,
            title,
            project,
            attempts,
            final_status,
            failed_once,
            is_flaky,
            last_started_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempt(status: TestStatus) -> Attempt {
        Attempt::new(status, Some(100), Vec::new(), None)
    }

    #[test]
    fn test_flaky_requires_final_pass() {
        let record = TestRecord::from_attempts(
            None,
            "Login".to_string(),
            "login.spec.ts".to_string(),
            "shows error on bad password".to_string(),
            "chromium".to_string(),
            vec![attempt(TestStatus::Failed), attempt(TestStatus::Passed)],
            None,
        );

        assert_eq!(record.final_status, TestStatus::Passed);
        assert!(record.failed_once);
        assert!(record.is_flaky);
    }

    #[test]
    fn test_final_failure_is_not_flaky() {
        let record = TestRecord::from_attempts(
            None,
            "Login".to_string(),
            "login.spec.ts".to_string(),
            "t".to_string(),
            "default".to_string(),
            vec![attempt(TestStatus::Failed), attempt(TestStatus::TimedOut)],
            None,
        );

        assert!(record.failed_once);
        assert!(!record.is_flaky);
        assert_eq!(record.final_status, TestStatus::TimedOut);
    }

    #[test]
    fn test_composite_key_when_source_id_missing() {
        let record = TestRecord::from_attempts(
            None,
            "Suite".to_string(),
            "Spec".to_string(),
            "Test".to_string(),
            "default".to_string(),
            vec![attempt(TestStatus::Passed)],
            None,
        );

        assert_eq!(record.id, "Suite::Spec::Test::default");
    }

    #[test]
    fn test_source_id_wins_over_composite() {
        let record = TestRecord::from_attempts(
            Some("abc-123".to_string()),
            "Suite".to_string(),
            "Spec".to_string(),
            "Test".to_string(),
            "default".to_string(),
            vec![attempt(TestStatus::Passed)],
            None,
        );

        assert_eq!(record.id, "abc-123");
    }
}
