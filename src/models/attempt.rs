//! Attempt model representing one execution of a test case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Test execution status.
///
/// Closed vocabulary plus a pass-through variant for status strings newer
/// runner versions may emit. Unrecognized non-empty statuses are preserved
/// verbatim (after canonicalization) instead of being collapsed to failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    #[serde(rename = "timedout")]
    TimedOut,
    Interrupted,
    Skipped,
    Unknown,
    /// Unrecognized runner status, kept as-is.
    #[serde(untagged)]
    Other(String),
}

impl TestStatus {
    /// String representation used in answers and JSON payloads.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::TimedOut => "timedout",
            Self::Interrupted => "interrupted",
            Self::Skipped => "skipped",
            Self::Unknown => "unknown",
            Self::Other(s) => s.as_str(),
        }
    }

    /// Whether this status counts as a failure for flaky/failed-once
    /// classification (failed, timedout, interrupted).
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::TimedOut | Self::Interrupted)
    }
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One execution attempt of a test (retries produce several).
///
/// Attempts are ordered by execution order; the last attempt is
/// authoritative for final status and start time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attempt {
    /// Normalized execution status
    pub status: TestStatus,
    /// Execution duration in milliseconds, when reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<i64>,
    /// Opaque error descriptors attached to this attempt
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub errors: Vec<serde_json::Value>,
    /// Attempt start time, when resolvable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
}

impl Attempt {
    /// Create a new attempt.
    pub fn new(
        status: TestStatus,
        duration_ms: Option<i64>,
        errors: Vec<serde_json::Value>,
        started_at: Option<DateTime<Utc>>,
    ) -> Self {
        Attempt {
            status,
            duration_ms,
            errors,
            started_at,
        }
    }
}
