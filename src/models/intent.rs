//! Query intent classification.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Status kind a counting or listing query can ask about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Passed,
    Failed,
    Skipped,
    Flaky,
}

impl StatusKind {
    /// Parse a captured status word. Accepts the surface forms the count
    /// patterns capture.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "passed" | "pass" => Some(Self::Passed),
            "failed" | "fail" => Some(Self::Failed),
            "skipped" | "skip" => Some(Self::Skipped),
            "flaky" => Some(Self::Flaky),
            _ => None,
        }
    }

    /// Word used when rendering an answer for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
            Self::Flaky => "flaky",
        }
    }
}

/// Classification of one free-text query.
///
/// Deterministic intents are resolved by ordered pattern rules; `Unknown`
/// marks an answer produced by the statistical fallback classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Intent {
    Greeting,
    Vague,
    LastRun,
    Count { status: StatusKind },
    CountInSuite { status: StatusKind, suite: String },
    Total,
    ListFailed,
    ListPassed,
    ListFlaky,
    ListFailedOnce,
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_kind_parsing() {
        assert_eq!(StatusKind::parse("Passed"), Some(StatusKind::Passed));
        assert_eq!(StatusKind::parse(" fail "), Some(StatusKind::Failed));
        assert_eq!(StatusKind::parse("flaky"), Some(StatusKind::Flaky));
        assert_eq!(StatusKind::parse("exploded"), None);
    }
}
