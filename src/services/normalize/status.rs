//! Status normalization across runner spellings.

use crate::models::TestStatus;

/// Normalize a raw status string into the closed status vocabulary.
///
/// Lower-cases, strips whitespace/hyphens/underscores, then maps known
/// synonyms. Unrecognized non-empty strings pass through (canonicalized)
/// so new runner statuses survive normalization; empty or missing input
/// normalizes to `Unknown`.
pub fn normalize_status(raw: Option<&str>) -> TestStatus {
    let cleaned: String = match raw {
        Some(s) => s
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect(),
        None => String::new(),
    };

    match cleaned.as_str() {
        "" => TestStatus::Unknown,
        "passed" | "pass" | "ok" | "success" => TestStatus::Passed,
        "failed" | "fail" | "error" => TestStatus::Failed,
        "timedout" | "timeout" | "timedouterror" => TestStatus::TimedOut,
        "interrupted" => TestStatus::Interrupted,
        "skipped" | "skip" | "skipping" => TestStatus::Skipped,
        "unknown" => TestStatus::Unknown,
        _ => TestStatus::Other(cleaned),
    }
}
