//! Aggregate snapshot derived from a set of test records.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::attempt::TestStatus;
use super::test_record::TestRecord;

/// Per-category counts for one run or one suite.
///
/// A record is counted as flaky when `is_flaky`, otherwise by its final
/// status; final statuses outside {passed, failed, skipped} fall into the
/// unknown bucket. Categories are mutually exclusive, so the bucket sum
/// always equals the number of records counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusCounts {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub flaky: usize,
    pub unknown: usize,
}

impl StatusCounts {
    /// Count one record into the bucket its classification selects.
    pub fn record(&mut self, record: &TestRecord) {
        if record.is_flaky {
            self.flaky += 1;
            return;
        }
        match record.final_status {
            TestStatus::Passed => self.passed += 1,
            TestStatus::Failed => self.failed += 1,
            TestStatus::Skipped => self.skipped += 1,
            _ => self.unknown += 1,
        }
    }

    /// Sum across all buckets.
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped + self.flaky + self.unknown
    }
}

/// Counts for a single suite, keyed by its title.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SuiteStats {
    pub title: String,
    pub counts: StatusCounts,
}

/// A test reference carried in the snapshot's named lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TestListEntry {
    pub suite_title: String,
    pub title: String,
    pub project: String,
    pub final_status: String,
}

impl TestListEntry {
    /// Build a list entry from a record.
    pub fn from_record(record: &TestRecord) -> Self {
        TestListEntry {
            suite_title: record.suite_title.clone(),
            title: record.title.clone(),
            project: record.project.clone(),
            final_status: record.final_status.as_str().to_string(),
        }
    }
}

/// Aggregate view over one normalization pass.
///
/// A pure function of the record set, recomputed fresh per query and never
/// mutated in place. Suites appear in first-seen traversal order; the
/// query router's suite matching relies on that order for tie-breaking.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct Snapshot {
    /// Run-wide counts
    pub totals: StatusCounts,
    /// Per-suite breakdown in first-seen order
    pub per_suite: Vec<SuiteStats>,
    /// Tests whose final status is passed (flaky tests excluded)
    pub passed: Vec<TestListEntry>,
    /// Tests whose final status is a failure kind
    pub failed: Vec<TestListEntry>,
    /// Tests that failed at least once but passed on the final attempt
    pub flaky: Vec<TestListEntry>,
    /// Tests that failed on any attempt, flaky and final failures alike
    pub failed_at_least_once: Vec<TestListEntry>,
}

impl Snapshot {
    /// Look up a suite by case-insensitive substring of its title.
    ///
    /// Returns the first match in enumeration order, so ambiguous
    /// substrings resolve deterministically.
    pub fn find_suite(&self, needle: &str) -> Option<&SuiteStats> {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.per_suite
            .iter()
            .find(|s| s.title.to_lowercase().contains(&needle))
    }
}
