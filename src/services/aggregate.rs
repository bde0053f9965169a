//! Snapshot aggregation over canonical test records.

use crate::models::{Snapshot, SuiteStats, TestListEntry, TestRecord, TestStatus};

/// Fold a record set into a snapshot in one pass.
///
/// Category assignment is a precedence rule, not an additive one: a flaky
/// record is counted as flaky instead of passed, and no record lands in
/// two buckets. List entries keep traversal order; suites keep first-seen
/// order.
pub fn aggregate(records: &[TestRecord]) -> Snapshot {
    let mut snapshot = Snapshot::default();

    for record in records {
        snapshot.totals.record(record);
        suite_counts(&mut snapshot, &record.suite_title).record(record);

        let entry = TestListEntry::from_record(record);

        if record.is_flaky {
            snapshot.flaky.push(entry.clone());
        } else if record.final_status == TestStatus::Passed {
            snapshot.passed.push(entry.clone());
        } else if record.final_status.is_failure() {
            snapshot.failed.push(entry.clone());
        }

        if record.failed_once {
            snapshot.failed_at_least_once.push(entry);
        }
    }

    snapshot
}

/// Counts slot for a suite, created on first sight to preserve traversal
/// order.
fn suite_counts<'a>(
    snapshot: &'a mut Snapshot,
    title: &str,
) -> &'a mut crate::models::StatusCounts {
    let idx = match snapshot.per_suite.iter().position(|s| s.title == title) {
        Some(idx) => idx,
        None => {
            snapshot.per_suite.push(SuiteStats {
                title: title.to_string(),
                counts: crate::models::StatusCounts::default(),
            });
            snapshot.per_suite.len() - 1
        }
    };
    &mut snapshot.per_suite[idx].counts
}
