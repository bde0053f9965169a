//! Last-run resolution over record timestamps.

use chrono::{DateTime, FixedOffset, Utc};

use crate::models::TestRecord;

/// Find the most recent attempt start time and format it for display.
///
/// Scans every record's resolved timestamp, keeps the strict maximum
/// (ties go to the first record encountered), and reports it in the
/// configured display offset alongside UTC. Returns a distinct no-timestamp
/// message when nothing resolved; that is a normal answer, not a failure.
pub fn last_run_message(records: &[TestRecord], display_offset: FixedOffset) -> String {
    let mut latest: Option<(DateTime<Utc>, &TestRecord)> = None;

    for record in records {
        let Some(at) = record.last_started_at else {
            continue;
        };
        match latest {
            Some((max, _)) if at <= max => {}
            _ => latest = Some((at, record)),
        }
    }

    let Some((at, record)) = latest else {
        return "I couldn't find a timestamp for the last run.".to_string();
    };

    let local = at.with_timezone(&display_offset);
    format!(
        "Last test attempt started on {} ({} UTC) (example test: '{}', project: {}).",
        local.format("%Y-%m-%d %I:%M:%S %p %:z"),
        at.format("%Y-%m-%d %H:%M:%S"),
        record.title,
        record.project,
    )
}
