//! Domain models for the Report Insight server.

pub mod attempt;
pub mod exchange;
pub mod intent;
pub mod snapshot;
pub mod test_record;

// Re-export commonly used types
pub use attempt::{Attempt, TestStatus};
pub use exchange::Exchange;
pub use intent::{Intent, StatusKind};
pub use snapshot::{Snapshot, StatusCounts, SuiteStats, TestListEntry};
pub use test_record::{TestRecord, DEFAULT_PROJECT, UNKNOWN_SPEC, UNKNOWN_SUITE, UNKNOWN_TEST};
