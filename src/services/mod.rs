//! Business logic services.

pub mod aggregate;
pub mod normalize;
pub mod report_source;
pub mod router;

pub use aggregate::aggregate;
pub use normalize::build_records;
pub use report_source::ReportSource;
pub use router::training::ClassifierBundle;
pub use router::{QueryContext, QueryRouter, Resolution};
