//! API endpoint modules.

pub mod health;
pub mod openapi;
pub mod query;
pub mod report;

pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use query::configure_query_routes;
pub use report::configure_report_routes;
