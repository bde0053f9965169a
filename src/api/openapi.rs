//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Report Insight Server",
        version = "0.1.0",
        description = "API server for answering natural-language questions about browser test-run reports"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Report endpoints
        api::report::snapshot,
        api::report::refresh,
        // Query endpoints
        api::query::ask,
        api::query::exchanges,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Report
            api::report::SnapshotResponse,
            api::report::RefreshResponse,
            models::Snapshot,
            models::StatusCounts,
            models::SuiteStats,
            models::TestListEntry,
            // Query
            api::query::AskRequest,
            api::query::AskResponse,
            api::query::ExchangeLogResponse,
            models::Exchange,
            models::Intent,
            models::StatusKind,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Report", description = "Report snapshot and refresh"),
        (name = "Query", description = "Natural-language questions about the report")
    )
)]
pub struct ApiDoc;
