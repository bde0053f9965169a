//! Report API handlers: snapshot and refresh.

use actix_web::{get, post, web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::Snapshot;
use crate::services::{aggregate, build_records, ClassifierBundle, ReportSource};
use crate::state::{AppState, LoadedReport};

/// Aggregate snapshot of the currently loaded report.
#[derive(Debug, Serialize, ToSchema)]
pub struct SnapshotResponse {
    /// Load id of the report the snapshot was computed from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_id: Option<Uuid>,
    /// When that report was fetched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<DateTime<Utc>>,
    /// Number of canonical test records
    pub total: usize,
    /// The aggregate view
    pub snapshot: Snapshot,
}

/// Result of a report refresh.
#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshResponse {
    pub report_id: Uuid,
    pub fetched_at: DateTime<Utc>,
    /// Canonical test records found in the report
    pub tests: usize,
    /// Distinct suites found in the report
    pub suites: usize,
    /// Whether a classifier bundle was trained and installed
    pub classifier_ready: bool,
}

/// Compute the aggregate snapshot for the loaded report.
///
/// With no report loaded this returns an empty snapshot: a missing report
/// is "no data available", not an error.
#[utoipa::path(
    get,
    path = "/api/v1/snapshot",
    tag = "Report",
    responses(
        (status = 200, description = "Aggregate snapshot", body = SnapshotResponse)
    )
)]
#[get("/snapshot")]
pub async fn snapshot(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let report = state.current_report().await;

    let records = report
        .as_ref()
        .map(|r| build_records(&r.raw))
        .unwrap_or_default();

    Ok(HttpResponse::Ok().json(SnapshotResponse {
        report_id: report.as_ref().map(|r| r.id),
        fetched_at: report.as_ref().map(|r| r.fetched_at),
        total: records.len(),
        snapshot: aggregate(&records),
    }))
}

/// Fetch the report afresh and retrain the classifier.
///
/// The new report and classifier bundle are swapped in wholesale; queries
/// already in flight keep the versions they started with.
#[utoipa::path(
    post,
    path = "/api/v1/report/refresh",
    tag = "Report",
    responses(
        (status = 200, description = "Report refreshed", body = RefreshResponse),
        (status = 502, description = "Report source unavailable")
    )
)]
#[post("/report/refresh")]
pub async fn refresh(
    state: web::Data<AppState>,
    source: web::Data<ReportSource>,
) -> AppResult<HttpResponse> {
    let raw = source.fetch().await?;
    let report = LoadedReport::new(raw);
    let report_id = report.id;
    let fetched_at = report.fetched_at;

    let records = build_records(&report.raw);
    let suites = aggregate(&records).per_suite.len();
    let tests = records.len();
    info!(
        report_id = %report_id,
        tests,
        suites,
        "Report refreshed"
    );

    let classifier_ready = match ClassifierBundle::train(&records) {
        Ok(bundle) => {
            state.install(report, bundle).await;
            true
        }
        Err(e) => {
            warn!("Classifier training failed, keeping previous bundle: {}", e);
            state.install_report(report).await;
            false
        }
    };

    Ok(HttpResponse::Ok().json(RefreshResponse {
        report_id,
        fetched_at,
        tests,
        suites,
        classifier_ready,
    }))
}

/// Configure report routes.
pub fn configure_report_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(snapshot).service(refresh);
}
