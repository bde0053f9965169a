//! Query API handlers: free-text questions and the exchange log.

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::models::{Exchange, Intent};
use crate::services::router::HELP_ANSWER;
use crate::services::{aggregate, build_records, QueryContext, QueryRouter, Resolution};
use crate::state::AppState;

/// A free-text question about the loaded report.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AskRequest {
    /// The question text
    pub question: String,
}

/// Answer to one question.
#[derive(Debug, Serialize, ToSchema)]
pub struct AskResponse {
    /// Rendered answer text
    pub answer: String,
    /// Resolved intent, absent when the query fell through to the help
    /// answer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
}

/// The conversation so far.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExchangeLogResponse {
    pub exchanges: Vec<Exchange>,
    pub total: usize,
}

/// Ask a question about the current test-run report.
///
/// The pipeline always terminates with some textual answer: routing
/// failures degrade to a generic help message rather than an error. Only
/// the cold-start case, with neither a report nor a classifier loaded,
/// returns 503.
#[utoipa::path(
    post,
    path = "/api/v1/ask",
    tag = "Query",
    request_body = AskRequest,
    responses(
        (status = 200, description = "Answer to the question", body = AskResponse),
        (status = 400, description = "Empty question"),
        (status = 503, description = "No report or classifier loaded yet")
    )
)]
#[post("/ask")]
pub async fn ask(
    state: web::Data<AppState>,
    router: web::Data<QueryRouter>,
    body: web::Json<AskRequest>,
) -> AppResult<HttpResponse> {
    let question = body.question.trim();
    if question.is_empty() {
        return Err(AppError::InvalidInput("question must not be empty".to_string()));
    }

    let report = state.current_report().await;
    let bundle = state.current_bundle().await;

    if report.is_none() && bundle.is_none() {
        return Err(AppError::NotReady(
            "no report or classifier loaded; POST /api/v1/report/refresh first".to_string(),
        ));
    }

    // Re-aggregate from the retained raw report for every query; records
    // are never cached across queries.
    let records = report
        .as_ref()
        .map(|r| build_records(&r.raw))
        .unwrap_or_default();
    let snapshot = aggregate(&records);

    let ctx = QueryContext {
        records: &records,
        snapshot: &snapshot,
        bundle: bundle.as_deref(),
    };

    let (intent, answer) = match router.respond(question, &ctx) {
        Resolution::Matched { intent, answer } => (Some(intent), answer),
        Resolution::NoMatch => (None, HELP_ANSWER.to_string()),
        Resolution::CollaboratorFailure(reason) => {
            warn!("Query degraded to help answer: {}", reason);
            (None, HELP_ANSWER.to_string())
        }
    };

    state
        .record_exchange(Exchange::new(
            question.to_string(),
            answer.clone(),
            intent.clone(),
        ))
        .await;

    Ok(HttpResponse::Ok().json(AskResponse { answer, intent }))
}

/// Read the append-only exchange log.
#[utoipa::path(
    get,
    path = "/api/v1/exchanges",
    tag = "Query",
    responses(
        (status = 200, description = "All exchanges in order", body = ExchangeLogResponse)
    )
)]
#[get("/exchanges")]
pub async fn exchanges(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let log = state.exchanges.read().await;
    Ok(HttpResponse::Ok().json(ExchangeLogResponse {
        total: log.len(),
        exchanges: log.clone(),
    }))
}

/// Configure query routes.
pub fn configure_query_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(ask).service(exchanges);
}
