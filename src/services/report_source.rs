//! Raw report fetching from the configured report URL.

use std::time::Duration;

use serde_json::Value;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};

/// HTTP connect timeout for report fetches.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Fetches raw report trees over HTTP.
///
/// A transport or status failure is a single reported error here; callers
/// treat it as "no data available" rather than a crash.
#[derive(Clone)]
pub struct ReportSource {
    url: String,
    client: reqwest::Client,
}

impl ReportSource {
    /// Build a source for the given URL with a bounded total timeout.
    pub fn new(url: String, request_timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(request_timeout)
            .build()
            .map_err(|e| AppError::ReportFetch(format!("Failed to build HTTP client: {}", e)))?;

        Ok(ReportSource { url, client })
    }

    /// Fetch and parse the raw report JSON.
    pub async fn fetch(&self) -> AppResult<Value> {
        info!("Fetching report from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AppError::ReportFetch(format!("Report fetch failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Report source returned status {}", status);
            return Err(AppError::ReportFetch(format!(
                "Report source returned status {}",
                status
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| AppError::ReportFetch(format!("Report body is not valid JSON: {}", e)))
    }

    /// The configured report URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}
