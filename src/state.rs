//! Shared in-memory state: the loaded report, the classifier bundle, and
//! the conversation log.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::Exchange;
use crate::services::ClassifierBundle;

/// One fetched raw report, immutable once loaded.
#[derive(Debug, Clone)]
pub struct LoadedReport {
    /// Load identifier, used for log correlation
    pub id: Uuid,
    /// When the report was fetched
    pub fetched_at: DateTime<Utc>,
    /// The raw report tree, owned and never mutated
    pub raw: Value,
}

impl LoadedReport {
    /// Wrap a freshly fetched report tree.
    pub fn new(raw: Value) -> Self {
        LoadedReport {
            id: Uuid::new_v4(),
            fetched_at: Utc::now(),
            raw,
        }
    }
}

/// Application state shared across workers.
///
/// The report and classifier bundle are swapped wholesale behind RwLocks:
/// a query clones the current `Arc`s once up front and runs against that
/// consistent view, so an interleaved refresh can never hand it a
/// partially-loaded model.
pub struct AppState {
    pub report: RwLock<Option<Arc<LoadedReport>>>,
    pub bundle: RwLock<Option<Arc<ClassifierBundle>>>,
    pub exchanges: RwLock<Vec<Exchange>>,
}

impl AppState {
    /// Empty state: nothing loaded, nothing asked.
    pub fn new() -> Self {
        AppState {
            report: RwLock::new(None),
            bundle: RwLock::new(None),
            exchanges: RwLock::new(Vec::new()),
        }
    }

    /// Replace the loaded report and classifier bundle in one refresh.
    pub async fn install(&self, report: LoadedReport, bundle: ClassifierBundle) {
        *self.report.write().await = Some(Arc::new(report));
        *self.bundle.write().await = Some(Arc::new(bundle));
    }

    /// Replace only the loaded report, keeping any previous bundle.
    pub async fn install_report(&self, report: LoadedReport) {
        *self.report.write().await = Some(Arc::new(report));
    }

    /// Current report, if any.
    pub async fn current_report(&self) -> Option<Arc<LoadedReport>> {
        self.report.read().await.clone()
    }

    /// Current classifier bundle, if any.
    pub async fn current_bundle(&self) -> Option<Arc<ClassifierBundle>> {
        self.bundle.read().await.clone()
    }

    /// Append one turn to the exchange log.
    pub async fn record_exchange(&self, exchange: Exchange) {
        self.exchanges.write().await.push(exchange);
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_install_swaps_both_report_and_bundle() {
        let state = AppState::new();
        assert!(state.current_report().await.is_none());
        assert!(state.current_bundle().await.is_none());

        let bundle = ClassifierBundle::train(&[]).unwrap();
        state
            .install(LoadedReport::new(json!({"suites": []})), bundle)
            .await;

        assert!(state.current_report().await.is_some());
        assert!(state.current_bundle().await.is_some());
    }

    #[tokio::test]
    async fn test_exchange_log_appends_in_order() {
        let state = AppState::new();
        state
            .record_exchange(Exchange::new("q1".to_string(), "a1".to_string(), None))
            .await;
        state
            .record_exchange(Exchange::new("q2".to_string(), "a2".to_string(), None))
            .await;

        let log = state.exchanges.read().await;
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].question, "q1");
        assert_eq!(log[1].question, "q2");
    }
}
