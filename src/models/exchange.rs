//! Conversational exchange log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::intent::Intent;

/// One question/answer turn in the conversation log.
///
/// The log is append-only: entries are never edited or removed once
/// recorded.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Exchange {
    /// The question as asked
    pub question: String,
    /// The rendered answer
    pub answer: String,
    /// Resolved intent, when one was matched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    /// When the question was asked
    pub asked_at: DateTime<Utc>,
}

impl Exchange {
    /// Record a new exchange stamped with the current time.
    pub fn new(question: String, answer: String, intent: Option<Intent>) -> Self {
        Exchange {
            question,
            answer,
            intent,
            asked_at: Utc::now(),
        }
    }
}
