//! Layered query routing: free text in, answer text out.
//!
//! The pipeline is a strict short-circuit sequence: greeting check, vague
//! check, deterministic rule cascade, statistical fallback, confidence
//! gate. The first stage that produces an answer terminates the pipeline,
//! and classification failures degrade to the generic help answer at the
//! HTTP boundary instead of surfacing as errors.

pub mod classifier;
pub mod last_run;
pub mod rules;
pub mod training;

use chrono::FixedOffset;
use regex::RegexSet;
use tracing::{debug, warn};

use crate::models::{Intent, Snapshot, StatusKind, TestRecord};

use classifier::Prediction;
use last_run::last_run_message;
use rules::{greeting_patterns, intent_of, intent_rules, is_vague, match_rules, IntentRule, RuleKind, RuleMatch};
use training::{ClassifierBundle, LAST_RUN_KEY, LAST_RUN_PLACEHOLDER};

/// Classifier predictions below this confidence are discarded in favor of
/// the snapshot summary. Hard-coded by policy.
pub const CONFIDENCE_FLOOR: f64 = 0.45;

/// Fixed greeting reply, independent of report content.
const GREETING_ANSWER: &str = "Hi! I'm your test-report helper. You can ask things like: \
    'list failed tests', 'how many passed', 'any flaky tests?', or 'when did the last test run?'";

/// Generic help answer rendered when nothing matched.
pub const HELP_ANSWER: &str = "I didn't catch that. Try: 'list failed tests', 'how many passed', \
    'how many failed in <suite>', 'any flaky tests?', or 'when did the last test run?'";

/// Everything one query routes against: the records and snapshot built for
/// this query cycle, plus the classifier bundle current at query start.
pub struct QueryContext<'a> {
    pub records: &'a [TestRecord],
    pub snapshot: &'a Snapshot,
    pub bundle: Option<&'a ClassifierBundle>,
}

/// Outcome of routing one query.
///
/// Only `Matched` carries a final answer; the HTTP boundary renders the
/// other two as the generic help text so the pipeline always terminates
/// with some answer.
#[derive(Debug)]
pub enum Resolution {
    Matched { intent: Intent, answer: String },
    NoMatch,
    CollaboratorFailure(String),
}

/// Intent router over one loaded report snapshot.
pub struct QueryRouter {
    rules: Vec<IntentRule>,
    greetings: RegexSet,
    display_offset: FixedOffset,
}

impl QueryRouter {
    /// Build a router rendering last-run times in the given display offset.
    pub fn new(display_offset: FixedOffset) -> Self {
        QueryRouter {
            rules: intent_rules(),
            greetings: greeting_patterns(),
            display_offset,
        }
    }

    /// Route one query through the staged pipeline.
    pub fn respond(&self, query: &str, ctx: &QueryContext<'_>) -> Resolution {
        let query = query.trim();

        // 1) Greetings: fixed reply, regardless of report content.
        if self.greetings.is_match(query) {
            return Resolution::Matched {
                intent: Intent::Greeting,
                answer: GREETING_ANSWER.to_string(),
            };
        }

        // 2) Vague queries get the snapshot summary rather than a guess.
        if is_vague(query) {
            return Resolution::Matched {
                intent: Intent::Vague,
                answer: summarize(ctx.snapshot),
            };
        }

        // 3) Deterministic rule cascade, first match wins.
        if let Some(m) = match_rules(&self.rules, query) {
            let intent = intent_of(&m);
            let answer = self.answer_rule(&m, ctx);
            debug!(?intent, "Deterministic intent matched");
            return Resolution::Matched { intent, answer };
        }

        // 4) Statistical fallback with confidence gate.
        self.statistical_fallback(query, ctx)
    }

    fn statistical_fallback(&self, query: &str, ctx: &QueryContext<'_>) -> Resolution {
        let Some(bundle) = ctx.bundle else {
            return Resolution::CollaboratorFailure("no classifier bundle loaded".to_string());
        };

        let prediction = match bundle.classifier.classify(query) {
            Ok(Some(p)) => p,
            Ok(None) => return Resolution::NoMatch,
            Err(e) => {
                warn!("Question classifier failed: {}", e);
                return Resolution::CollaboratorFailure(e.to_string());
            }
        };

        // 5) Confidence gate: a low-confidence guess is worse than the
        // snapshot summary.
        if let Some(confidence) = prediction.confidence {
            if confidence < CONFIDENCE_FLOOR {
                debug!(confidence, key = %prediction.key, "Prediction below confidence floor");
                return Resolution::Matched {
                    intent: Intent::Unknown,
                    answer: format!("{}\n\n{}", summarize(ctx.snapshot), HELP_ANSWER),
                };
            }
        }

        self.answer_prediction(&prediction, ctx)
    }

    /// 6) Resolve the predicted canned answer, expanding the last-run
    /// sentinel dynamically instead of returning the literal placeholder.
    fn answer_prediction(&self, prediction: &Prediction, ctx: &QueryContext<'_>) -> Resolution {
        if prediction.key == LAST_RUN_KEY {
            return Resolution::Matched {
                intent: Intent::LastRun,
                answer: last_run_message(ctx.records, self.display_offset),
            };
        }

        let Some(bundle) = ctx.bundle else {
            return Resolution::NoMatch;
        };
        let Some(canned) = bundle.answers.get(&prediction.key) else {
            return Resolution::NoMatch;
        };

        if canned.trim().eq_ignore_ascii_case(LAST_RUN_PLACEHOLDER) {
            return Resolution::Matched {
                intent: Intent::LastRun,
                answer: last_run_message(ctx.records, self.display_offset),
            };
        }

        Resolution::Matched {
            intent: Intent::Unknown,
            answer: canned.clone(),
        }
    }

    fn answer_rule(&self, m: &RuleMatch, ctx: &QueryContext<'_>) -> String {
        match m.kind {
            RuleKind::LastRun => last_run_message(ctx.records, self.display_offset),
            RuleKind::FlakyExistence => flaky_existence_answer(ctx.snapshot),
            RuleKind::SuiteStatusCount => {
                let status = m.status.unwrap_or(StatusKind::Failed);
                let Some(raw_suite) = m.suite.as_deref() else {
                    return count_answer(ctx.snapshot, status);
                };
                match ctx.snapshot.find_suite(raw_suite) {
                    Some(suite) => {
                        let n = count_of(&suite.counts, status);
                        format!(
                            "In '{}': {} {}.",
                            suite.title,
                            pluralize_tests(n),
                            status_verb(status, n)
                        )
                    }
                    None => format!("I couldn't find a suite matching '{}'.", raw_suite.trim()),
                }
            }
            RuleKind::StatusCount => {
                count_answer(ctx.snapshot, m.status.unwrap_or(StatusKind::Failed))
            }
            RuleKind::TotalCount => {
                let n = ctx.records.len();
                format!("The latest report contains {}.", pluralize_tests(n))
            }
            RuleKind::ListFailed => list_answer("Failed tests", &ctx.snapshot.failed),
            RuleKind::ListFailedOnce => list_answer(
                "Tests that failed at least once",
                &ctx.snapshot.failed_at_least_once,
            ),
            RuleKind::ListPassed => list_answer("Passed tests", &ctx.snapshot.passed),
            RuleKind::ListFlaky => list_answer("Flaky tests", &ctx.snapshot.flaky),
        }
    }
}

/// One-line snapshot summary used for vague queries and the confidence
/// gate fallback.
pub fn summarize(snapshot: &Snapshot) -> String {
    let t = &snapshot.totals;
    format!(
        "Latest run: {}. {} passed, {} failed, {} flaky, {} skipped, {} unknown.",
        pluralize_tests(t.total()),
        t.passed,
        t.failed,
        t.flaky,
        t.skipped,
        t.unknown
    )
}

fn flaky_existence_answer(snapshot: &Snapshot) -> String {
    if snapshot.flaky.is_empty() {
        return "No flaky tests in the latest run.".to_string();
    }
    let mut lines = vec![format!(
        "Found {} flaky {}:",
        snapshot.flaky.len(),
        if snapshot.flaky.len() == 1 { "test" } else { "tests" }
    )];
    for entry in &snapshot.flaky {
        lines.push(format!("- '{}' in '{}'", entry.title, entry.suite_title));
    }
    lines.join("\n")
}

fn count_answer(snapshot: &Snapshot, status: StatusKind) -> String {
    let n = count_of(&snapshot.totals, status);
    format!("{} {}.", pluralize_tests(n), status_verb(status, n))
}

fn count_of(counts: &crate::models::StatusCounts, status: StatusKind) -> usize {
    match status {
        StatusKind::Passed => counts.passed,
        StatusKind::Failed => counts.failed,
        StatusKind::Skipped => counts.skipped,
        StatusKind::Flaky => counts.flaky,
    }
}

fn status_verb(status: StatusKind, n: usize) -> &'static str {
    match status {
        StatusKind::Passed => "passed",
        StatusKind::Failed => "failed",
        StatusKind::Skipped => {
            if n == 1 {
                "was skipped"
            } else {
                "were skipped"
            }
        }
        StatusKind::Flaky => {
            if n == 1 {
                "is flaky"
            } else {
                "are flaky"
            }
        }
    }
}

fn pluralize_tests(n: usize) -> String {
    if n == 1 {
        "1 test".to_string()
    } else {
        format!("{} tests", n)
    }
}

fn list_answer(label: &str, entries: &[crate::models::TestListEntry]) -> String {
    if entries.is_empty() {
        return format!("{}: none.", label);
    }
    let mut lines = vec![format!("{}:", label)];
    for entry in entries {
        lines.push(format!("- '{}' in '{}'", entry.title, entry.suite_title));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::classifier::{ClassifierError, QuestionClassifier};
    use super::*;
    use crate::models::{Attempt, TestStatus};
    use crate::services::aggregate::aggregate;
    use std::collections::HashMap;

    fn record(suite: &str, title: &str, statuses: &[TestStatus]) -> TestRecord {
        let attempts = statuses
            .iter()
            .map(|s| Attempt::new(s.clone(), None, Vec::new(), None))
            .collect();
        TestRecord::from_attempts(
            None,
            suite.to_string(),
            format!("{suite}.spec.ts"),
            title.to_string(),
            "default".to_string(),
            attempts,
            None,
        )
    }

    fn router() -> QueryRouter {
        QueryRouter::new(FixedOffset::east_opt(0).unwrap())
    }

    /// Classifier stub returning a fixed prediction.
    struct FixedClassifier(Option<Prediction>);

    impl QuestionClassifier for FixedClassifier {
        fn classify(&self, _query: &str) -> Result<Option<Prediction>, ClassifierError> {
            Ok(self.0.clone())
        }
    }

    /// Classifier stub that always fails.
    struct BrokenClassifier;

    impl QuestionClassifier for BrokenClassifier {
        fn classify(&self, _query: &str) -> Result<Option<Prediction>, ClassifierError> {
            Err(ClassifierError::NoExamples("stub".to_string()))
        }
    }

    fn bundle_with(classifier: Box<dyn QuestionClassifier>, answers: &[(&str, &str)]) -> ClassifierBundle {
        ClassifierBundle {
            classifier,
            answers: answers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        }
    }

    fn answer(resolution: Resolution) -> String {
        match resolution {
            Resolution::Matched { answer, .. } => answer,
            other => panic!("expected Matched, got {:?}", other),
        }
    }

    #[test]
    fn test_greeting_regardless_of_report() {
        let snapshot = aggregate(&[]);
        let ctx = QueryContext {
            records: &[],
            snapshot: &snapshot,
            bundle: None,
        };
        let resolution = router().respond("hello", &ctx);
        match resolution {
            Resolution::Matched { intent, answer } => {
                assert_eq!(intent, Intent::Greeting);
                assert!(answer.contains("list failed tests"));
            }
            other => panic!("expected greeting, got {:?}", other),
        }
    }

    #[test]
    fn test_vague_query_gets_summary() {
        let records = vec![record("S", "a", &[TestStatus::Passed])];
        let snapshot = aggregate(&records);
        let ctx = QueryContext {
            records: &records,
            snapshot: &snapshot,
            bundle: None,
        };
        let text = answer(router().respond("tests?", &ctx));
        assert!(text.starts_with("Latest run: 1 test."));
    }

    #[test]
    fn test_zero_passed_count() {
        let snapshot = aggregate(&[]);
        let ctx = QueryContext {
            records: &[],
            snapshot: &snapshot,
            bundle: None,
        };
        let text = answer(router().respond("how many tests passed?", &ctx));
        assert_eq!(text, "0 tests passed.");
    }

    #[test]
    fn test_suite_scoped_count() {
        let records = vec![
            record("Login", "a", &[TestStatus::Failed]),
            record("Login", "b", &[TestStatus::Failed]),
            record("Login", "c", &[TestStatus::Passed]),
            record("Checkout", "d", &[TestStatus::Failed]),
        ];
        let snapshot = aggregate(&records);
        let ctx = QueryContext {
            records: &records,
            snapshot: &snapshot,
            bundle: None,
        };
        let text = answer(router().respond("how many failed in Login", &ctx));
        assert_eq!(text, "In 'Login': 2 tests failed.");
    }

    #[test]
    fn test_unmatched_suite_is_an_answer_not_an_error() {
        let records = vec![record("Login", "a", &[TestStatus::Passed])];
        let snapshot = aggregate(&records);
        let ctx = QueryContext {
            records: &records,
            snapshot: &snapshot,
            bundle: None,
        };
        let text = answer(router().respond("how many failed in warp-drive", &ctx));
        assert_eq!(text, "I couldn't find a suite matching 'warp-drive'.");
    }

    #[test]
    fn test_flaky_existence_names_the_test_and_suite() {
        let records = vec![record(
            "Login",
            "shows error on bad password",
            &[TestStatus::Failed, TestStatus::Passed],
        )];
        let snapshot = aggregate(&records);
        assert_eq!(snapshot.totals.flaky, 1);

        let ctx = QueryContext {
            records: &records,
            snapshot: &snapshot,
            bundle: None,
        };
        let text = answer(router().respond("any flaky tests?", &ctx));
        assert!(text.contains("shows error on bad password"));
        assert!(text.contains("Login"));
    }

    #[test]
    fn test_low_confidence_prediction_discarded() {
        let records = vec![record("S", "a", &[TestStatus::Passed])];
        let snapshot = aggregate(&records);
        let bundle = bundle_with(
            Box::new(FixedClassifier(Some(Prediction {
                key: "k".to_string(),
                confidence: Some(0.3),
            }))),
            &[("k", "a confidently wrong canned answer")],
        );
        let ctx = QueryContext {
            records: &records,
            snapshot: &snapshot,
            bundle: Some(&bundle),
        };

        let text = answer(router().respond("tell me something obscure", &ctx));
        assert!(text.contains("Latest run:"));
        assert!(!text.contains("confidently wrong"));
    }

    #[test]
    fn test_confident_prediction_returns_canned_answer() {
        let records = vec![record("S", "a", &[TestStatus::Passed])];
        let snapshot = aggregate(&records);
        let bundle = bundle_with(
            Box::new(FixedClassifier(Some(Prediction {
                key: "k".to_string(),
                confidence: Some(0.9),
            }))),
            &[("k", "Yes, it passed.")],
        );
        let ctx = QueryContext {
            records: &records,
            snapshot: &snapshot,
            bundle: Some(&bundle),
        };

        let text = answer(router().respond("did test a pass", &ctx));
        assert_eq!(text, "Yes, it passed.");
    }

    #[test]
    fn test_placeholder_answer_resolves_last_run() {
        let at = chrono::DateTime::from_timestamp(1_704_067_200, 0);
        let mut rec = record("S", "a", &[TestStatus::Passed]);
        rec.last_started_at = at;
        let records = vec![rec];
        let snapshot = aggregate(&records);
        let bundle = bundle_with(
            Box::new(FixedClassifier(Some(Prediction {
                key: "last_run".to_string(),
                confidence: Some(0.99),
            }))),
            &[("last_run", "LAST_RUN_PLACEHOLDER")],
        );
        let ctx = QueryContext {
            records: &records,
            snapshot: &snapshot,
            bundle: Some(&bundle),
        };

        let text = answer(router().respond("run info please", &ctx));
        assert!(text.contains("Last test attempt started on"));
        assert!(!text.contains("LAST_RUN_PLACEHOLDER"));
    }

    #[test]
    fn test_classifier_failure_degrades_not_panics() {
        let records = vec![record("S", "a", &[TestStatus::Passed])];
        let snapshot = aggregate(&records);
        let bundle = bundle_with(Box::new(BrokenClassifier), &[]);
        let ctx = QueryContext {
            records: &records,
            snapshot: &snapshot,
            bundle: Some(&bundle),
        };

        match router().respond("something inscrutable", &ctx) {
            Resolution::CollaboratorFailure(_) => {}
            other => panic!("expected collaborator failure, got {:?}", other),
        }
    }

    #[test]
    fn test_no_signal_is_no_match() {
        let records = vec![record("S", "a", &[TestStatus::Passed])];
        let snapshot = aggregate(&records);
        let bundle = bundle_with(Box::new(FixedClassifier(None)), &[]);
        let ctx = QueryContext {
            records: &records,
            snapshot: &snapshot,
            bundle: Some(&bundle),
        };

        match router().respond("inscrutable", &ctx) {
            Resolution::NoMatch => {}
            other => panic!("expected no match, got {:?}", other),
        }
    }
}
