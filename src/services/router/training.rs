//! Synthetic training-pair generation and classifier bundle assembly.

use std::collections::HashMap;

use tracing::info;

use crate::models::{TestRecord, TestStatus};

use super::classifier::{ClassifierError, NaiveBayesClassifier, QuestionClassifier};

/// Sentinel canned-answer value resolved dynamically through the last-run
/// path instead of being returned literally.
pub const LAST_RUN_PLACEHOLDER: &str = "LAST_RUN_PLACEHOLDER";

/// Answer key for last-run questions.
pub const LAST_RUN_KEY: &str = "last_run";

/// Trained classifier plus its canned-answer table.
///
/// Built wholesale on every report refresh and swapped in atomically;
/// queries in flight keep the bundle they started with.
pub struct ClassifierBundle {
    pub classifier: Box<dyn QuestionClassifier>,
    pub answers: HashMap<String, String>,
}

impl ClassifierBundle {
    /// Train a fresh bundle from the current record set.
    ///
    /// Generates per-test question/answer pairs (result, pass-on-project,
    /// fail variants) plus the global last-run pairs, so the bundle is
    /// usable even for an empty report.
    pub fn train(records: &[TestRecord]) -> Result<Self, ClassifierError> {
        let mut examples: Vec<(String, String)> = Vec::new();
        let mut answers: HashMap<String, String> = HashMap::new();

        for record in records {
            let result_key = format!("result::{}", record.id);
            examples.push((
                format!("What was the result of '{}'?", record.title),
                result_key.clone(),
            ));
            answers.insert(
                result_key,
                format!(
                    "The test '{}' in '{}' {}.",
                    record.title, record.suite_title, record.final_status
                ),
            );

            let pass_key = format!("pass::{}", record.id);
            examples.push((
                format!("Did '{}' pass on {}?", record.title, record.project),
                pass_key.clone(),
            ));
            answers.insert(
                pass_key,
                if record.final_status == TestStatus::Passed {
                    "Yes, it passed.".to_string()
                } else {
                    "No, it did not pass.".to_string()
                },
            );

            let fail_key = format!("fail::{}", record.id);
            examples.push((format!("Did '{}' fail?", record.title), fail_key.clone()));
            answers.insert(
                fail_key,
                if record.final_status.is_failure() {
                    "Yes, it failed.".to_string()
                } else {
                    "No, it did not fail.".to_string()
                },
            );
        }

        for question in [
            "When did the last test run?",
            "What time was the most recent test run?",
            "Tell me about the previous run",
        ] {
            examples.push((question.to_string(), LAST_RUN_KEY.to_string()));
        }
        answers.insert(LAST_RUN_KEY.to_string(), LAST_RUN_PLACEHOLDER.to_string());

        let classifier = NaiveBayesClassifier::train(&examples)?;
        info!(
            examples = examples.len(),
            answers = answers.len(),
            "Trained question classifier"
        );

        Ok(ClassifierBundle {
            classifier: Box::new(classifier),
            answers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Attempt;

    fn record(title: &str, statuses: &[TestStatus]) -> TestRecord {
        let attempts = statuses
            .iter()
            .map(|s| Attempt::new(s.clone(), None, Vec::new(), None))
            .collect();
        TestRecord::from_attempts(
            None,
            "Suite".to_string(),
            "Spec".to_string(),
            title.to_string(),
            "default".to_string(),
            attempts,
            None,
        )
    }

    #[test]
    fn test_bundle_carries_three_answers_per_test_plus_last_run() {
        let records = vec![
            record("login works", &[TestStatus::Passed]),
            record("checkout fails", &[TestStatus::Failed]),
        ];

        let bundle = ClassifierBundle::train(&records).unwrap();
        assert_eq!(bundle.answers.len(), 2 * 3 + 1);
        assert_eq!(
            bundle.answers.get(LAST_RUN_KEY).map(String::as_str),
            Some(LAST_RUN_PLACEHOLDER)
        );
    }

    #[test]
    fn test_pass_fail_answers_follow_final_status() {
        let records = vec![record("flaky one", &[TestStatus::Failed, TestStatus::Passed])];
        let bundle = ClassifierBundle::train(&records).unwrap();

        assert_eq!(
            bundle.answers["pass::Suite::Spec::flaky one::default"],
            "Yes, it passed."
        );
        assert_eq!(
            bundle.answers["fail::Suite::Spec::flaky one::default"],
            "No, it did not fail."
        );
    }

    #[test]
    fn test_empty_report_still_trains_last_run() {
        let bundle = ClassifierBundle::train(&[]).unwrap();
        assert_eq!(bundle.answers.len(), 1);

        let pred = bundle
            .classifier
            .classify("when did the last test run")
            .unwrap()
            .unwrap();
        assert_eq!(pred.key, LAST_RUN_KEY);
    }
}
