//! Statistical fallback classifier for free-text questions.
//!
//! Deterministic rules handle the common phrasings; everything else is
//! handed to a bag-of-words multinomial naive-Bayes model trained on
//! synthetic question/answer pairs generated from the current record set.
//! The classifier is an interchangeable collaborator behind a trait so the
//! router never depends on the concrete model.

use std::collections::{HashMap, HashSet};

/// A predicted answer key with an optional confidence score in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub key: String,
    pub confidence: Option<f64>,
}

/// Classifier collaborator failures.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// Training was attempted with no usable examples.
    #[error("no training examples: {0}")]
    NoExamples(String),
}

/// Classifies a free-text question into a canned-answer key.
pub trait QuestionClassifier: Send + Sync {
    /// Classify a query, returning `None` when the model has no signal at
    /// all for the input (e.g. no known vocabulary).
    fn classify(&self, query: &str) -> Result<Option<Prediction>, ClassifierError>;
}

/// Laplace smoothing constant for token likelihoods.
const SMOOTHING: f64 = 1.0;

/// Per-class token statistics.
struct ClassModel {
    key: String,
    log_prior: f64,
    token_counts: HashMap<String, usize>,
    total_tokens: usize,
}

/// Multinomial naive-Bayes text classifier over lowercase word tokens.
pub struct NaiveBayesClassifier {
    classes: Vec<ClassModel>,
    vocabulary_size: usize,
}

impl NaiveBayesClassifier {
    /// Train from (question, answer-key) pairs. Questions sharing a key
    /// pool their token counts into one class.
    pub fn train(examples: &[(String, String)]) -> Result<Self, ClassifierError> {
        if examples.is_empty() {
            return Err(ClassifierError::NoExamples(
                "the report produced no question/answer pairs".to_string(),
            ));
        }

        let mut by_key: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut key_order: Vec<&str> = Vec::new();
        for (question, key) in examples {
            let entry = by_key.entry(key.as_str()).or_insert_with(|| {
                key_order.push(key.as_str());
                Vec::new()
            });
            entry.push(question.as_str());
        }

        let total_examples = examples.len() as f64;
        let mut vocabulary: HashSet<String> = HashSet::new();
        let mut classes = Vec::with_capacity(key_order.len());

        for key in key_order {
            let questions = &by_key[key];
            let mut token_counts: HashMap<String, usize> = HashMap::new();
            let mut total_tokens = 0;

            for question in questions {
                for token in tokenize(question) {
                    vocabulary.insert(token.clone());
                    *token_counts.entry(token).or_insert(0) += 1;
                    total_tokens += 1;
                }
            }

            classes.push(ClassModel {
                key: key.to_string(),
                log_prior: (questions.len() as f64 / total_examples).ln(),
                token_counts,
                total_tokens,
            });
        }

        Ok(NaiveBayesClassifier {
            classes,
            vocabulary_size: vocabulary.len().max(1),
        })
    }
}

impl QuestionClassifier for NaiveBayesClassifier {
    fn classify(&self, query: &str) -> Result<Option<Prediction>, ClassifierError> {
        let tokens = tokenize(query);
        if tokens.is_empty() || self.classes.is_empty() {
            return Ok(None);
        }

        // Log-posterior per class, then softmax for a [0, 1] confidence.
        let mut scores: Vec<f64> = Vec::with_capacity(self.classes.len());
        for class in &self.classes {
            let mut score = class.log_prior;
            for token in &tokens {
                let count = class.token_counts.get(token).copied().unwrap_or(0) as f64;
                let denom = class.total_tokens as f64 + SMOOTHING * self.vocabulary_size as f64;
                score += ((count + SMOOTHING) / denom).ln();
            }
            scores.push(score);
        }

        let (best_idx, best_score) = scores
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .expect("classes is non-empty");

        let normalizer: f64 = scores.iter().map(|s| (s - best_score).exp()).sum();
        let confidence = 1.0 / normalizer;

        Ok(Some(Prediction {
            key: self.classes[best_idx].key.clone(),
            confidence: Some(confidence),
        }))
    }
}

/// Lowercase word tokens, alphanumerics only.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
