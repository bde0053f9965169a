//! Ordered deterministic intent rules.
//!
//! Rule order encodes precedence: the first matching rule wins, and
//! reordering silently changes which intent a query resolves to. The
//! ordering below is a tested invariant — suite-scoped counts must be
//! tried before unscoped counts, and failed-at-least-once listing before
//! plain failed listing.

use regex::{Regex, RegexSet};

use crate::models::{Intent, StatusKind};

/// Deterministic rule kinds in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    LastRun,
    FlakyExistence,
    SuiteStatusCount,
    StatusCount,
    TotalCount,
    ListFailedOnce,
    ListFailed,
    ListPassed,
    ListFlaky,
}

/// One (kind, pattern) pair in the cascade.
pub struct IntentRule {
    pub kind: RuleKind,
    pub pattern: Regex,
}

/// A deterministic match with its captured parameters.
#[derive(Debug, PartialEq)]
pub struct RuleMatch {
    pub kind: RuleKind,
    pub status: Option<StatusKind>,
    pub suite: Option<String>,
}

/// Build the rule cascade in its documented order.
pub fn intent_rules() -> Vec<IntentRule> {
    let rule = |kind, pattern: &str| IntentRule {
        kind,
        pattern: Regex::new(pattern).expect("intent pattern must compile"),
    };

    vec![
        rule(
            RuleKind::LastRun,
            r"(?i)\blast\s+(test\s+)?run\b|\bmost\s+recent\s+test\b|\bprevious\s+run\b|\blast\s+run\s+test\b",
        ),
        rule(
            RuleKind::FlakyExistence,
            r"(?i)\b(any|are\s+there|do\s+we\s+have|got|is\s+there)\b.*\bflaky\b",
        ),
        rule(
            RuleKind::SuiteStatusCount,
            r"(?i)how\s+many\s+(?:tests\s+)?(?P<status>passed|failed|skipped|flaky)\s+(?:tests\s+)?(?:in|for|on|under)\s+['\x22]?(?P<suite>[^'\x22?]+?)['\x22]?\s*\??\s*$",
        ),
        rule(
            RuleKind::StatusCount,
            r"(?i)(?:how\s+many|number\s+of|count\s+of)\s+(?:tests\s+)?(?P<status>passed|failed|skipped|flaky)|how\s+many\s+tests\s+(?P<status2>passed|failed|skipped)\b",
        ),
        rule(
            RuleKind::TotalCount,
            r"(?i)how\s+many\s+tests\b|\btotal\s+(number\s+of\s+)?tests\b|\btests?\s+in\s+total\b",
        ),
        rule(
            RuleKind::ListFailedOnce,
            r"(?i)fail(ed)?\s+(at\s+least\s+once|once)\b|\bever\s+failed\b",
        ),
        rule(
            RuleKind::ListFailed,
            r"(?i)\b(list|show|which|what|give\s+me)\b.*\bfail(ed|ing|ures?)?\b|\bfailed\s+tests\b",
        ),
        rule(
            RuleKind::ListPassed,
            r"(?i)\b(list|show|which|what|give\s+me)\b.*\bpass(ed|ing)?\b|\bpassed\s+tests\b",
        ),
        rule(
            RuleKind::ListFlaky,
            r"(?i)\b(list|show|which|what|give\s+me)\b.*\bflaky\b|\bflaky\s+tests\b",
        ),
    ]
}

/// Try the cascade; first match wins.
pub fn match_rules(rules: &[IntentRule], query: &str) -> Option<RuleMatch> {
    for rule in rules {
        let Some(caps) = rule.pattern.captures(query) else {
            continue;
        };

        let status = caps
            .name("status")
            .or_else(|| caps.name("status2"))
            .and_then(|m| StatusKind::parse(m.as_str()));
        let suite = caps
            .name("suite")
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty());

        return Some(RuleMatch {
            kind: rule.kind,
            status,
            suite,
        });
    }
    None
}

/// Greeting/pleasantry detector.
pub fn greeting_patterns() -> RegexSet {
    RegexSet::new([
        r"(?i)^\s*hi\b",
        r"(?i)^\s*hello\b",
        r"(?i)^\s*hey\b",
        r"(?i)\bgood\s*(morning|afternoon|evening)\b",
        r"(?i)\bhow\s*are\s*you\b",
        r"(?i)\bhow\s*r\s*you\b",
        r"(?i)^\s*gm\s*[!.]?\s*$",
        r"(?i)^\s*gn\s*[!.]?\s*$",
    ])
    .expect("greeting patterns must compile")
}

/// A query too vague to answer per-test: bare "test(s)"/"result(s)",
/// optionally with a trailing question mark.
pub fn is_vague(query: &str) -> bool {
    let trimmed = query.trim().trim_end_matches('?').trim().to_lowercase();
    matches!(trimmed.as_str(), "test" | "tests" | "result" | "results")
}

/// Map a rule match onto the public intent classification.
pub fn intent_of(m: &RuleMatch) -> Intent {
    match m.kind {
        RuleKind::LastRun => Intent::LastRun,
        RuleKind::FlakyExistence | RuleKind::ListFlaky => Intent::ListFlaky,
        RuleKind::SuiteStatusCount => Intent::CountInSuite {
            status: m.status.unwrap_or(StatusKind::Failed),
            suite: m.suite.clone().unwrap_or_default(),
        },
        RuleKind::StatusCount => Intent::Count {
            status: m.status.unwrap_or(StatusKind::Failed),
        },
        RuleKind::TotalCount => Intent::Total,
        RuleKind::ListFailedOnce => Intent::ListFailedOnce,
        RuleKind::ListFailed => Intent::ListFailed,
        RuleKind::ListPassed => Intent::ListPassed,
    }
}
