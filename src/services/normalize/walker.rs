//! Schema-tolerant traversal of raw report trees.
//!
//! Browser-runner reports arrive in more than one shape; the walker hides
//! that behind a single lazy sequence of per-test nodes with their
//! suite/spec lineage. Unknown or absent keys yield empty sequences, never
//! errors.

use serde_json::Value;

/// A raw test node with its resolved lineage.
///
/// Titles are raw (possibly empty) here; the record builder applies the
/// placeholder defaults.
#[derive(Debug)]
pub struct WalkedTest<'a> {
    pub suite_title: String,
    pub spec_title: String,
    pub test: &'a Value,
}

/// Walk a raw report, yielding every leaf test node lazily.
///
/// Handles both known top-level layouts:
/// - `{suites: [...]}` with `specs[].tests[]`, direct `tests[]`, and
///   arbitrarily nested child `suites[]` (depth-first);
/// - `{results: [...]}` where each result carries its own suite/title
///   metadata and a `tests[]` array.
///
/// The walk is restartable: call again on a retained report to re-walk.
pub fn walk_report(report: &Value) -> ReportWalker<'_> {
    let mut stack = Vec::new();

    if let Some(suites) = report.get("suites").and_then(Value::as_array) {
        for suite in suites.iter().rev() {
            stack.push(Task::Suite {
                suite,
                inherited: None,
            });
        }
    } else if let Some(results) = report.get("results").and_then(Value::as_array) {
        for result in results.iter().rev() {
            stack.push(Task::FlatResult { result });
        }
    }

    ReportWalker { stack }
}

/// Lazy depth-first iterator over a report's test nodes.
pub struct ReportWalker<'a> {
    stack: Vec<Task<'a>>,
}

enum Task<'a> {
    Suite {
        suite: &'a Value,
        inherited: Option<String>,
    },
    FlatResult {
        result: &'a Value,
    },
    Test {
        suite_title: String,
        spec_title: String,
        test: &'a Value,
    },
}

/// First non-empty string among a node's candidate title fields.
fn str_field(node: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| node.get(k))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn array_field<'a>(node: &'a Value, key: &str) -> &'a [Value] {
    node.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

impl<'a> Iterator for ReportWalker<'a> {
    type Item = WalkedTest<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(task) = self.stack.pop() {
            match task {
                Task::Test {
                    suite_title,
                    spec_title,
                    test,
                } => {
                    return Some(WalkedTest {
                        suite_title,
                        spec_title,
                        test,
                    });
                }
                Task::Suite { suite, inherited } => self.expand_suite(suite, inherited),
                Task::FlatResult { result } => self.expand_flat_result(result),
            }
        }
        None
    }
}

impl<'a> ReportWalker<'a> {
    /// Push a suite's children so they pop in document order: spec tests
    /// first, then direct tests, then nested suites.
    fn expand_suite(&mut self, suite: &'a Value, inherited: Option<String>) {
        // A nested suite without its own title inherits the enclosing
        // suite's title; titles are never concatenated across levels.
        let suite_title = str_field(suite, &["title", "name", "file"])
            .or(inherited)
            .unwrap_or_default();

        for child in array_field(suite, "suites").iter().rev() {
            self.stack.push(Task::Suite {
                suite: child,
                inherited: Some(suite_title.clone()),
            });
        }

        // Tests directly under the suite borrow its title as spec title.
        for test in array_field(suite, "tests").iter().rev() {
            self.stack.push(Task::Test {
                suite_title: suite_title.clone(),
                spec_title: suite_title.clone(),
                test,
            });
        }

        for spec in array_field(suite, "specs").iter().rev() {
            let spec_title = str_field(spec, &["title", "file"]).unwrap_or_default();
            for test in array_field(spec, "tests").iter().rev() {
                self.stack.push(Task::Test {
                    suite_title: suite_title.clone(),
                    spec_title: spec_title.clone(),
                    test,
                });
            }
        }
    }

    /// Alternate flat layout: each result carries suite metadata and tests.
    fn expand_flat_result(&mut self, result: &'a Value) {
        let suite_title = result
            .get("suite")
            .and_then(|s| str_field(s, &["title", "name"]))
            .unwrap_or_default();
        let spec_title = str_field(result, &["file", "title"]).unwrap_or_default();

        for test in array_field(result, "tests").iter().rev() {
            self.stack.push(Task::Test {
                suite_title: suite_title.clone(),
                spec_title: spec_title.clone(),
                test,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_specs_layout() {
        let report = json!({
            "suites": [{
                "title": "Login",
                "specs": [{
                    "title": "login.spec.ts",
                    "tests": [{"title": "a"}, {"title": "b"}]
                }]
            }]
        });

        let walked: Vec<_> = walk_report(&report).collect();
        assert_eq!(walked.len(), 2);
        assert_eq!(walked[0].suite_title, "Login");
        assert_eq!(walked[0].spec_title, "login.spec.ts");
        assert_eq!(walked[0].test["title"], "a");
        assert_eq!(walked[1].test["title"], "b");
    }

    #[test]
    fn test_direct_tests_default_spec_to_suite_title() {
        let report = json!({
            "suites": [{
                "title": "Checkout",
                "tests": [{"title": "pays"}]
            }]
        });

        let walked: Vec<_> = walk_report(&report).collect();
        assert_eq!(walked.len(), 1);
        assert_eq!(walked[0].suite_title, "Checkout");
        assert_eq!(walked[0].spec_title, "Checkout");
    }

    #[test]
    fn test_nested_suites_depth_first() {
        let report = json!({
            "suites": [{
                "title": "Outer",
                "specs": [{"title": "outer.spec", "tests": [{"title": "first"}]}],
                "suites": [{
                    "title": "Inner",
                    "specs": [{"title": "inner.spec", "tests": [{"title": "second"}]}]
                }]
            }]
        });

        let walked: Vec<_> = walk_report(&report).collect();
        assert_eq!(walked.len(), 2);
        assert_eq!(walked[0].suite_title, "Outer");
        assert_eq!(walked[1].suite_title, "Inner");
    }

    #[test]
    fn test_untitled_nested_suite_inherits_title() {
        let report = json!({
            "suites": [{
                "name": "Parent",
                "suites": [{
                    "tests": [{"title": "orphan"}]
                }]
            }]
        });

        let walked: Vec<_> = walk_report(&report).collect();
        assert_eq!(walked.len(), 1);
        assert_eq!(walked[0].suite_title, "Parent");
    }

    #[test]
    fn test_flat_results_layout() {
        let report = json!({
            "results": [{
                "suite": {"name": "Smoke"},
                "file": "smoke.spec.ts",
                "tests": [{"title": "boots"}]
            }]
        });

        let walked: Vec<_> = walk_report(&report).collect();
        assert_eq!(walked.len(), 1);
        assert_eq!(walked[0].suite_title, "Smoke");
        assert_eq!(walked[0].spec_title, "smoke.spec.ts");
    }

    #[test]
    fn test_unknown_shapes_yield_nothing() {
        assert_eq!(walk_report(&json!({})).count(), 0);
        assert_eq!(walk_report(&json!({"weird": [1, 2]})).count(), 0);
        assert_eq!(walk_report(&json!({"suites": "not-an-array"})).count(), 0);
        assert_eq!(walk_report(&json!(null)).count(), 0);
    }

    #[test]
    fn test_walk_is_restartable() {
        let report = json!({
            "suites": [{"title": "S", "tests": [{"title": "t"}]}]
        });

        assert_eq!(walk_report(&report).count(), 1);
        assert_eq!(walk_report(&report).count(), 1);
    }
}
