use serde::{Deserialize, Serialize};

use crate::classifier::outcome::Verdict;

pub const EMPTY_INPUT_MARKER: &str = "[EMPTY]";

/// Expectation vs. outcome for one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Score {
    /// Valid input accepted
    TruePositive,
    /// Invalid input rejected
    TrueNegative,
    /// Valid input rejected: a testing gap, not a vulnerability
    FalseNegative,
    /// Invalid input accepted: a vulnerability
    FalsePositive,
    /// Neither signal observed
    Inconclusive,
}

impl Score {
    pub fn of(expected_valid: bool, verdict: Verdict) -> Self {
        match (expected_valid, verdict) {
            (_, Verdict::Inconclusive) => Score::Inconclusive,
            (true, Verdict::Accepted) => Score::TruePositive,
            (false, Verdict::Rejected) => Score::TrueNegative,
            (true, Verdict::Rejected) => Score::FalseNegative,
            (false, Verdict::Accepted) => Score::FalsePositive,
        }
    }

    pub fn passed(&self) -> bool {
        matches!(self, Score::TruePositive | Score::TrueNegative)
    }

    pub fn is_vulnerability(&self) -> bool {
        matches!(self, Score::FalsePositive)
    }

    pub fn status(&self, expected_valid: bool) -> String {
        let expected = if expected_valid { "VALID" } else { "INVALID" };
        let actual = match self {
            Score::TruePositive => "ACCEPTED",
            Score::TrueNegative => "REJECTED",
            Score::FalseNegative => "REJECTED (False Negative)",
            Score::FalsePositive => "ACCEPTED (Vulnerability!)",
            Score::Inconclusive => "INCONCLUSIVE",
        };
        format!("Expected: {} | Actual: {}", expected, actual)
    }
}

/// Outcome of one test case. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub field: String,
    pub label: String,
    /// Literal input, or `[EMPTY]` for blank input
    pub input: String,
    pub expected: Verdict,
    pub actual: Verdict,
    pub passed: bool,
    pub score: Score,
    pub status: String,
    /// Heuristic that produced the verdict
    pub reason: String,
}

impl TestResult {
    pub fn new(
        field: &str,
        label: &str,
        input: &str,
        expected_valid: bool,
        actual: Verdict,
        reason: &str,
    ) -> Self {
        let score = Score::of(expected_valid, actual);
        TestResult {
            field: field.to_string(),
            label: label.to_string(),
            input: display_input(input),
            expected: if expected_valid {
                Verdict::Accepted
            } else {
                Verdict::Rejected
            },
            actual,
            passed: score.passed(),
            score,
            status: score.status(expected_valid),
            reason: reason.to_string(),
        }
    }
}

pub fn display_input(input: &str) -> String {
    if input.is_empty() {
        EMPTY_INPUT_MARKER.to_string()
    } else {
        input.to_string()
    }
}

/// Invalid input the form wrongly accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub field: String,
    pub input: String,
    pub description: String,
}

/// Counters and logs for one run. Owned by the orchestrator while running.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunState {
    pub target_url: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub inconclusive: usize,
    pub tested_fields: Vec<String>,
    pub skipped_fields: Vec<String>,
    pub results: Vec<TestResult>,
    pub vulnerabilities: Vec<Vulnerability>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,
}

impl RunState {
    pub fn new(target_url: &str) -> Self {
        RunState {
            target_url: target_url.to_string(),
            ..Default::default()
        }
    }

    pub fn record(&mut self, result: TestResult) {
        self.total += 1;
        if result.passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        if result.score == Score::Inconclusive {
            self.inconclusive += 1;
        }
        if result.score.is_vulnerability() {
            self.vulnerabilities.push(Vulnerability {
                field: result.field.clone(),
                input: result.input.clone(),
                description: result.label.clone(),
            });
        }
        self.results.push(result);
    }

    pub fn skip(&mut self, field: &str) {
        self.skipped_fields.push(field.to_string());
    }

    pub fn has_vulnerabilities(&self) -> bool {
        !self.vulnerabilities.is_empty()
    }
}
