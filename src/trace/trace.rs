use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::classifier::outcome::{AttemptOutcome, Verdict};
use crate::runner::run_state::TestResult;

/// One JSONL line per attempted test case.
#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp: String,
    pub field: String,
    pub label: String,
    pub input: String,

    pub verdict: Verdict,
    pub reason: String,
    pub passed: bool,

    pub url_before: String,
    pub signature_before: Option<String>,

    /// Fields whose element could not be filled
    pub unfilled: Vec<String>,
}

impl TraceEvent {
    pub fn now(result: &TestResult, outcome: &AttemptOutcome) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            field: result.field.clone(),
            label: result.label.clone(),
            input: result.input.clone(),
            verdict: outcome.verdict,
            reason: outcome.reason.to_string(),
            passed: result.passed,
            url_before: String::new(),
            signature_before: None,
            unfilled: vec![],
        }
    }

    pub fn with_before(mut self, url: &str, signature_fingerprint: Option<String>) -> Self {
        self.url_before = url.to_string();
        self.signature_before = signature_fingerprint;
        self
    }

    pub fn with_unfilled(mut self, unfilled: Vec<String>) -> Self {
        self.unfilled = unfilled;
        self
    }
}
