use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::runner::run_state::{RunState, Vulnerability};

// ============================================================================
// Run report: counters and derived percentages
// ============================================================================

/// Aggregated view of a finished run, consumed by the text, JUnit and JSON
/// renderers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub target_url: String,
    pub generated_at: String,

    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Subset of `failed` with no signal either way
    pub inconclusive: usize,
    pub vulnerabilities: usize,

    pub pass_rate: f64,
    pub fail_rate: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,

    pub recommendations: Vec<String>,
}

impl ReportSummary {
    pub fn from_state(state: &RunState, now: DateTime<Local>) -> Self {
        Self {
            target_url: state.target_url.clone(),
            generated_at: now.format("%Y-%m-%d %H:%M:%S").to_string(),
            total: state.total,
            passed: state.passed,
            failed: state.failed,
            inconclusive: state.inconclusive,
            vulnerabilities: state.vulnerabilities.len(),
            pass_rate: percent(state.passed, state.total),
            fail_rate: percent(state.failed, state.total),
            duration_ms: state.duration_ms,
            recommendations: recommendations(&state.vulnerabilities),
        }
    }
}

/// Share of `part` in `total`, 0.0 when nothing ran.
pub fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

// ============================================================================
// Remediation mapping
// ============================================================================

/// (field, keyword in description, recommendation). An empty keyword
/// matches every description of that field.
pub const RECOMMENDATIONS: &[(&str, &str, &str)] = &[
    ("name", "alphanumeric", "- NAME: Add validation to reject numeric characters"),
    ("name", "special characters", "- NAME: Add validation to reject special characters"),
    ("name", "empty", "- NAME: Make field required (cannot be empty)"),
    ("age", "underage", "- AGE: Implement minimum age requirement (18+)"),
    ("age", "invalid", "- AGE: Add range validation (18-120)"),
    ("age", "negative", "- AGE: Add range validation (18-120)"),
    ("age", "alphabetic", "- AGE: Restrict input to numeric values only"),
    ("email", "", "- EMAIL: Implement proper email format validation (RFC 5322)"),
    ("password", "short", "- PASSWORD: Enforce minimum length (8+ characters)"),
    (
        "password",
        "weak",
        "- PASSWORD: Require strong password (uppercase, lowercase, numbers, special chars)",
    ),
    ("confirm_password", "", "- CONFIRM PASSWORD: Ensure password fields match before submission"),
    ("phone", "alphanumeric", "- PHONE: Restrict to numeric values only"),
    ("phone", "short", "- PHONE: Enforce exact length (10 digits)"),
    ("phone", "long", "- PHONE: Enforce exact length (10 digits)"),
    ("dob", "future", "- DOB: Validate date is not in the future"),
    ("dob", "underage", "- DOB: Ensure user is at least 18 years old"),
    ("dob", "format", "- DOB: Use proper date picker (YYYY-MM-DD)"),
    ("otp", "short", "- OTP: Enforce exactly 6 digits"),
    ("otp", "long", "- OTP: Enforce exactly 6 digits"),
    ("otp", "alphabetic", "- OTP: Accept only numeric values"),
    ("otp", "alphanumeric", "- OTP: Accept only numeric values"),
];

/// Remediation advice for the vulnerabilities found, deduplicated, in order
/// of first appearance.
pub fn recommendations(vulns: &[Vulnerability]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();

    for vuln in vulns {
        let description = vuln.description.to_lowercase();
        for (field, keyword, text) in RECOMMENDATIONS {
            if vuln.field != *field || !description.contains(keyword) {
                continue;
            }
            if !out.iter().any(|r| r == text) {
                out.push(text.to_string());
            }
        }
    }

    out
}

// ============================================================================
// Output naming
// ============================================================================

/// `<host without www.>-<HHMMSS>.txt`, falling back to `form` for URLs
/// without a host.
pub fn report_filename(url: &str, now: DateTime<Local>) -> String {
    let host = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .map(|h| h.strip_prefix("www.").map(str::to_string).unwrap_or(h))
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "form".to_string());

    format!("{}-{}.txt", host, now.format("%H%M%S"))
}

/// Output format of the written report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Junit,
    Json,
}

impl ReportFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "junit" | "xml" => Some(ReportFormat::Junit),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Junit => "xml",
            ReportFormat::Json => "json",
        }
    }
}
