use std::collections::BTreeMap;

use crate::report::report_model::ReportSummary;
use crate::runner::run_state::{RunState, Score, TestResult};

const RULE: usize = 80;

// ============================================================================
// Plain-text reporter: the report file written after a run
// ============================================================================

/// Render the full plain-text report.
///
/// Sections: header with totals, tested/skipped fields, executive summary,
/// per-field detailed results, vulnerabilities, recommendations.
pub fn generate_text_report(state: &RunState, summary: &ReportSummary) -> String {
    let heavy = "=".repeat(RULE);
    let light = "-".repeat(RULE);
    let mut out = String::new();

    out.push_str(&format!("{}\n", heavy));
    out.push_str("FORM VALIDATION TEST REPORT\n");
    out.push_str(&format!("{}\n", heavy));
    out.push_str(&format!("URL: {}\n", summary.target_url));
    out.push_str(&format!("Test Date: {}\n", summary.generated_at));
    out.push_str(&format!("Total Tests: {}\n", summary.total));
    out.push_str(&format!("Passed: {} ({:.1}%)\n", summary.passed, summary.pass_rate));
    out.push_str(&format!("Failed: {} ({:.1}%)\n", summary.failed, summary.fail_rate));
    out.push_str(&format!("Inconclusive: {}\n", summary.inconclusive));
    out.push_str(&format!("Vulnerabilities Found: {}\n", summary.vulnerabilities));
    if let Some(ms) = summary.duration_ms {
        out.push_str(&format!("Duration: {:.1}s\n", ms as f64 / 1000.0));
    }
    out.push_str(&format!("{}\n\n", heavy));

    out.push_str("Fields Tested:\n");
    push_list(&mut out, &state.tested_fields);
    out.push_str("\nFields Skipped:\n");
    push_list(&mut out, &state.skipped_fields);
    out.push('\n');

    // Executive summary
    out.push_str(&format!("{}\nEXECUTIVE SUMMARY\n{}\n", heavy, heavy));
    if state.vulnerabilities.is_empty() {
        out.push_str("No validation vulnerabilities were found.\n");
    } else {
        out.push_str(&format!(
            "{} validation vulnerabilities found (invalid input accepted):\n",
            state.vulnerabilities.len()
        ));
        for v in &state.vulnerabilities {
            out.push_str(&format!("  - {}: {} (input: {})\n", v.field, v.description, v.input));
        }
    }
    if summary.inconclusive > 0 {
        out.push_str(&format!(
            "{} test(s) were INCONCLUSIVE: neither acceptance nor rejection was observed. \
             These are counted as failures and need manual review.\n",
            summary.inconclusive
        ));
    }
    out.push('\n');

    // Detailed results, grouped by field in run order
    out.push_str(&format!("{}\nDETAILED TEST RESULTS\n{}\n", heavy, heavy));
    for (field, results) in group_by_field(state) {
        out.push_str(&format!("\n{} FIELD TESTS\n{}\n", field.to_uppercase(), light));
        for r in results {
            push_result(&mut out, r);
        }
    }
    out.push('\n');

    out.push_str(&format!("{}\nSECURITY VULNERABILITIES\n{}\n", heavy, heavy));
    if state.vulnerabilities.is_empty() {
        out.push_str("None.\n");
    }
    for (i, v) in state.vulnerabilities.iter().enumerate() {
        out.push_str(&format!("\nVulnerability #{}\n", i + 1));
        out.push_str(&format!("  Field: {}\n", v.field));
        out.push_str(&format!("  Input: {}\n", v.input));
        out.push_str(&format!("  Issue: {}\n", v.description));
    }
    out.push('\n');

    out.push_str(&format!("{}\nRECOMMENDATIONS\n{}\n", heavy, heavy));
    if summary.recommendations.is_empty() {
        out.push_str("No changes recommended.\n");
    }
    for rec in &summary.recommendations {
        out.push_str(&format!("{}\n", rec));
    }

    out.push_str(&format!("\n{}\nEND OF REPORT\n{}\n", heavy, heavy));
    out
}

fn push_list(out: &mut String, items: &[String]) {
    if items.is_empty() {
        out.push_str("  (none)\n");
    }
    for item in items {
        out.push_str(&format!("  - {}\n", item));
    }
}

fn push_result(out: &mut String, r: &TestResult) {
    let marker = match r.score {
        Score::Inconclusive => "INCONCLUSIVE",
        _ if r.passed => "PASS",
        _ => "FAIL",
    };
    out.push_str(&format!("[{}] {}\n", marker, r.label));
    out.push_str(&format!("  Input: {}\n", r.input));
    out.push_str(&format!("  {}\n", r.status));
    out.push_str(&format!("  Reason: {}\n", r.reason));
}

/// Results per field, fields in the order they were tested.
fn group_by_field(state: &RunState) -> Vec<(&str, Vec<&TestResult>)> {
    let mut groups: BTreeMap<usize, (&str, Vec<&TestResult>)> = BTreeMap::new();
    for r in &state.results {
        let pos = state
            .tested_fields
            .iter()
            .position(|f| *f == r.field)
            .unwrap_or(usize::MAX);
        groups
            .entry(pos)
            .or_insert_with(|| (r.field.as_str(), Vec::new()))
            .1
            .push(r);
    }
    groups.into_values().collect()
}
