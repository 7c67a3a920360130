use crate::report::report_model::ReportSummary;
use crate::runner::run_state::RunState;

/// Short end-of-run summary for the terminal.
///
/// ```text
/// === Form validation: https://example.com/register ===
/// ✗ VULN  password: Short Password (input: 12345)
///
/// === Results: 30 passed, 4 failed (1 inconclusive), 1 vulnerabilities (34 total) in 12.3s ===
/// ```
pub fn format_console_report(state: &RunState, summary: &ReportSummary) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== Form validation: {} ===\n", summary.target_url));

    for v in &state.vulnerabilities {
        out.push_str(&format!(
            "\u{2717} VULN  {}: {} (input: {})\n",
            v.field, v.description, v.input
        ));
    }
    if !state.skipped_fields.is_empty() {
        out.push_str(&format!("  skipped: {}\n", state.skipped_fields.join(", ")));
    }

    out.push_str(&format!(
        "\n=== Results: {} passed, {} failed ({} inconclusive), {} vulnerabilities ({} total)",
        summary.passed, summary.failed, summary.inconclusive, summary.vulnerabilities, summary.total
    ));

    if let Some(ms) = summary.duration_ms {
        out.push_str(&format!(" in {:.1}s", ms as f64 / 1000.0));
    }

    out.push_str(" ===\n");
    out
}
