use crate::report::report_model::ReportSummary;
use crate::runner::run_state::{RunState, Score};

// ============================================================================
// JUnit XML reporter: CI integration format
// ============================================================================

/// One `<testsuite>` per run, one `<testcase>` per test result.
///
/// Vulnerabilities are `<failure type="Vulnerability">`, rejected valid input
/// is `<failure type="FalseNegative">` and inconclusive results are
/// `<error type="Inconclusive">`.
pub fn generate_junit_xml(state: &RunState, summary: &ReportSummary) -> String {
    let time_attr = summary
        .duration_ms
        .map(|ms| format!(" time=\"{:.3}\"", ms as f64 / 1000.0))
        .unwrap_or_default();

    let mut cases = String::new();
    for result in &state.results {
        let name = escape_xml(&format!("{}: {}", result.label, result.input));
        let classname = escape_xml(&format!("form-prober.{}", result.field));

        let (tag, kind) = match result.score {
            Score::TruePositive | Score::TrueNegative => {
                cases.push_str(&format!(
                    "  <testcase name=\"{}\" classname=\"{}\" />\n",
                    name, classname
                ));
                continue;
            }
            Score::FalsePositive => ("failure", "Vulnerability"),
            Score::FalseNegative => ("failure", "FalseNegative"),
            Score::Inconclusive => ("error", "Inconclusive"),
        };

        cases.push_str(&format!(
            "  <testcase name=\"{name}\" classname=\"{classname}\">\n    <{tag} message=\"{message}\" type=\"{kind}\">{body}</{tag}>\n  </testcase>\n",
            name = name,
            classname = classname,
            tag = tag,
            message = escape_xml(&result.status),
            kind = kind,
            body = escape_xml(&result.reason),
        ));
    }

    let errors = summary.inconclusive;
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<testsuite name=\"{name}\" tests=\"{tests}\" failures=\"{failures}\" errors=\"{errors}\"{time}>\n{cases}</testsuite>\n",
        name = escape_xml(&summary.target_url),
        tests = summary.total,
        failures = summary.failed.saturating_sub(errors),
        errors = errors,
        time = time_attr,
        cases = cases,
    )
}

/// Escape XML special characters.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
