use serde::Serialize;

use crate::error::ProberError;
use crate::report::report_model::ReportSummary;
use crate::runner::run_state::RunState;

#[derive(Serialize)]
struct JsonReport<'a> {
    summary: &'a ReportSummary,
    #[serde(flatten)]
    state: &'a RunState,
}

/// Summary plus the full run log as pretty JSON.
pub fn generate_json_report(state: &RunState, summary: &ReportSummary) -> Result<String, ProberError> {
    serde_json::to_string_pretty(&JsonReport { summary, state })
        .map_err(|e| ProberError::Report(format!("JSON serialization failed: {}", e)))
}
