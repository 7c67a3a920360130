use std::fmt;

use serde::{Deserialize, Serialize};

/// Tri-state result of one submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Accepted,
    Rejected,
    Inconclusive,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verdict::Accepted => "ACCEPTED",
            Verdict::Rejected => "REJECTED",
            Verdict::Inconclusive => "INCONCLUSIVE",
        })
    }
}

/// Which heuristic produced a verdict, with the evidence it saw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutcomeReason {
    UrlChanged { url: String },
    SuccessMessage { selector: String },
    InlineValidationError { text: String },
    ErrorMessage { selector: String },
    StepAdvanced { changes: String },
    SubmitDisabled,
    Inconclusive,
}

impl fmt::Display for OutcomeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeReason::UrlChanged { .. } => f.write_str("URL changed"),
            OutcomeReason::SuccessMessage { selector } => {
                write!(f, "success message ({})", selector)
            }
            OutcomeReason::InlineValidationError { text } => {
                write!(f, "inline validation error: {}", text)
            }
            OutcomeReason::ErrorMessage { selector } => write!(f, "error message ({})", selector),
            OutcomeReason::StepAdvanced { changes } if changes.is_empty() => {
                f.write_str("step advanced")
            }
            OutcomeReason::StepAdvanced { changes } => write!(f, "step advanced ({})", changes),
            OutcomeReason::SubmitDisabled => {
                f.write_str("submission blocked by client-side completion")
            }
            OutcomeReason::Inconclusive => f.write_str("inconclusive"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptOutcome {
    pub verdict: Verdict,
    pub reason: OutcomeReason,
}

impl AttemptOutcome {
    pub fn accepted(reason: OutcomeReason) -> Self {
        AttemptOutcome {
            verdict: Verdict::Accepted,
            reason,
        }
    }

    pub fn rejected(reason: OutcomeReason) -> Self {
        AttemptOutcome {
            verdict: Verdict::Rejected,
            reason,
        }
    }

    pub fn inconclusive() -> Self {
        AttemptOutcome {
            verdict: Verdict::Inconclusive,
            reason: OutcomeReason::Inconclusive,
        }
    }
}
