use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::browser::driver::{FormDriver, Locator, Probe, probe_enabled, probe_visible, tolerate};
use crate::classifier::outcome::{AttemptOutcome, OutcomeReason};
use crate::error::DriverError;
use crate::signature::capture::{capture, visible_texts};
use crate::signature::diff::{describe_changes, signature_diff};
use crate::signature::signature_model::FormSignature;

/// Page state recorded just before the submit click.
#[derive(Debug, Clone, Default)]
pub struct Baseline {
    pub url: String,
    pub signature: Option<FormSignature>,
    /// `None` when the submit control could not be probed
    pub submit_enabled: Option<bool>,
}

impl Baseline {
    pub fn at(url: &str) -> Self {
        Baseline {
            url: url.to_string(),
            ..Default::default()
        }
    }

    pub fn with_signature(mut self, signature: FormSignature) -> Self {
        self.signature = Some(signature);
        self
    }

    pub fn with_submit_enabled(mut self, enabled: bool) -> Self {
        self.submit_enabled = Some(enabled);
        self
    }
}

/// Everything a heuristic may consult after the submit click.
pub struct Observation<'a> {
    pub driver: &'a mut dyn FormDriver,
    pub baseline: &'a Baseline,
}

/// One link of the classification chain.
///
/// `Ok(None)` means "no opinion": the next heuristic is consulted.
/// Only fatal session errors are returned as `Err`.
pub trait Heuristic {
    fn name(&self) -> &'static str;
    fn evaluate(&self, obs: &mut Observation<'_>) -> Result<Option<AttemptOutcome>, DriverError>;
}

// ============================================================================
// 1. URL change + success keyword
// ============================================================================

pub struct UrlKeywordHeuristic {
    pub keywords: Vec<String>,
}

impl Heuristic for UrlKeywordHeuristic {
    fn name(&self) -> &'static str {
        "url_change"
    }

    fn evaluate(&self, obs: &mut Observation<'_>) -> Result<Option<AttemptOutcome>, DriverError> {
        let url = match Probe::from_result(obs.driver.current_url())? {
            Probe::Present(url) => url,
            _ => return Ok(None),
        };

        if url == obs.baseline.url {
            return Ok(None);
        }

        let lower = url.to_lowercase();
        if self.keywords.iter().any(|k| lower.contains(&k.to_lowercase())) {
            return Ok(Some(AttemptOutcome::accepted(OutcomeReason::UrlChanged { url })));
        }

        debug!(url = %url, "URL changed without a success keyword");
        Ok(None)
    }
}

// ============================================================================
// 2 / 4. Indicator selector visibility
// ============================================================================

pub struct SuccessSelectorHeuristic {
    pub selectors: Vec<Locator>,
}

impl Heuristic for SuccessSelectorHeuristic {
    fn name(&self) -> &'static str {
        "success_message"
    }

    fn evaluate(&self, obs: &mut Observation<'_>) -> Result<Option<AttemptOutcome>, DriverError> {
        Ok(first_visible(obs.driver, &self.selectors)?.map(|selector| {
            AttemptOutcome::accepted(OutcomeReason::SuccessMessage { selector })
        }))
    }
}

pub struct ErrorSelectorHeuristic {
    pub selectors: Vec<Locator>,
}

impl Heuristic for ErrorSelectorHeuristic {
    fn name(&self) -> &'static str {
        "error_message"
    }

    fn evaluate(&self, obs: &mut Observation<'_>) -> Result<Option<AttemptOutcome>, DriverError> {
        Ok(first_visible(obs.driver, &self.selectors)?
            .map(|selector| AttemptOutcome::rejected(OutcomeReason::ErrorMessage { selector })))
    }
}

fn first_visible(
    driver: &mut dyn FormDriver,
    selectors: &[Locator],
) -> Result<Option<String>, DriverError> {
    for selector in selectors {
        if probe_visible(driver, selector)?.is_present() {
            return Ok(Some(selector.to_string()));
        }
    }
    Ok(None)
}

// ============================================================================
// 3. Inline validation text
// ============================================================================

pub struct InlineErrorHeuristic {
    pub keywords: Vec<String>,
}

impl InlineErrorHeuristic {
    /// First text (document order) containing any rejection keyword.
    pub fn find_error<'t>(&self, texts: &'t [String]) -> Option<&'t String> {
        texts
            .iter()
            .find(|t| self.keywords.iter().any(|k| t.contains(&k.to_lowercase())))
    }
}

impl Heuristic for InlineErrorHeuristic {
    fn name(&self) -> &'static str {
        "inline_error"
    }

    fn evaluate(&self, obs: &mut Observation<'_>) -> Result<Option<AttemptOutcome>, DriverError> {
        let texts = match visible_texts(obs.driver)? {
            Probe::Present(texts) => texts,
            _ => return Ok(None),
        };

        Ok(self.find_error(&texts).map(|text| {
            AttemptOutcome::rejected(OutcomeReason::InlineValidationError { text: text.clone() })
        }))
    }
}

// ============================================================================
// 5. Form step advanced
// ============================================================================

pub struct SignatureDiffHeuristic {
    pub settle_ms: u64,
}

impl Heuristic for SignatureDiffHeuristic {
    fn name(&self) -> &'static str {
        "signature_diff"
    }

    fn evaluate(&self, obs: &mut Observation<'_>) -> Result<Option<AttemptOutcome>, DriverError> {
        let previous = match &obs.baseline.signature {
            Some(sig) => sig,
            None => return Ok(None),
        };

        let settle = self.settle_ms;
        tolerate(obs.driver, "settle", |d| d.wait(settle))?;

        let current = match capture(obs.driver)? {
            Probe::Present(sig) => sig,
            _ => return Ok(None),
        };

        if current == *previous {
            return Ok(None);
        }

        let changes = describe_changes(&signature_diff(previous, &current));
        Ok(Some(AttemptOutcome::accepted(OutcomeReason::StepAdvanced { changes })))
    }
}

// ============================================================================
// 6. Submit control disabled
// ============================================================================

/// How to read "submit control became disabled on click". Ambiguous: a form that
/// consumed the step and one that disabled the button on a client error look
/// the same, so each target chooses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisabledSubmitPolicy {
    #[default]
    Accepted,
    Rejected,
    Ignore,
}

pub struct DisabledSubmitHeuristic {
    pub submit: Locator,
    pub policy: DisabledSubmitPolicy,
}

impl Heuristic for DisabledSubmitHeuristic {
    fn name(&self) -> &'static str {
        "submit_disabled"
    }

    fn evaluate(&self, obs: &mut Observation<'_>) -> Result<Option<AttemptOutcome>, DriverError> {
        if self.policy == DisabledSubmitPolicy::Ignore {
            return Ok(None);
        }

        // A control that was already disabled before the click says nothing
        // about this submission.
        if obs.baseline.submit_enabled != Some(true) {
            return Ok(None);
        }

        match probe_enabled(obs.driver, &self.submit)? {
            Probe::Present(false) => Ok(Some(match self.policy {
                DisabledSubmitPolicy::Rejected => {
                    AttemptOutcome::rejected(OutcomeReason::SubmitDisabled)
                }
                _ => AttemptOutcome::accepted(OutcomeReason::SubmitDisabled),
            })),
            _ => Ok(None),
        }
    }
}
