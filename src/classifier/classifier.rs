use tracing::debug;

use crate::browser::driver::{FormDriver, Locator};
use crate::classifier::heuristics::{
    Baseline, DisabledSubmitHeuristic, ErrorSelectorHeuristic, Heuristic, InlineErrorHeuristic, Observation,
    SignatureDiffHeuristic, SuccessSelectorHeuristic, UrlKeywordHeuristic,
};
use crate::classifier::outcome::AttemptOutcome;
use crate::cli::config::DetectionConfig;
use crate::error::DriverError;

/// Ordered chain of heuristics. The first one with an opinion wins.
pub struct Classifier {
    heuristics: Vec<Box<dyn Heuristic>>,
}

impl Classifier {
    pub fn new(heuristics: Vec<Box<dyn Heuristic>>) -> Self {
        Self { heuristics }
    }

    /// The standard chain: URL, success selector, inline error, error
    /// selector, step change, disabled submit.
    ///
    /// Negative signals sit before the positive fallbacks so a step that
    /// advances while also showing an inline error is still a rejection.
    pub fn from_config(detection: &DetectionConfig, submit: &Locator, signature_settle_ms: u64) -> Self {
        Self::new(vec![
            Box::new(UrlKeywordHeuristic {
                keywords: detection.success_url_keywords.clone(),
            }),
            Box::new(SuccessSelectorHeuristic {
                selectors: detection.success_selectors.clone(),
            }),
            Box::new(InlineErrorHeuristic {
                keywords: detection.inline_error_keywords.clone(),
            }),
            Box::new(ErrorSelectorHeuristic {
                selectors: detection.error_selectors.clone(),
            }),
            Box::new(SignatureDiffHeuristic {
                settle_ms: signature_settle_ms,
            }),
            Box::new(DisabledSubmitHeuristic {
                submit: submit.clone(),
                policy: detection.disabled_submit_means,
            }),
        ])
    }

    pub fn heuristic_names(&self) -> Vec<&'static str> {
        self.heuristics.iter().map(|h| h.name()).collect()
    }

    /// Classify the page state following a submit click against the
    /// state recorded before it.
    pub fn classify(
        &self,
        driver: &mut dyn FormDriver,
        baseline: &Baseline,
    ) -> Result<AttemptOutcome, DriverError> {
        let mut obs = Observation { driver, baseline };

        for heuristic in &self.heuristics {
            if let Some(outcome) = heuristic.evaluate(&mut obs)? {
                debug!(heuristic = heuristic.name(), verdict = %outcome.verdict, "classified");
                return Ok(outcome);
            }
        }

        Ok(AttemptOutcome::inconclusive())
    }
}
