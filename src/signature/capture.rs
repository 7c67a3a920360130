use tracing::debug;

use crate::browser::driver::{FormDriver, Probe, probe_eval};
use crate::error::DriverError;
use crate::signature::probe::{PageProbe, RawSignatureProbe, RawText};
use crate::signature::signature_model::{FormSignature, TEXT_FRAGMENT_CEILING};

/// Fingerprint the form step currently rendered by the driver.
///
/// Read-only. A probe that fails or returns an unexpected shape yields
/// `Probe::Failed`; only fatal session errors are returned as `Err`.
pub fn capture<D: FormDriver + ?Sized>(driver: &mut D) -> Result<Probe<FormSignature>, DriverError> {
    let value = match probe_eval(driver, PageProbe::FormSignature.script())? {
        Probe::Present(v) => v,
        Probe::Absent => return Ok(Probe::Absent),
        Probe::Failed(e) => return Ok(Probe::Failed(e)),
    };

    match serde_json::from_value::<RawSignatureProbe>(value) {
        Ok(raw) => {
            let signature = FormSignature::from_raw(&raw);
            debug!(
                fingerprint = %signature.fingerprint(),
                inputs = signature.input_count,
                "captured form signature"
            );
            Ok(Probe::Present(signature))
        }
        Err(e) => Ok(Probe::Failed(format!("malformed signature probe: {}", e))),
    }
}

/// Lower-cased text of visible short `p, span, div, small, label` nodes, in document order.
pub fn visible_texts<D: FormDriver + ?Sized>(driver: &mut D) -> Result<Probe<Vec<String>>, DriverError> {
    let value = match probe_eval(driver, PageProbe::VisibleTexts.script())? {
        Probe::Present(v) => v,
        Probe::Absent => return Ok(Probe::Absent),
        Probe::Failed(e) => return Ok(Probe::Failed(e)),
    };

    match serde_json::from_value::<Vec<RawText>>(value) {
        Ok(raw) => Ok(Probe::Present(short_visible_texts(&raw))),
        Err(e) => Ok(Probe::Failed(format!("malformed text probe: {}", e))),
    }
}

fn short_visible_texts(raw: &[RawText]) -> Vec<String> {
    raw.iter()
        .filter(|t| t.state.visible)
        .map(|t| t.text.trim().to_lowercase())
        .filter(|t| !t.is_empty() && t.chars().count() < TEXT_FRAGMENT_CEILING)
        .collect()
}
