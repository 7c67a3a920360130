use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::signature::probe::{RawInput, RawSignatureProbe, RawText};

/// Visible text nodes at or above this many characters are layout blocks, not fragments.
pub const TEXT_FRAGMENT_CEILING: usize = 200;
/// Upper bound on the joined text digest.
pub const TEXT_DIGEST_CEILING: usize = 500;
/// Number of visible fragments retained verbatim.
pub const MAX_VISIBLE_TEXTS: usize = 10;

pub const OTP_VOCABULARY: &[&str] = &["otp", "verify", "code", "6-digit", "enter 6"];
pub const EMAIL_VOCABULARY: &[&str] = &["email", "welcome"];

/// Attributes of one interactable input that identify its purpose.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputDescriptor {
    pub tag: String,
    pub input_type: String,
    pub name: String,
    pub id: String,
    pub placeholder: String,
    pub max_length: Option<u32>,
    pub pattern: String,
    pub input_mode: String,
    pub autocomplete: String,
}

impl From<&RawInput> for InputDescriptor {
    fn from(raw: &RawInput) -> Self {
        InputDescriptor {
            tag: raw.tag.to_lowercase(),
            input_type: raw.input_type.to_lowercase(),
            name: raw.name.clone(),
            id: raw.id.clone(),
            placeholder: raw.placeholder.clone(),
            max_length: u32::try_from(raw.max_length).ok(),
            pattern: raw.pattern.clone(),
            input_mode: raw.input_mode.clone(),
            autocomplete: raw.autocomplete.clone(),
        }
    }
}

/// Fingerprint of the currently interactable form step.
///
/// Equality is structural over every derived field. Hidden markup for other
/// steps never contributes, so toggling step visibility changes the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSignature {
    pub input_count: usize,
    pub inputs: Vec<InputDescriptor>,
    pub button_texts: Vec<String>,
    /// First `MAX_VISIBLE_TEXTS` deduplicated fragments
    pub visible_texts: Vec<String>,
    /// All deduplicated fragments joined by `|`, cut at `TEXT_DIGEST_CEILING` chars
    pub text_digest: String,
    pub has_otp_indicators: bool,
    pub has_email_indicators: bool,
}

impl FormSignature {
    pub fn from_raw(raw: &RawSignatureProbe) -> Self {
        let inputs: Vec<InputDescriptor> = raw
            .inputs
            .iter()
            .filter(|i| !i.input_type.eq_ignore_ascii_case("hidden") && i.state.is_interactable())
            .map(InputDescriptor::from)
            .collect();

        let button_texts = raw
            .buttons
            .iter()
            .filter(|b| b.state.is_interactable())
            .map(|b| b.text.trim().to_lowercase())
            .collect();

        let fragments = visible_fragments(&raw.texts);

        let has_otp_indicators = fragments
            .iter()
            .any(|t| OTP_VOCABULARY.iter().any(|k| t.contains(k)));
        let has_email_indicators = fragments
            .iter()
            .any(|t| EMAIL_VOCABULARY.iter().any(|k| t.contains(k)));

        let text_digest = truncate_chars(&fragments.join("|"), TEXT_DIGEST_CEILING);

        FormSignature {
            input_count: inputs.len(),
            inputs,
            button_texts,
            visible_texts: fragments.into_iter().take(MAX_VISIBLE_TEXTS).collect(),
            text_digest,
            has_otp_indicators,
            has_email_indicators,
        }
    }

    /// Short content hash for logs and traces.
    pub fn fingerprint(&self) -> String {
        use sha1::{Digest, Sha1};

        let canonical = serde_json::to_string(self).unwrap_or_default();
        let mut hasher = Sha1::new();
        hasher.update(canonical.as_bytes());
        let hex = format!("{:x}", hasher.finalize());
        hex[..12].to_string()
    }
}

/// Visible, non-empty, lower-cased fragments under the ceiling, first occurrence kept.
pub fn visible_fragments(texts: &[RawText]) -> Vec<String> {
    let mut seen = HashSet::new();
    texts
        .iter()
        .filter(|t| t.state.visible && t.state.has_area())
        .map(|t| t.text.trim().to_lowercase())
        .filter(|t| !t.is_empty() && t.chars().count() < TEXT_FRAGMENT_CEILING)
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
