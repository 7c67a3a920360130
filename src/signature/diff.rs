use std::fmt;

use crate::signature::signature_model::FormSignature;

/// One derived field that differs between two signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureChange {
    InputCount { before: usize, after: usize },
    Inputs,
    Buttons,
    Texts,
    OtpIndicator { now: bool },
    EmailIndicator { now: bool },
}

impl fmt::Display for SignatureChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureChange::InputCount { before, after } => {
                write!(f, "inputs {} -> {}", before, after)
            }
            SignatureChange::Inputs => f.write_str("input attributes changed"),
            SignatureChange::Buttons => f.write_str("buttons changed"),
            SignatureChange::Texts => f.write_str("visible text changed"),
            SignatureChange::OtpIndicator { now: true } => f.write_str("otp prompt appeared"),
            SignatureChange::OtpIndicator { now: false } => f.write_str("otp prompt gone"),
            SignatureChange::EmailIndicator { now: true } => f.write_str("email prompt appeared"),
            SignatureChange::EmailIndicator { now: false } => f.write_str("email prompt gone"),
        }
    }
}

/// List what changed from `before` to `after`. Empty iff the signatures are equal.
pub fn signature_diff(before: &FormSignature, after: &FormSignature) -> Vec<SignatureChange> {
    let mut changes = vec![];

    if before.input_count != after.input_count {
        changes.push(SignatureChange::InputCount {
            before: before.input_count,
            after: after.input_count,
        });
    } else if before.inputs != after.inputs {
        changes.push(SignatureChange::Inputs);
    }

    if before.button_texts != after.button_texts {
        changes.push(SignatureChange::Buttons);
    }

    if before.text_digest != after.text_digest || before.visible_texts != after.visible_texts {
        changes.push(SignatureChange::Texts);
    }

    if before.has_otp_indicators != after.has_otp_indicators {
        changes.push(SignatureChange::OtpIndicator {
            now: after.has_otp_indicators,
        });
    }

    if before.has_email_indicators != after.has_email_indicators {
        changes.push(SignatureChange::EmailIndicator {
            now: after.has_email_indicators,
        });
    }

    changes
}

/// Comma-joined summary, e.g. `inputs 1 -> 6, otp prompt appeared`.
pub fn describe_changes(changes: &[SignatureChange]) -> String {
    changes
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
