use std::collections::BTreeMap;

use chrono::Local;
use rand::Rng;
use serde::Serialize;

use crate::error::ConfigError;
use crate::form::field::{FieldRegistry, FieldSpec, ValueKind};
use crate::form::matrix::{CandidateValue, TestMatrix};

// ============================================================================
// Unique value synthesis
// ============================================================================

/// Source of fresh values for `CandidateValue::Unique`.
pub trait ValueGenerator {
    fn unique(&mut self, kind: ValueKind) -> String;
}

/// `test<HHMMSS><3 lowercase letters>`, with `@gmail.com` appended for emails.
pub struct TimestampGenerator;

impl ValueGenerator for TimestampGenerator {
    fn unique(&mut self, kind: ValueKind) -> String {
        let timestamp = Local::now().format("%H%M%S");
        let mut rng = rand::thread_rng();
        let suffix: String = (0..3).map(|_| rng.gen_range(b'a'..=b'z') as char).collect();

        match kind {
            ValueKind::Email => format!("test{}{}@gmail.com", timestamp, suffix),
            _ => format!("test{}{}", timestamp, suffix),
        }
    }
}

/// Deterministic counter-based values, for dry runs and tests.
#[derive(Debug, Default)]
pub struct SequenceGenerator {
    next: u32,
}

impl ValueGenerator for SequenceGenerator {
    fn unique(&mut self, kind: ValueKind) -> String {
        self.next += 1;
        match kind {
            ValueKind::Email => format!("unique{}@example.test", self.next),
            _ => format!("unique{}", self.next),
        }
    }
}

// ============================================================================
// Defaults: known-valid value per enabled field
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct Defaults(BTreeMap<String, CandidateValue>);

impl Defaults {
    /// Resolve a default for every enabled field.
    ///
    /// Order of preference: the field's `default`, its first radio option,
    /// then the first expected-valid case of its matrix. Dependent fields
    /// need none since they mirror their dependency.
    pub fn resolve(registry: &FieldRegistry, matrix: &TestMatrix) -> Result<Self, ConfigError> {
        let mut map = BTreeMap::new();
        for field in registry.enabled() {
            match default_for(field, matrix) {
                Some(v) => {
                    map.insert(field.name.clone(), v);
                }
                None if field.depends_on.is_some() => {}
                None => return Err(ConfigError::MissingDefault(field.name.clone())),
            }
        }
        Ok(Defaults(map))
    }

    pub fn get(&self, field: &str) -> Option<&CandidateValue> {
        self.0.get(field)
    }
}

fn default_for(field: &FieldSpec, matrix: &TestMatrix) -> Option<CandidateValue> {
    if let Some(d) = &field.default {
        return Some(CandidateValue::Literal(d.clone()));
    }
    if field.kind == ValueKind::Radio {
        if let Some(first) = field.options.first() {
            return Some(CandidateValue::Literal(first.clone()));
        }
    }
    matrix
        .first_valid(field.matrix_key())
        .map(|case| case.value.clone())
}

// ============================================================================
// Assignment: concrete value for every enabled field in one iteration
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Assignment {
    /// (field, value) in fill order
    pub values: Vec<(String, String)>,
}

impl Assignment {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, v)| v.as_str())
    }
}

/// Build the value assignment for one test case.
///
/// The field under test takes the candidate; every other dependent field
/// mirrors the value its dependency resolved to in this same iteration;
/// the rest take their defaults. Fields are visited in dependency order so
/// a dependency is always resolved first.
pub fn build_assignment(
    registry: &FieldRegistry,
    defaults: &Defaults,
    field_under_test: &str,
    candidate: &CandidateValue,
    generator: &mut dyn ValueGenerator,
) -> Assignment {
    let mut assignment = Assignment::default();

    for field in registry.fill_order() {
        let source = if field.name == field_under_test {
            candidate.clone()
        } else if field.depends_on.is_some() {
            CandidateValue::SameAsDependency
        } else {
            defaults
                .get(&field.name)
                .cloned()
                .unwrap_or_else(|| CandidateValue::literal(""))
        };

        let value = match source {
            CandidateValue::Literal(s) => s,
            CandidateValue::Unique => generator.unique(field.kind),
            CandidateValue::SameAsDependency => field
                .depends_on
                .as_deref()
                .and_then(|dep| assignment.get(dep))
                .unwrap_or_default()
                .to_string(),
        };

        assignment.values.push((field.name.clone(), value));
    }

    assignment
}
