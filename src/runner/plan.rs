use serde::Serialize;

use crate::error::ConfigError;
use crate::form::field::FieldRegistry;
use crate::form::matrix::TestMatrix;
use crate::form::values::{Assignment, Defaults, ValueGenerator, build_assignment};

/// One test case as it would be submitted, without a browser.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedCase {
    pub field: String,
    pub label: String,
    pub expected: bool,
    pub assignment: Assignment,
}

/// Every concrete assignment a run would fill, in run order.
///
/// Disabled and filtered-out fields produce no cases. Unknown filter names
/// are an error.
pub fn plan_cases(
    registry: &FieldRegistry,
    matrix: &TestMatrix,
    filter: &[String],
    generator: &mut dyn ValueGenerator,
) -> Result<Vec<PlannedCase>, ConfigError> {
    registry.check_filter(filter)?;
    let defaults = Defaults::resolve(registry, matrix)?;
    let mut planned = Vec::new();

    for field in registry.enabled() {
        if !filter.is_empty() && !filter.contains(&field.name) {
            continue;
        }
        for case in matrix.cases(field.matrix_key()) {
            planned.push(PlannedCase {
                field: field.name.clone(),
                label: case.label.clone(),
                expected: case.expected,
                assignment: build_assignment(registry, &defaults, &field.name, &case.value, generator),
            });
        }
    }

    Ok(planned)
}
