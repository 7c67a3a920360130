use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::browser::driver::{FormDriver, Locator, Probe, probe_enabled, tolerate};
use crate::classifier::classifier::Classifier;
use crate::classifier::heuristics::Baseline;
use crate::cli::config::TimingConfig;
use crate::error::{DriverError, ProberError};
use crate::form::field::{FieldRegistry, FieldSpec, ValueKind};
use crate::form::matrix::{TestCase, TestMatrix};
use crate::form::values::{Assignment, Defaults, TimestampGenerator, ValueGenerator, build_assignment};
use crate::runner::run_state::{RunState, TestResult};
use crate::signature::capture::capture;
use crate::trace::logger::TraceLogger;
use crate::trace::trace::TraceEvent;

/// Per-run settings the orchestrator needs besides fields and matrix.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub target_url: String,
    pub submit: Locator,
    pub timing: TimingConfig,
    pub nav_timeout_ms: u64,
}

/// Whether a field's element(s) took the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FillOutcome {
    pub field: String,
    pub filled: bool,
}

/// Drives the test matrix against one browser session, one case at a time.
pub struct Orchestrator<'a> {
    driver: &'a mut dyn FormDriver,
    registry: &'a FieldRegistry,
    matrix: &'a TestMatrix,
    classifier: &'a Classifier,
    settings: RunSettings,
    generator: Box<dyn ValueGenerator>,
    tracer: Option<&'a TraceLogger>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        driver: &'a mut dyn FormDriver,
        registry: &'a FieldRegistry,
        matrix: &'a TestMatrix,
        classifier: &'a Classifier,
        settings: RunSettings,
    ) -> Self {
        Self {
            driver,
            registry,
            matrix,
            classifier,
            settings,
            generator: Box::new(TimestampGenerator),
            tracer: None,
        }
    }

    pub fn with_generator(mut self, generator: Box<dyn ValueGenerator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_tracer(mut self, tracer: &'a TraceLogger) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// Run every enabled field's cases.
    ///
    /// `filter` restricts testing to the named fields; an empty filter tests
    /// all; a name matching no field is a config error. Filtered-out and
    /// disabled fields land in `skipped_fields`. A fatal
    /// driver error aborts the run and the partial state is dropped.
    pub fn run_all(&mut self, filter: &[String]) -> Result<RunState, ProberError> {
        let started = Instant::now();
        self.registry.check_filter(filter)?;
        let defaults = Defaults::resolve(self.registry, self.matrix)?;
        let mut state = RunState::new(&self.settings.target_url);

        info!(url = %self.settings.target_url, "starting form validation run");

        let registry = self.registry;
        let matrix = self.matrix;
        for field in registry.fields() {
            if !field.enabled {
                info!(field = %field.name, "field disabled, skipping");
                state.skip(&field.name);
                continue;
            }
            if !filter.is_empty() && !filter.contains(&field.name) {
                debug!(field = %field.name, "field not selected, skipping");
                state.skip(&field.name);
                continue;
            }

            let cases = matrix.cases(field.matrix_key());
            if cases.is_empty() {
                warn!(field = %field.name, key = field.matrix_key(), "no test cases for field");
            }

            info!(field = %field.name, cases = cases.len(), "testing field");
            state.tested_fields.push(field.name.clone());

            for result in self.run_field(field, cases, &defaults)? {
                state.record(result);
            }
        }

        state.duration_ms = Some(started.elapsed().as_millis());
        info!(
            total = state.total,
            passed = state.passed,
            failed = state.failed,
            inconclusive = state.inconclusive,
            vulnerabilities = state.vulnerabilities.len(),
            "run complete"
        );
        Ok(state)
    }

    /// Run all cases of one field.
    pub fn run_field(
        &mut self,
        field: &FieldSpec,
        cases: &[TestCase],
        defaults: &Defaults,
    ) -> Result<Vec<TestResult>, DriverError> {
        let mut results = Vec::with_capacity(cases.len());
        for case in cases {
            results.push(self.run_case(field, case, defaults)?);

            let delay = self.settings.timing.delay_between_tests_ms;
            if delay > 0 {
                tolerate(&mut *self.driver, "delay between tests", |d| d.wait(delay))?;
            }
        }
        Ok(results)
    }

    fn run_case(
        &mut self,
        field: &FieldSpec,
        case: &TestCase,
        defaults: &Defaults,
    ) -> Result<TestResult, DriverError> {
        let timing = self.settings.timing.clone();

        // 1. Fresh page
        self.driver
            .navigate(&self.settings.target_url, self.settings.nav_timeout_ms)?;
        if timing.initial_settle_ms > 0 {
            tolerate(&mut *self.driver, "initial settle", |d| d.wait(timing.initial_settle_ms))?;
        }

        // 2. Concrete values
        let assignment = build_assignment(
            self.registry,
            defaults,
            &field.name,
            &case.value,
            self.generator.as_mut(),
        );
        let input = assignment.get(&field.name).unwrap_or_default().to_string();

        // 3. Fill
        let fills = self.fill_assignment(&assignment)?;
        let unfilled: Vec<String> = fills
            .into_iter()
            .filter(|f| !f.filled)
            .map(|f| f.field)
            .collect();
        if !unfilled.is_empty() {
            debug!(fields = ?unfilled, "some fields could not be filled");
        }

        // 4. Before-state
        let submit = self.settings.submit.clone();
        let before_signature = capture(&mut *self.driver)?.present();
        let before_url = match Probe::from_result(self.driver.current_url())? {
            Probe::Present(url) => url,
            _ => self.settings.target_url.clone(),
        };
        let baseline = Baseline {
            url: before_url,
            signature: before_signature,
            submit_enabled: probe_enabled(&mut *self.driver, &submit)?.present(),
        };

        // 5. Submit
        if !tolerate(&mut *self.driver, "submit", |d| d.click(&submit))? {
            debug!(submit = %submit, "submit click did not take effect");
        }
        if timing.wait_after_submit_ms > 0 {
            tolerate(&mut *self.driver, "wait after submit", |d| {
                d.wait(timing.wait_after_submit_ms)
            })?;
        }

        // 6. Classify
        let outcome = self
            .classifier
            .classify(&mut *self.driver, &baseline)?;

        // 7. Score
        let result = TestResult::new(
            &field.name,
            &case.label,
            &input,
            case.expected,
            outcome.verdict,
            &outcome.reason.to_string(),
        );

        if result.score.is_vulnerability() {
            warn!(
                field = %result.field,
                input = %result.input,
                label = %result.label,
                "VULNERABILITY: invalid input accepted"
            );
        } else {
            info!(
                field = %result.field,
                label = %result.label,
                input = %result.input,
                passed = result.passed,
                "{}",
                result.status
            );
        }

        if let Some(tracer) = self.tracer {
            let event = TraceEvent::now(&result, &outcome)
                .with_before(&baseline.url, baseline.signature.as_ref().map(|s| s.fingerprint()))
                .with_unfilled(unfilled);
            tracer.log(&event);
        }

        Ok(result)
    }

    fn fill_assignment(&mut self, assignment: &Assignment) -> Result<Vec<FillOutcome>, DriverError> {
        let registry = self.registry;
        let mut outcomes = Vec::with_capacity(assignment.values.len());
        for (name, value) in &assignment.values {
            let Some(field) = registry.get(name) else {
                continue;
            };
            outcomes.push(fill_field(&mut *self.driver, field, value)?);
        }
        Ok(outcomes)
    }
}

/// Fill one field with the strategy for its kind.
///
/// Element misses and other local failures yield `filled: false`; only fatal
/// session errors are returned.
pub fn fill_field<D: FormDriver + ?Sized>(
    driver: &mut D,
    field: &FieldSpec,
    value: &str,
) -> Result<FillOutcome, DriverError> {
    let filled = match field.kind {
        ValueKind::Composite => fill_slots(driver, &field.slots, value)?,
        _ => match &field.locator {
            None => false,
            Some(locator) => match field.kind {
                ValueKind::Radio if value.is_empty() => true,
                ValueKind::Radio => {
                    let option = locator.with_value(value);
                    tolerate(driver, "check", |d| d.check(&option))?
                }
                ValueKind::Select => tolerate(driver, "select", |d| d.select(locator, value))?,
                _ => tolerate(driver, "fill", |d| d.fill(locator, value))?,
            },
        },
    };

    Ok(FillOutcome {
        field: field.name.clone(),
        filled,
    })
}

/// One character per slot; slots past the value's length are cleared and
/// characters past the slot count are dropped.
fn fill_slots<D: FormDriver + ?Sized>(
    driver: &mut D,
    slots: &[Locator],
    value: &str,
) -> Result<bool, DriverError> {
    let mut chars = value.chars();
    let mut all_filled = true;

    for slot in slots {
        let ok = match chars.next() {
            Some(c) => {
                let digit = c.to_string();
                tolerate(driver, "fill slot", |d| d.fill(slot, &digit))?
            }
            None => tolerate(driver, "clear slot", |d| d.clear(slot))?,
        };
        all_filled &= ok;
    }

    Ok(all_filled)
}
