use tracing::warn;

use crate::{
    browser::driver::FormDriver,
    classifier::classifier::Classifier,
    cli::config::ProberConfig,
    error::ProberError,
    form::{
        field::FieldRegistry,
        values::{TimestampGenerator, ValueGenerator},
    },
    runner::{
        orchestrator::{Orchestrator, RunSettings},
        run_state::RunState,
    },
    trace::logger::TraceLogger,
};

pub mod browser;
pub mod classifier;
pub mod cli;
pub mod error;
pub mod form;
pub mod report;
pub mod runner;
pub mod signature;
pub mod trace;

/// Knobs for one probing run beyond the config file.
pub struct RunOptions<'a> {
    /// Only test these fields; empty means all enabled fields
    pub fields: Vec<String>,
    pub tracer: Option<&'a TraceLogger>,
    pub generator: Box<dyn ValueGenerator>,
}

impl Default for RunOptions<'_> {
    fn default() -> Self {
        Self {
            fields: vec![],
            tracer: None,
            generator: Box::new(TimestampGenerator),
        }
    }
}

/// Probe the configured form through `driver` and return the run state.
///
/// The driver is closed on every path out, including configuration and
/// fatal driver errors.
pub fn run_probe(
    config: &ProberConfig,
    driver: &mut dyn FormDriver,
    options: RunOptions<'_>,
) -> Result<RunState, ProberError> {
    let result = probe(config, &mut *driver, options);

    if let Err(e) = driver.close() {
        warn!(error = %e, "failed to close browser session");
    }

    result
}

fn probe(
    config: &ProberConfig,
    driver: &mut dyn FormDriver,
    options: RunOptions<'_>,
) -> Result<RunState, ProberError> {
    let registry = FieldRegistry::new(config.fields.clone())?;
    let matrix = config.effective_matrix();
    let classifier = Classifier::from_config(
        &config.detection,
        &config.submit,
        config.timing.signature_settle_ms,
    );

    let settings = RunSettings {
        target_url: config.target_url.clone(),
        submit: config.submit.clone(),
        timing: config.timing.clone(),
        nav_timeout_ms: config.driver.nav_timeout_ms,
    };

    let mut orchestrator = Orchestrator::new(driver, &registry, &matrix, &classifier, settings)
        .with_generator(options.generator);
    if let Some(tracer) = options.tracer {
        orchestrator = orchestrator.with_tracer(tracer);
    }

    orchestrator.run_all(&options.fields)
}
