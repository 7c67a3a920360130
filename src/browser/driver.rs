use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::DriverError;

// ============================================================================
// Locator: opaque element descriptor resolved by the driver
// ============================================================================

/// Element descriptor handed to the driver verbatim (CSS in the bundled
/// browser server). The prober never inspects its syntax.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locator(String);

impl Locator {
    pub fn new(css: impl Into<String>) -> Self {
        Locator(css.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Locator for one option of a radio group, e.g. `input[name='gender'][value='male']`.
    pub fn with_value(&self, value: &str) -> Self {
        Locator(format!("{}[value='{}']", self.0, value.replace('\'', "\\'")))
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Locator {
    fn from(s: &str) -> Self {
        Locator::new(s)
    }
}

// ============================================================================
// FormDriver: the narrow browser capability the prober depends on
// ============================================================================

/// Browser-automation capability consumed by the signature engine, the
/// classifier and the orchestrator.
///
/// Every call blocks until the browser answers. Implementations bound each
/// interaction with a timeout and report it as `DriverError::Timeout`.
pub trait FormDriver {
    fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<(), DriverError>;
    fn fill(&mut self, locator: &Locator, value: &str) -> Result<(), DriverError>;
    fn clear(&mut self, locator: &Locator) -> Result<(), DriverError>;
    fn click(&mut self, locator: &Locator) -> Result<(), DriverError>;
    fn select(&mut self, locator: &Locator, label: &str) -> Result<(), DriverError>;
    fn check(&mut self, locator: &Locator) -> Result<(), DriverError>;
    fn current_url(&mut self) -> Result<String, DriverError>;
    fn is_visible(&mut self, locator: &Locator) -> Result<bool, DriverError>;
    fn is_enabled(&mut self, locator: &Locator) -> Result<bool, DriverError>;
    /// Run a read-only inspection script and return its JSON result.
    fn evaluate(&mut self, script: &str) -> Result<Value, DriverError>;
    fn wait(&mut self, ms: u64) -> Result<(), DriverError>;
    fn close(&mut self) -> Result<(), DriverError>;
}

// ============================================================================
// Probe: explicit present / absent / failed outcome of an optional lookup
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Probe<T> {
    Present(T),
    Absent,
    Failed(String),
}

impl<T> Probe<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, Probe::Present(_))
    }

    pub fn present(self) -> Option<T> {
        match self {
            Probe::Present(v) => Some(v),
            _ => None,
        }
    }

    /// Downgrade a driver result: element misses become `Absent`, other
    /// local failures become `Failed`, fatal session errors propagate.
    pub fn from_result(result: Result<T, DriverError>) -> Result<Self, DriverError> {
        match result {
            Ok(v) => Ok(Probe::Present(v)),
            Err(DriverError::ElementNotFound { .. }) => Ok(Probe::Absent),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                debug!(error = %e, "probe failed, treating as no signal");
                Ok(Probe::Failed(e.to_string()))
            }
        }
    }
}

/// `Present` when the locator resolves to a visible element.
pub fn probe_visible<D: FormDriver + ?Sized>(
    driver: &mut D,
    locator: &Locator,
) -> Result<Probe<()>, DriverError> {
    Ok(match Probe::from_result(driver.is_visible(locator))? {
        Probe::Present(true) => Probe::Present(()),
        Probe::Present(false) | Probe::Absent => Probe::Absent,
        Probe::Failed(e) => Probe::Failed(e),
    })
}

/// Enabled state of the element, `Absent` if it cannot be found.
pub fn probe_enabled<D: FormDriver + ?Sized>(
    driver: &mut D,
    locator: &Locator,
) -> Result<Probe<bool>, DriverError> {
    Probe::from_result(driver.is_enabled(locator))
}

pub fn probe_eval<D: FormDriver + ?Sized>(
    driver: &mut D,
    script: &str,
) -> Result<Probe<Value>, DriverError> {
    Probe::from_result(driver.evaluate(script))
}

/// Run an interaction whose failure is tolerated. Returns whether it took
/// effect; only fatal session errors escape.
pub fn tolerate<D: FormDriver + ?Sized>(
    driver: &mut D,
    what: &str,
    f: impl FnOnce(&mut D) -> Result<(), DriverError>,
) -> Result<bool, DriverError> {
    match f(driver) {
        Ok(()) => Ok(true),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            debug!(action = what, error = %e, "interaction skipped");
            Ok(false)
        }
    }
}
