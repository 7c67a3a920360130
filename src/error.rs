use thiserror::Error;

/// Failures raised by a `FormDriver` implementation.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Node.js browser server failed to spawn
    #[error("Failed to spawn {script} (is Node.js installed?): {source}")]
    SubprocessSpawn {
        script: String,
        #[source]
        source: std::io::Error,
    },

    /// Pipe to the browser server broke or returned nothing
    #[error("Browser session I/O error: {0}")]
    SessionIO(String),

    /// Browser server answered `ok: false`
    #[error("Browser command '{command}' failed: {error}")]
    SessionProtocol { command: String, error: String },

    #[error("JSON parse error ({context}): {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON serialize error ({context}): {source}")]
    JsonSerialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A bounded wait or interaction exceeded its limit
    #[error("Browser command '{command}' timed out after {ms}ms")]
    Timeout { command: String, ms: u64 },

    /// Locator resolved to no element
    #[error("Element '{locator}' not found")]
    ElementNotFound { locator: String },
}

impl DriverError {
    /// Whether this failure means the browser session itself is unusable.
    ///
    /// Element misses, timeouts and per-element protocol errors are local:
    /// the caller downgrades them to "no signal". Everything else ends the run.
    pub fn is_fatal(&self) -> bool {
        match self {
            DriverError::SubprocessSpawn { .. } | DriverError::SessionIO(_) => true,
            DriverError::JsonParse { .. } | DriverError::JsonSerialize { .. } => true,
            DriverError::SessionProtocol { command, .. } => command == "navigate",
            DriverError::Timeout { command, .. } => command == "navigate",
            DriverError::ElementNotFound { .. } => false,
        }
    }
}

/// Invalid field / matrix configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Duplicate field name '{0}'")]
    DuplicateField(String),

    #[error("Field '{field}' depends on unknown field '{target}'")]
    UnknownDependency { field: String, target: String },

    #[error("Field '{field}' depends on disabled field '{target}'")]
    DisabledDependency { field: String, target: String },

    #[error("Dependency cycle detected: {}", .0.join(" -> "))]
    DependencyCycle(Vec<String>),

    #[error("Field '{0}' has no locator")]
    MissingLocator(String),

    #[error("Composite field '{0}' has no slots")]
    EmptySlots(String),

    #[error("No default value for field '{0}' (no `default` and no valid case for its kind)")]
    MissingDefault(String),

    #[error("Field filter names unknown field '{0}'")]
    UnknownField(String),
}

/// Top-level error returned from a probing run.
#[derive(Debug, Error)]
pub enum ProberError {
    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Report error: {0}")]
    Report(String),
}
