use std::path::Path;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::browser::driver::Locator;
use crate::classifier::heuristics::DisabledSubmitPolicy;
use crate::error::ConfigError;
use crate::form::field::{FieldSpec, ValueKind};
use crate::form::matrix::TestMatrix;

pub const DEFAULT_CONFIG_PATH: &str = "form-prober.yaml";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "form-prober",
    version,
    about = "Black-box prober for web-form input validation"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: form-prober.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Probe the target form with the configured test matrix
    Run {
        /// Override the target URL from the config file
        #[arg(long)]
        url: Option<String>,

        /// Directory for the report file
        #[arg(short, long, default_value = ".")]
        output_dir: String,

        /// Report format: text, junit, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Append a JSONL trace of every attempt to this file
        #[arg(long)]
        trace: Option<String>,

        /// Only test these fields (repeatable)
        #[arg(long = "field")]
        fields: Vec<String>,

        /// Run the browser without a window
        #[arg(long, default_value_t = false)]
        headless: bool,
    },

    /// Validate the config and print every value assignment without a browser
    Plan {
        /// Only plan these fields (repeatable)
        #[arg(long = "field")]
        fields: Vec<String>,
    },

    /// Write the built-in default config to a file
    Init {
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        output: String,

        /// Overwrite an existing file
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

// ============================================================================
// Config File Model (YAML)
// ============================================================================

/// Full prober configuration: target, driver, timing, detection, fields, matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProberConfig {
    #[serde(default = "default_target_url")]
    pub target_url: String,

    /// Locator of the submit control
    #[serde(default = "default_submit")]
    pub submit: Locator,

    #[serde(default)]
    pub driver: DriverConfig,

    #[serde(default)]
    pub timing: TimingConfig,

    #[serde(default)]
    pub detection: DetectionConfig,

    #[serde(default = "default_fields")]
    pub fields: Vec<FieldSpec>,

    /// Merged over the built-in catalogue, key by key
    #[serde(default)]
    pub matrix: TestMatrix,
}

impl Default for ProberConfig {
    fn default() -> Self {
        Self {
            target_url: default_target_url(),
            submit: default_submit(),
            driver: DriverConfig::default(),
            timing: TimingConfig::default(),
            detection: DetectionConfig::default(),
            fields: default_fields(),
            matrix: TestMatrix::new(),
        }
    }
}

impl ProberConfig {
    /// Built-in catalogue with the config's own entries layered on top.
    pub fn effective_matrix(&self) -> TestMatrix {
        TestMatrix::default_catalogue().merged(self.matrix.clone())
    }
}

/// How to reach the browser server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    #[serde(default = "default_node")]
    pub command: String,

    #[serde(default = "default_script")]
    pub script: String,

    #[serde(default)]
    pub headless: bool,

    #[serde(default = "default_nav_timeout")]
    pub nav_timeout_ms: u64,

    #[serde(default = "default_action_timeout")]
    pub action_timeout_ms: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            command: default_node(),
            script: default_script(),
            headless: false,
            nav_timeout_ms: default_nav_timeout(),
            action_timeout_ms: default_action_timeout(),
        }
    }
}

/// Settle delays between the steps of one attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_between_tests")]
    pub delay_between_tests_ms: u64,

    #[serde(default = "default_after_submit")]
    pub wait_after_submit_ms: u64,

    #[serde(default = "default_initial_settle")]
    pub initial_settle_ms: u64,

    #[serde(default = "default_signature_settle")]
    pub signature_settle_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            delay_between_tests_ms: default_between_tests(),
            wait_after_submit_ms: default_after_submit(),
            initial_settle_ms: default_initial_settle(),
            signature_settle_ms: default_signature_settle(),
        }
    }
}

impl TimingConfig {
    /// No delays at all (scripted drivers in tests).
    pub fn immediate() -> Self {
        Self {
            delay_between_tests_ms: 0,
            wait_after_submit_ms: 0,
            initial_settle_ms: 0,
            signature_settle_ms: 0,
        }
    }
}

/// Signals the classifier looks for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    #[serde(default = "default_success_keywords")]
    pub success_url_keywords: Vec<String>,

    #[serde(default = "default_success_selectors")]
    pub success_selectors: Vec<Locator>,

    #[serde(default = "default_error_selectors")]
    pub error_selectors: Vec<Locator>,

    #[serde(default = "default_inline_keywords")]
    pub inline_error_keywords: Vec<String>,

    /// Reading of a submit control that is disabled after the click
    #[serde(default)]
    pub disabled_submit_means: DisabledSubmitPolicy,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            success_url_keywords: default_success_keywords(),
            success_selectors: default_success_selectors(),
            error_selectors: default_error_selectors(),
            inline_error_keywords: default_inline_keywords(),
            disabled_submit_means: DisabledSubmitPolicy::default(),
        }
    }
}

// Serde default helpers
fn default_target_url() -> String { "http://localhost:8080".to_string() }
fn default_submit() -> Locator { Locator::new("button[type=submit]") }
fn default_node() -> String { "node".to_string() }
fn default_script() -> String { "node/browser_server.js".to_string() }
fn default_nav_timeout() -> u64 { 60_000 }
fn default_action_timeout() -> u64 { 5_000 }
fn default_between_tests() -> u64 { 2_000 }
fn default_after_submit() -> u64 { 5_000 }
fn default_initial_settle() -> u64 { 1_000 }
fn default_signature_settle() -> u64 { 800 }

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn locators(items: &[&str]) -> Vec<Locator> {
    items.iter().map(|s| Locator::new(*s)).collect()
}

fn default_success_keywords() -> Vec<String> {
    strings(&["success", "dashboard", "welcome", "thank", "verify", "home"])
}

fn default_success_selectors() -> Vec<Locator> {
    locators(&[".alert-success", ".success", ".toast-success"])
}

fn default_error_selectors() -> Vec<Locator> {
    locators(&[".alert-danger", ".error", ".invalid-feedback", ".toast-error"])
}

fn default_inline_keywords() -> Vec<String> {
    strings(&["valid email", "invalid", "required", "please enter", "not valid", "error"])
}

/// A typical registration form.
fn default_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new("name", "input[name='name']", ValueKind::Alpha),
        FieldSpec::new("age", "input[name='age']", ValueKind::Numeric)
            .with_matrix("age")
            .with_default("25")
            .disabled(),
        FieldSpec::new("email", "input[name='email']", ValueKind::Email),
        FieldSpec::new("password", "input[name='password']", ValueKind::Password),
        FieldSpec::new(
            "confirm_password",
            "input[name='password_confirmation']",
            ValueKind::PasswordConfirm,
        )
        .depends_on("password"),
        FieldSpec::new("dob", "input[name='dob']", ValueKind::Date).with_matrix("dob"),
        FieldSpec::new("gender", "input[name='gender']", ValueKind::Radio)
            .with_options(&["male", "female", "other"]),
        FieldSpec::new("address", "input[name='address']", ValueKind::Text),
        FieldSpec::new("country", "select[name='country']", ValueKind::Select).with_default("India"),
        FieldSpec::new("phone", "input[name='phone']", ValueKind::Numeric).with_matrix("phone"),
        FieldSpec::composite("otp", &["#otp1", "#otp2", "#otp3", "#otp4", "#otp5", "#otp6"])
            .disabled(),
    ]
}

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file.
///
/// A missing file yields the built-in defaults; an unreadable or malformed
/// one is an error.
pub fn load_config(path: Option<&str>) -> Result<ProberConfig, ConfigError> {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_PATH);

    if !Path::new(config_path).exists() {
        info!(path = config_path, "config file not found, using built-in defaults");
        return Ok(ProberConfig::default());
    }

    let content = std::fs::read_to_string(config_path).map_err(|e| ConfigError::Read {
        path: config_path.to_string(),
        source: e,
    })?;

    parse_config(&content, config_path)
}

pub fn parse_config(content: &str, origin: &str) -> Result<ProberConfig, ConfigError> {
    serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
        path: origin.to_string(),
        source: e,
    })
}
