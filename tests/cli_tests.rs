use clap::Parser;
use form_prober::classifier::heuristics::DisabledSubmitPolicy;
use form_prober::cli::commands::{cmd_init, write_report};
use form_prober::cli::config::{Cli, Commands, ProberConfig, load_config, parse_config};
use form_prober::error::ConfigError;
use form_prober::form::field::{FieldRegistry, ValueKind};
use form_prober::form::matrix::CandidateValue;
use form_prober::report::report_model::ReportFormat;
use form_prober::runner::run_state::{RunState, TestResult};
use form_prober::classifier::outcome::Verdict;

mod common;

use common::utils::temp_path;

// ============================================================================
// CLI Argument Parsing Tests
// ============================================================================

#[test]
fn cli_parse_run_minimal() {
    let cli = Cli::parse_from(["form-prober", "run"]);
    match cli.command {
        Commands::Run {
            url,
            output_dir,
            format,
            trace,
            fields,
            headless,
        } => {
            assert!(url.is_none());
            assert_eq!(output_dir, ".");
            assert_eq!(format, "text");
            assert!(trace.is_none());
            assert!(fields.is_empty());
            assert!(!headless);
        }
        _ => panic!("Expected Run command"),
    }
}

#[test]
fn cli_parse_run_all_args() {
    let cli = Cli::parse_from([
        "form-prober",
        "run",
        "--url",
        "https://example.com/signup",
        "-o",
        "reports",
        "--format",
        "junit",
        "--trace",
        "trace.jsonl",
        "--field",
        "email",
        "--field",
        "password",
        "--headless",
    ]);
    match cli.command {
        Commands::Run {
            url,
            output_dir,
            format,
            trace,
            fields,
            headless,
        } => {
            assert_eq!(url.as_deref(), Some("https://example.com/signup"));
            assert_eq!(output_dir, "reports");
            assert_eq!(format, "junit");
            assert_eq!(trace.as_deref(), Some("trace.jsonl"));
            assert_eq!(fields, vec!["email".to_string(), "password".to_string()]);
            assert!(headless);
        }
        _ => panic!("Expected Run command"),
    }
}

#[test]
fn cli_parse_plan_and_init() {
    let cli = Cli::parse_from(["form-prober", "plan", "--field", "otp"]);
    assert!(matches!(cli.command, Commands::Plan { ref fields } if fields == &["otp".to_string()]));

    let cli = Cli::parse_from(["form-prober", "init", "--force"]);
    match cli.command {
        Commands::Init { output, force } => {
            assert_eq!(output, "form-prober.yaml");
            assert!(force);
        }
        _ => panic!("Expected Init command"),
    }
}

#[test]
fn cli_parse_global_flags() {
    let cli = Cli::parse_from(["form-prober", "-vv", "--config", "site.yaml", "run"]);
    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.config.as_deref(), Some("site.yaml"));
}

// ============================================================================
// Config File Tests
// ============================================================================

#[test]
fn config_load_missing_file_gives_defaults() {
    let config = load_config(Some("nonexistent_file_that_does_not_exist.yaml")).unwrap();
    assert_eq!(config.fields.len(), ProberConfig::default().fields.len());
    assert_eq!(config.timing.delay_between_tests_ms, 2000);
}

#[test]
fn config_default_values() {
    let config = ProberConfig::default();
    assert_eq!(config.submit.as_str(), "button[type=submit]");
    assert_eq!(config.driver.command, "node");
    assert_eq!(config.driver.nav_timeout_ms, 60_000);
    assert_eq!(config.timing.wait_after_submit_ms, 5000);
    assert_eq!(config.detection.disabled_submit_means, DisabledSubmitPolicy::Accepted);
    assert!(config.detection.success_url_keywords.contains(&"dashboard".to_string()));
    assert!(config.detection.inline_error_keywords.contains(&"valid email".to_string()));
}

#[test]
fn default_fields_form_a_valid_registry() {
    let config = ProberConfig::default();
    let registry = FieldRegistry::new(config.fields.clone()).unwrap();

    let disabled: Vec<&str> = registry.disabled().map(|f| f.name.as_str()).collect();
    assert_eq!(disabled, vec!["age", "otp"]);

    let order: Vec<&str> = registry.fill_order().map(|f| f.name.as_str()).collect();
    let pw = order.iter().position(|n| *n == "password").unwrap();
    let confirm = order.iter().position(|n| *n == "confirm_password").unwrap();
    assert!(pw < confirm);
}

#[test]
fn config_partial_yaml() {
    let yaml = r##"
target_url: https://shop.example.com/signup
submit: "#register"
timing:
  wait_after_submit_ms: 1500
detection:
  disabled_submit_means: ignore
fields:
  - name: email
    locator: "#email"
    kind: email
  - name: otp
    kind: composite
    enabled: false
    slots: ["#d1", "#d2", "#d3", "#d4"]
matrix:
  email:
    - { value: __UNIQUE__, expected: true, label: Valid Email }
    - { value: "a@", expected: false, label: Invalid Email }
"##;
    let config = parse_config(yaml, "inline").unwrap();

    assert_eq!(config.target_url, "https://shop.example.com/signup");
    assert_eq!(config.submit.as_str(), "#register");
    assert_eq!(config.timing.wait_after_submit_ms, 1500);
    assert_eq!(config.timing.delay_between_tests_ms, 2000);
    assert_eq!(config.detection.disabled_submit_means, DisabledSubmitPolicy::Ignore);
    assert!(!config.detection.error_selectors.is_empty());

    assert_eq!(config.fields.len(), 2);
    assert!(config.fields[0].enabled);
    assert_eq!(config.fields[1].kind, ValueKind::Composite);
    assert_eq!(config.fields[1].slots.len(), 4);

    let matrix = config.effective_matrix();
    assert_eq!(matrix.cases("email").len(), 2);
    assert_eq!(matrix.cases("email")[0].value, CandidateValue::Unique);
    assert_eq!(matrix.cases("alpha").len(), 5);
}

#[test]
fn malformed_config_is_an_error() {
    let err = parse_config("fields: [ { name: x, kind: banana } ]", "bad.yaml").unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("bad.yaml"));
}

#[test]
fn config_yaml_roundtrip() {
    let config = ProberConfig::default();
    let yaml = serde_yaml::to_string(&config).unwrap();
    let back = parse_config(&yaml, "roundtrip").unwrap();
    assert_eq!(back.fields, config.fields);
    assert_eq!(back.target_url, config.target_url);
}

// ============================================================================
// Command helpers
// ============================================================================

#[test]
fn init_writes_default_config_and_refuses_to_overwrite() {
    let path = temp_path("init.yaml");
    let _ = std::fs::remove_file(&path);
    let p = path.to_str().unwrap();

    cmd_init(p, false).unwrap();
    let written = load_config(Some(p)).unwrap();
    assert_eq!(written.fields.len(), ProberConfig::default().fields.len());

    assert!(cmd_init(p, false).is_err());
    cmd_init(p, true).unwrap();
}

#[test]
fn write_report_names_file_after_host() {
    let mut state = RunState::new("https://www.example.com/register");
    state.tested_fields.push("name".into());
    state.record(TestResult::new("name", "Valid Name", "John Doe", true, Verdict::Accepted, "URL changed"));

    let dir = temp_path("reports");
    let text = write_report(&state, ReportFormat::Text, &dir).unwrap();
    let json = write_report(&state, ReportFormat::Json, &dir).unwrap();

    let text_name = text.file_name().unwrap().to_str().unwrap().to_string();
    assert!(text_name.starts_with("example.com-"));
    assert!(text_name.ends_with(".txt"));
    assert!(json.to_str().unwrap().ends_with(".json"));

    let content = std::fs::read_to_string(&text).unwrap();
    assert!(content.contains("FORM VALIDATION TEST REPORT"));
}
