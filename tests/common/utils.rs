use form_prober::browser::driver::Locator;
use form_prober::cli::config::{ProberConfig, TimingConfig};
use form_prober::form::field::FieldSpec;
use form_prober::form::matrix::{TestCase, TestMatrix};

use crate::common::mock_driver::SUBMIT;

pub const FORM_URL: &str = "https://forms.example.com/register";

/// Config for scripted runs: no delays, the given fields, catalogue plus overrides.
pub fn test_config(fields: Vec<FieldSpec>, overrides: TestMatrix) -> ProberConfig {
    ProberConfig {
        target_url: FORM_URL.to_string(),
        submit: Locator::new(SUBMIT),
        timing: TimingConfig::immediate(),
        fields,
        matrix: overrides,
        ..ProberConfig::default()
    }
}

pub fn matrix(entries: &[(&str, Vec<TestCase>)]) -> TestMatrix {
    let mut m = TestMatrix::new();
    for (key, cases) in entries {
        m.insert(key, cases.clone());
    }
    m
}

pub fn temp_path(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("form-prober-tests-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}
