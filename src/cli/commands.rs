use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Local;
use tracing::info;

use crate::browser::session::BrowserSession;
use crate::cli::config::ProberConfig;
use crate::form::field::FieldRegistry;
use crate::form::values::SequenceGenerator;
use crate::report::console::format_console_report;
use crate::report::json::generate_json_report;
use crate::report::junit::generate_junit_xml;
use crate::report::report_model::{ReportFormat, ReportSummary, report_filename};
use crate::report::text::generate_text_report;
use crate::runner::plan::plan_cases;
use crate::runner::run_state::RunState;
use crate::trace::logger::TraceLogger;
use crate::{RunOptions, run_probe};

// ============================================================================
// run subcommand
// ============================================================================

/// Options of `run` that are not part of the config file.
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    pub url: Option<String>,
    pub output_dir: String,
    pub format: String,
    pub trace: Option<String>,
    pub fields: Vec<String>,
    pub headless: bool,
}

/// Probe the form, write the report and return whether vulnerabilities were found.
pub fn cmd_run(mut config: ProberConfig, args: RunArgs) -> Result<bool> {
    if let Some(url) = args.url {
        config.target_url = url;
    }
    if args.headless {
        config.driver.headless = true;
    }

    let format = ReportFormat::parse(&args.format)
        .with_context(|| format!("unknown report format '{}' (text, junit, json)", args.format))?;

    // Fail on a bad field set before a browser is started
    FieldRegistry::new(config.fields.clone())
        .and_then(|registry| registry.check_filter(&args.fields))
        .context("invalid field configuration")?;

    let tracer = args.trace.as_deref().map(TraceLogger::new);

    let mut session = BrowserSession::launch(&config.driver).context("failed to start browser")?;
    let options = RunOptions {
        fields: args.fields,
        tracer: tracer.as_ref(),
        ..RunOptions::default()
    };
    let state = run_probe(&config, &mut session, options).context("probing run aborted")?;

    let path = write_report(&state, format, Path::new(&args.output_dir))?;
    info!(path = %path.display(), "report written");

    let summary = ReportSummary::from_state(&state, Local::now());
    print!("{}", format_console_report(&state, &summary));
    println!("Report: {}", path.display());

    Ok(state.has_vulnerabilities())
}

/// Render the report in `format` and write it under `dir`.
pub fn write_report(state: &RunState, format: ReportFormat, dir: &Path) -> Result<PathBuf> {
    let now = Local::now();
    let summary = ReportSummary::from_state(state, now);

    let content = match format {
        ReportFormat::Text => generate_text_report(state, &summary),
        ReportFormat::Junit => generate_junit_xml(state, &summary),
        ReportFormat::Json => generate_json_report(state, &summary)?,
    };

    let file_name = report_filename(&state.target_url, now);
    let file_name = match format {
        ReportFormat::Text => file_name,
        other => format!(
            "{}.{}",
            file_name.strip_suffix(".txt").unwrap_or(&file_name),
            other.extension()
        ),
    };

    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    let path = dir.join(file_name);
    std::fs::write(&path, content)
        .with_context(|| format!("failed to write report {}", path.display()))?;

    Ok(path)
}

// ============================================================================
// plan subcommand
// ============================================================================

/// Print every assignment a run would fill. Placeholders replace unique values.
pub fn cmd_plan(config: &ProberConfig, fields: &[String]) -> Result<()> {
    let registry = FieldRegistry::new(config.fields.clone()).context("invalid field configuration")?;
    let matrix = config.effective_matrix();
    let mut generator = SequenceGenerator::default();

    let order: Vec<&str> = registry.fill_order().map(|f| f.name.as_str()).collect();
    println!("Target: {}", config.target_url);
    println!("Fill order: {}", order.join(" -> "));

    let skipped: Vec<&str> = registry.disabled().map(|f| f.name.as_str()).collect();
    if !skipped.is_empty() {
        println!("Skipped (disabled): {}", skipped.join(", "));
    }

    let planned = plan_cases(&registry, &matrix, fields, &mut generator)
        .context("failed to resolve test values")?;

    let mut current = "";
    for case in &planned {
        if case.field != current {
            current = &case.field;
            println!("\n[{}]", current);
        }
        let expected = if case.expected { "valid" } else { "invalid" };
        let values: Vec<String> = case
            .assignment
            .values
            .iter()
            .map(|(name, value)| format!("{}={:?}", name, value))
            .collect();
        println!("  {} ({}): {}", case.label, expected, values.join(" "));
    }

    println!("\n{} test cases", planned.len());
    Ok(())
}

// ============================================================================
// init subcommand
// ============================================================================

/// Write the built-in default config as YAML.
pub fn cmd_init(output: &str, force: bool) -> Result<()> {
    if Path::new(output).exists() && !force {
        bail!("{} already exists (use --force to overwrite)", output);
    }

    let yaml = serde_yaml::to_string(&ProberConfig::default())
        .context("failed to serialize default config")?;
    std::fs::write(output, yaml).with_context(|| format!("failed to write {}", output))?;

    println!("Wrote default config to {}", output);
    Ok(())
}
