use std::process::ExitCode;

use clap::Parser;
use form_prober::cli::commands::{RunArgs, cmd_init, cmd_plan, cmd_run};
use form_prober::cli::config::{Cli, Commands, load_config};
use tracing::{Level, error};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match run(cli) {
        Ok(false) => ExitCode::SUCCESS,
        Ok(true) => ExitCode::from(1),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Returns whether vulnerabilities were found.
fn run(cli: Cli) -> anyhow::Result<bool> {
    match cli.command {
        Commands::Run {
            url,
            output_dir,
            format,
            trace,
            fields,
            headless,
        } => {
            let config = load_config(cli.config.as_deref())?;
            cmd_run(
                config,
                RunArgs {
                    url,
                    output_dir,
                    format,
                    trace,
                    fields,
                    headless,
                },
            )
        }
        Commands::Plan { fields } => {
            let config = load_config(cli.config.as_deref())?;
            cmd_plan(&config, &fields)?;
            Ok(false)
        }
        Commands::Init { output, force } => {
            cmd_init(&output, force)?;
            Ok(false)
        }
    }
}
