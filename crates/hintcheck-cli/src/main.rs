use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hintcheck_core::{config::DEFAULT_CONFIG_FILE, Config};
use hintcheck_dbt::{Manifest, ModelResolver};
use hintcheck_engine::{telemetry, HintChecker, HookEvent};

mod reporter;

const HOOK_NAME: &str = "check-model-has-rebalance-hint";
const HOOK_DESCRIPTION: &str = "Check partitioned models carry a matching REBALANCE hint";

/// Verify that partitioned dbt models carry a matching REBALANCE hint
#[derive(Parser)]
#[command(name = "dbt-rebalance-check")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Changed files to check (non-SQL files are ignored)
    filenames: Vec<PathBuf>,

    /// Also check disabled models
    #[arg(long)]
    include_disabled: bool,

    /// Path to dbt manifest.json (default: target/manifest.json)
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    /// Path to config file (default: hintcheck.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write a JSON report to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Mark the hook event as a test invocation
    #[arg(long, alias = "is_test", hide = true)]
    is_test: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(status) => ExitCode::from(status),
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr; stdout carries only the violation lines
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(cli: &Cli) -> Result<u8> {
    let config = load_config(cli.config.as_deref(), cli.verbose)?;
    let include_disabled = cli.include_disabled || config.include_disabled;
    let manifest_path = config.manifest_path(cli.manifest.as_deref());
    tracing::debug!(manifest = %manifest_path.display(), include_disabled, "starting run");

    if cli.verbose {
        eprintln!("{} {}", "Loading manifest from:".cyan(), manifest_path.display());
    }

    let manifest = match Manifest::from_file(&manifest_path) {
        Ok(manifest) => manifest,
        Err(e) => {
            println!("Unable to load manifest file ({e})");
            return Ok(1);
        }
    };

    let started = Instant::now();
    let models = ModelResolver::resolve(&cli.filenames, &manifest, include_disabled);

    if cli.verbose {
        eprintln!(
            "{} {} models from {} paths",
            "Checking".cyan(),
            models.len(),
            cli.filenames.len()
        );
    }

    let outcome = HintChecker::new().check(&models);
    let elapsed = started.elapsed();

    let status = reporter::print_violations(&outcome);

    if let Some(output) = &cli.output {
        reporter::save_report(&outcome, output)?;
        if cli.verbose {
            eprintln!("{} {}", "Report saved to:".green(), output.display());
        }
    }

    if cli.verbose {
        reporter::print_summary(&outcome);
    }

    let event = HookEvent::executed(HOOK_NAME, HOOK_DESCRIPTION)
        .with_status(status)
        .with_execution_time(elapsed.as_secs_f64())
        .with_test_flag(cli.is_test)
        .with_manifest(&manifest.metadata);
    let sink = telemetry::sink_for(&config.telemetry, &manifest.metadata, telemetry::disabled_by_env());
    telemetry::emit(sink.as_ref(), &event);

    Ok(u8::try_from(status).unwrap_or(1))
}

/// Explicit config path, then `hintcheck.toml` in the working directory, then defaults
fn load_config(path: Option<&Path>, verbose: bool) -> Result<Config> {
    if let Some(path) = path {
        return Ok(Config::from_file(path)?);
    }

    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    if default_path.exists() {
        return Ok(Config::from_file(default_path)?);
    }

    if verbose {
        eprintln!("{}", "No config file found, using defaults".yellow());
    }
    Ok(Config::default())
}
