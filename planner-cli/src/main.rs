//! The mission-planner binary runs generation sweeps and summarizes their run logs.

use anyhow::Context;
use clap::{Parser, Subcommand};
use mission_planner::backends::select_backend;
use mission_planner::inputs::read_inputs;
use mission_planner::runlog::RunLog;
use mission_planner::settings::PlannerConfig;
use mission_planner::summary::{render_table, summarize};
use mission_planner::sweep::run_sweep;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "config/localhost.yaml";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs every input through every model and temperature (default)
    Run {
        /// Configuration file
        #[arg(long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,
    },
    /// Prints aggregate statistics of a run log
    Summarize {
        /// Run-log file
        path: PathBuf,
    },
    /// Checks that every configured backend and the validator are usable
    Check {
        /// Configuration file
        #[arg(long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,
    },
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Summarize { path }) => {
            init_tracing("warn");
            summarize_log(&path)
        }
        Some(Commands::Check { config }) => {
            let config = load(&config)?;
            init_tracing(&config.logging);
            check(&config).await
        }
        Some(Commands::Run { config }) => {
            let config = load(&config)?;
            init_tracing(&config.logging);
            run(&config).await
        }
        None => {
            let config = load(Path::new(DEFAULT_CONFIG))?;
            init_tracing(&config.logging);
            run(&config).await
        }
    }
}

fn load(path: &Path) -> anyhow::Result<PlannerConfig> {
    PlannerConfig::from_file(path)
        .with_context(|| format!("loading configuration from {}", path.display()))
}

async fn run(config: &PlannerConfig) -> anyhow::Result<()> {
    let inputs = read_inputs(&config.inputs)?;
    let validator = config.build_validator()?;
    let run_log = RunLog::new(config.run_log_path());
    let settings = config.backend_settings();

    tracing::info!(
        models = config.models.len(),
        temperatures = config.temperatures.len(),
        inputs = inputs.len(),
        validator = %validator.describe(),
        run_log = %run_log.path().display(),
        "Starting sweep"
    );

    let report = run_sweep(config, &inputs, validator, &run_log, |spec, temperature| {
        select_backend(spec, temperature, &settings)
    })
    .await?;

    println!(
        "{} queries completed ({} succeeded), {} aborted, {} cell(s) skipped",
        report.completed, report.succeeded, report.aborted, report.failed_cells
    );
    Ok(())
}

fn summarize_log(path: &Path) -> anyhow::Result<()> {
    let (records, skipped) = RunLog::read(path)?;
    print!("{}", render_table(&summarize(&records), skipped));
    Ok(())
}

async fn check(config: &PlannerConfig) -> anyhow::Result<()> {
    let settings = config.backend_settings();
    let mut failures = 0;

    match config.build_validator() {
        Ok(validator) => println!("[ok]   validator: {}", validator.describe()),
        Err(e) => {
            failures += 1;
            println!("[fail] validator: {e}");
        }
    }

    for spec in &config.models {
        let temperature = config.temperatures.first().copied().unwrap_or_default();
        let status = match select_backend(spec, temperature, &settings) {
            Ok(client) => client.check_health().await,
            Err(e) => Err(e),
        };
        match status {
            Ok(()) => println!("[ok]   model {} ({:?})", spec.name, spec.backend),
            Err(e) => {
                failures += 1;
                println!("[fail] model {} ({:?}): {e}", spec.name, spec.backend);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} check(s) failed");
    }
    Ok(())
}
