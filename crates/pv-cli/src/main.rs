use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pv_cli::commands::query::RowTarget;
use pv_cli::commands::util::load_trace;
use pv_cli::commands::{geometry, query, rows, summary};
use pv_cli::{Cli, Commands, Config};
use pv_core::Step;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so command output stays machine-readable.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match command {
        Commands::Summary { log } => {
            let trace = load_trace(&log.log, &config)?;
            summary::run(&mut out, &trace.index, &config, log.json)?;
        }
        Commands::Rows { log } => {
            let trace = load_trace(&log.log, &config)?;
            rows::run(&mut out, &trace.index, log.json)?;
        }
        Commands::Geometry { log, out: path } => {
            let trace = load_trace(&log.log, &config)?;
            geometry::run(&mut out, &trace.geometry, path.as_deref(), log.json)?;
        }
        Commands::Find { log, row, y, time } => {
            let trace = load_trace(&log.log, &config)?;
            let target = match (row, y) {
                (Some(row), _) => RowTarget::Row(*row),
                (None, Some(y)) => RowTarget::Y(*y),
                (None, None) => anyhow::bail!("either --row or --y is required"),
            };
            query::find(&mut out, &trace.index, target, *time, log.json)?;
        }
        Commands::Select {
            log,
            process,
            thread,
            position,
        } => {
            let trace = load_trace(&log.log, &config)?;
            query::select(&mut out, &trace.index, *process, *thread, *position, log.json)?;
        }
        Commands::Step {
            log,
            row,
            time,
            steps,
        } => {
            let trace = load_trace(&log.log, &config)?;
            let steps: Vec<Step> = steps.iter().copied().map(Step::from).collect();
            query::step(&mut out, &trace.index, *row, *time, &steps, log.json)?;
        }
    }

    out.flush()?;
    Ok(())
}
