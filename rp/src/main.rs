//! rp - bounded-concurrency range runner
//!
//! CLI entry point for running the demo job over a range.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use tracing::{debug, info};

use rangepool::cli::{Cli, Command, OutputFormat};
use rangepool::config::Config;
use rangepool::demo::{self, DemoConfig, DemoError};
use rangepool::{IndexRange, RangeOutcome, RangeScheduler, SchedulerConfig, parse_concurrency};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rangepool")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level).map(|s| s.to_uppercase()) {
        Some(s) => match s.as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("rangepool.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.validate()?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Run {
            start,
            end,
            concurrency,
            delay_ms,
            jitter_ms,
            fail_at,
            format,
        } => {
            let job = DemoConfig {
                delay_ms: delay_ms.unwrap_or(config.demo.delay_ms),
                jitter_ms: jitter_ms.unwrap_or(config.demo.jitter_ms),
                fail_at: fail_at.or(config.demo.fail_at),
            };
            cmd_run(&config, &start, &end, concurrency.as_deref(), job, format).await
        }
        Command::Config => cmd_config(&config),
    }
}

async fn cmd_run(
    config: &Config,
    start: &str,
    end: &str,
    concurrency: Option<&str>,
    job: DemoConfig,
    format: OutputFormat,
) -> Result<()> {
    debug!(%start, %end, ?concurrency, ?job, "cmd_run: called");
    let range = IndexRange::parse(start, end)?;
    let max_concurrency = match concurrency {
        Some(value) => parse_concurrency(value)?,
        None => config.scheduler.max_concurrency,
    };

    let scheduler = RangeScheduler::new(range, SchedulerConfig { max_concurrency })?;
    info!(%range, max_concurrency, "Running demo job");

    let job = &job;
    let outcome = scheduler.run(|index| demo::square(index, job)).await;

    match format {
        OutputFormat::Text => print_text(&range, &outcome),
        OutputFormat::Json => print_json(&range, &outcome)?,
    }

    match outcome.error {
        Some(failure) => Err(eyre!(failure)),
        None => Ok(()),
    }
}

fn print_text(range: &IndexRange, outcome: &RangeOutcome<i64, DemoError>) {
    for values in &outcome.results {
        let rendered: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        println!("{}", rendered.join(" "));
    }

    match &outcome.error {
        Some(failure) => println!(
            "{} {} after {} of {} indices",
            "✗".red(),
            failure.to_string().red(),
            outcome.results.len(),
            range.len()
        ),
        None => println!("{} Processed {} indices in {}", "✓".green(), range.len(), range.to_string().cyan()),
    }
}

fn print_json(range: &IndexRange, outcome: &RangeOutcome<i64, DemoError>) -> Result<()> {
    let error = outcome.error.as_ref().map(|failure| {
        serde_json::json!({
            "index": failure.index,
            "message": failure.error.to_string(),
        })
    });

    let report = serde_json::json!({
        "start": range.start(),
        "end": range.end(),
        "results": outcome.results,
        "error": error,
        "stats": outcome.stats,
    });

    println!("{}", serde_json::to_string_pretty(&report).context("Failed to serialize report")?);
    Ok(())
}

fn cmd_config(config: &Config) -> Result<()> {
    debug!("cmd_config: called");
    print!("{}", config.to_yaml()?);
    Ok(())
}
