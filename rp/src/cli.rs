//! CLI command definitions and subcommands

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// rp - bounded-concurrency runs over integer ranges
#[derive(Parser, Debug)]
#[command(name = "rp")]
#[command(author, version, about = "Run an async job over an integer range with bounded concurrency", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the demo job over [START, END)
    Run {
        /// First index (inclusive)
        #[arg(allow_negative_numbers = true)]
        start: String,

        /// Last index (exclusive)
        #[arg(allow_negative_numbers = true)]
        end: String,

        /// Max concurrent invocations (default from config, else 10)
        #[arg(short = 'j', long)]
        concurrency: Option<String>,

        /// Base delay per index in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Random extra delay per index in milliseconds
        #[arg(long)]
        jitter_ms: Option<u64>,

        /// Index that fails instead of producing values
        #[arg(long, allow_negative_numbers = true)]
        fail_at: Option<i64>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the effective configuration
    Config,
}

/// Output format for `rp run`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run() {
        let cli = Cli::parse_from(["rp", "run", "-5", "5", "-j", "2", "--fail-at", "-1", "--format", "json"]);
        match cli.command {
            Command::Run {
                start,
                end,
                concurrency,
                fail_at,
                format,
                ..
            } => {
                assert_eq!(start, "-5");
                assert_eq!(end, "5");
                assert_eq!(concurrency.as_deref(), Some("2"));
                assert_eq!(fail_at, Some(-1));
                assert_eq!(format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_bounds_are_raw_strings() {
        // Integer checks happen in IndexRange::parse so messages stay consistent
        let cli = Cli::parse_from(["rp", "run", "a", "1"]);
        assert!(matches!(cli.command, Command::Run { ref start, .. } if start == "a"));
    }
}
