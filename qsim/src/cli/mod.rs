//! CLI argument parsing and command dispatch

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use qsim_core::{Config, RequestType};
use std::path::{Path, PathBuf};

pub mod run;

#[derive(Debug, Parser)]
#[command(name = "qsim")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Diagnostic log level (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Replay the configured request sequence against a fresh server
    Run(RunArgs),
    /// Load and validate a configuration file
    Validate {
        /// Path to configuration file
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: PathBuf,

    /// Number of log entries repeated in the final summary
    #[arg(long, default_value_t = 10)]
    pub tail: usize,

    /// Milliseconds between refreshes of the queue view
    #[arg(long, default_value_t = 100)]
    pub refresh_ms: u64,

    /// Milliseconds the worker waits on an empty queue before re-checking for stop
    #[arg(long, default_value_t = 1000)]
    pub poll_ms: u64,

    /// Read pause, resume, p (toggle) and stop commands from stdin
    #[arg(short, long)]
    pub interactive: bool,

    /// Server name used in diagnostics and metrics labels
    #[arg(long, default_value = "server")]
    pub name: String,
}

pub fn load_config(path: &Path) -> Result<Config> {
    Config::from_path(path).with_context(|| format!("Invalid configuration {}", path.display()))
}

pub fn validate(path: &Path) -> Result<()> {
    let config = load_config(path)?;
    println!("{} is valid", path.display());
    println!("  queue capacity:   {}", config.queue_capacity);
    println!("  arrival interval: {:?}", config.arrival_interval);
    for request_type in [RequestType::Read, RequestType::Write, RequestType::Forward] {
        println!(
            "  {:<17} {:?}",
            format!("{request_type} time:"),
            config.service.duration_for(&request_type)
        );
    }
    println!("  fallback time:    {:?}", config.service.fallback());

    let unknown: Vec<_> = config
        .request_sequence
        .iter()
        .filter(|request_type| !config.service.is_mapped(request_type))
        .map(RequestType::as_str)
        .collect();
    println!("  sequence length:  {}", config.request_sequence.len());
    if !unknown.is_empty() {
        println!("  served with fallback: {}", unknown.join(", "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "qsim",
            "run",
            "--config",
            "sim.json",
            "--tail",
            "5",
            "--interactive",
        ])
        .unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.config, PathBuf::from("sim.json"));
                assert_eq!(args.tail, 5);
                assert_eq!(args.refresh_ms, 100);
                assert!(args.interactive);
            }
            other => panic!("expected run, got {other:?}"),
        }
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn test_parse_validate_with_global_flag() {
        let cli =
            Cli::try_parse_from(["qsim", "validate", "-c", "sim.json", "--log-level", "debug"])
                .unwrap();
        assert!(matches!(cli.command, Commands::Validate { .. }));
        assert_eq!(cli.log_level, "debug");
    }

    #[test]
    fn test_config_is_required() {
        assert!(Cli::try_parse_from(["qsim", "run"]).is_err());
    }
}
