//! Command-line interface components.

use crate::config::Config;
use crate::models::ProcessingStats;
use crate::processor::{BatchProcessor, BatchResult, FileOutcome, Operation, print_summary};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

#[derive(Parser, Debug, Clone)]
#[command(name = "mwr_processor")]
#[command(about = "Check and normalize microwave radiometer (MWR) station data files")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to config/fc_config.json, then the user config dir)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Input directory, overriding `dir_path` from the configuration
    #[arg(short, long, global = true, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Output directory, overriding `save_path` from the configuration
    #[arg(short, long, global = true, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Number of files processed concurrently
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,

    /// Only process files whose name matches this glob, e.g. "*_RAW_*"
    #[arg(short, long, global = true)]
    pub pattern: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors, no progress bar
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Validate files and report a status code per file
    Check {
        /// Report format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,
    },
    /// Write normalized copies of the files into the output directory
    Transform,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl Args {
    pub fn get_log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }

    /// Resolve the configuration and apply command-line overrides
    pub fn build_config(&self) -> Result<Config> {
        let mut config =
            Config::discover(self.config.as_deref()).context("Failed to load configuration")?;

        if let Some(input) = &self.input {
            config = config.with_input_dir(input.clone());
        }
        if let Some(output) = &self.output {
            config = config.with_output_dir(output.clone());
        }
        if let Some(workers) = self.workers {
            config = config.with_workers(workers);
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    fn glob_pattern(&self) -> Result<Option<glob::Pattern>> {
        self.pattern
            .as_deref()
            .map(|p| glob::Pattern::new(p).with_context(|| format!("Invalid --pattern '{}'", p)))
            .transpose()
    }
}

pub fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mwr_processor={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
            .context("Failed to initialize logging")?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .context("Failed to initialize logging")?;
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Run the selected command and return the batch totals
pub async fn run(args: Args) -> Result<ProcessingStats> {
    setup_logging(&args)?;

    let config = Arc::new(args.build_config()?);
    let processor = BatchProcessor::new(config.clone())
        .context("Failed to build schema registry")?
        .with_pattern(args.glob_pattern()?)
        .with_progress(!args.quiet);

    match args.command {
        Commands::Check { format } => {
            if format == OutputFormat::Human {
                print_banner("Checking", &config);
            }
            let result = processor.check_all().await?;
            match format {
                OutputFormat::Human => {
                    print_check_reports(&result);
                    print_summary(&result.stats, Operation::Check);
                }
                OutputFormat::Json => print_json(&result)?,
            }
            Ok(result.stats)
        }
        Commands::Transform => {
            print_banner("Normalizing", &config);
            let result = processor.transform_all().await?;
            print_failures(&result);
            print_summary(&result.stats, Operation::Transform);
            Ok(result.stats)
        }
    }
}

fn print_banner(action: &str, config: &Config) {
    println!("{}", format!("{} MWR files", action).bright_green().bold());
    println!(
        "  {} {}",
        "Input:".bright_cyan(),
        config.input_dir.display()
    );
    println!(
        "  {} {}",
        "Output:".bright_cyan(),
        config.output_dir.display()
    );
}

fn print_check_reports(result: &BatchResult) {
    println!();
    for outcome in &result.outcomes {
        if let FileOutcome::Checked { report, .. } = outcome {
            if report.passed() {
                println!("{}", report.to_string().green());
            } else {
                println!("{}", report.to_string().yellow());
            }
        }
    }
    print_failures(result);
}

fn print_failures(result: &BatchResult) {
    for outcome in &result.outcomes {
        if let FileOutcome::Failed { path, error } = outcome {
            println!(
                "{} {}",
                path.display().to_string().bright_red(),
                error.to_string().red()
            );
        }
    }
}

/// One JSON object per line: reports and failures, then the totals
fn print_json(result: &BatchResult) -> Result<()> {
    for outcome in &result.outcomes {
        let line = match outcome {
            FileOutcome::Checked { report, .. } => serde_json::to_string(report)?,
            FileOutcome::Failed { path, error } => serde_json::to_string(&serde_json::json!({
                "file": path.display().to_string(),
                "error": error.to_string(),
            }))?,
            FileOutcome::Skipped { path, reason } => serde_json::to_string(&serde_json::json!({
                "file": path.display().to_string(),
                "skipped": reason,
            }))?,
            FileOutcome::Transformed { .. } => continue,
        };
        println!("{}", line);
    }
    println!(
        "{}",
        serde_json::to_string(&serde_json::json!({ "summary": result.stats }))?
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_check_command() {
        let args = Args::try_parse_from([
            "mwr_processor",
            "check",
            "--format",
            "json",
            "--input",
            "/data/in",
            "-w",
            "3",
        ])
        .unwrap();

        assert!(matches!(
            args.command,
            Commands::Check {
                format: OutputFormat::Json
            }
        ));
        assert_eq!(args.input, Some(PathBuf::from("/data/in")));
        assert_eq!(args.workers, Some(3));
        assert_eq!(args.get_log_level(), "info");
    }

    #[test]
    fn test_parse_transform_command() {
        let args = Args::try_parse_from(["mwr_processor", "transform", "-v"]).unwrap();
        assert!(matches!(args.command, Commands::Transform));
        assert_eq!(args.get_log_level(), "debug");
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Args::try_parse_from(["mwr_processor", "check", "-v", "-q"]).is_err());
    }

    #[test]
    fn test_command_required() {
        assert!(Args::try_parse_from(["mwr_processor"]).is_err());
    }

    #[test]
    fn test_build_config_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("fc_config.json");
        fs::write(
            &config_path,
            r#"{"dir_path": "/from/config", "save_path": "/from/config/out"}"#,
        )
        .unwrap();

        let args = Args::try_parse_from([
            "mwr_processor",
            "transform",
            "--config",
            config_path.to_str().unwrap(),
            "--output",
            "/from/cli",
            "--workers",
            "2",
        ])
        .unwrap();

        let config = args.build_config().unwrap();
        assert_eq!(config.input_dir, PathBuf::from("/from/config"));
        assert_eq!(config.output_dir, PathBuf::from("/from/cli"));
        assert_eq!(config.workers, 2);
    }

    #[test]
    fn test_zero_workers_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("fc_config.json");
        fs::write(&config_path, "{}").unwrap();

        let args = Args::try_parse_from([
            "mwr_processor",
            "check",
            "--config",
            config_path.to_str().unwrap(),
            "--workers",
            "0",
        ])
        .unwrap();
        assert!(args.build_config().is_err());
    }

    #[test]
    fn test_invalid_pattern() {
        let args =
            Args::try_parse_from(["mwr_processor", "check", "--pattern", "[unclosed"]).unwrap();
        assert!(args.glob_pattern().is_err());
    }
}
