//! Batch processing engine.
//!
//! Runs the checker or the normalizer over every file of an input directory.
//! Files are independent: each one is handled on the blocking thread pool,
//! with at most `workers` in flight, and a failure is recorded against that
//! file without stopping the rest of the batch.

pub mod discovery;

pub use discovery::{FileDiscovery, discover_files};

use crate::check::{FormatChecker, ValidationReport};
use crate::config::Config;
use crate::constants::PROGRESS_UPDATE_INTERVAL_MS;
use crate::error::{MwrError, Result};
use crate::models::{FileName, ProcessingStats};
use crate::transform::Normalizer;

use colored::*;
use futures::stream::{self, StreamExt};
use glob::Pattern;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task;
use tracing::{debug, error, info, warn};

/// What a batch does to each file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Check,
    Transform,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Check => f.write_str("check"),
            Operation::Transform => f.write_str("transform"),
        }
    }
}

/// Result of processing one file
#[derive(Debug)]
pub enum FileOutcome {
    /// Validation completed; the report may still contain failures
    Checked {
        path: PathBuf,
        report: ValidationReport,
    },
    /// Normalized output was written
    Transformed { path: PathBuf, output: PathBuf },
    /// The file could not be processed
    Failed { path: PathBuf, error: MwrError },
    /// The file name does not follow the naming convention
    Skipped { path: PathBuf, reason: String },
}

impl FileOutcome {
    pub fn path(&self) -> &Path {
        match self {
            FileOutcome::Checked { path, .. }
            | FileOutcome::Transformed { path, .. }
            | FileOutcome::Failed { path, .. }
            | FileOutcome::Skipped { path, .. } => path,
        }
    }
}

/// Outcomes of a batch, in file name order, with totals
#[derive(Debug)]
pub struct BatchResult {
    pub outcomes: Vec<FileOutcome>,
    pub stats: ProcessingStats,
}

/// Drives the checker and normalizer over an input directory
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    config: Arc<Config>,
    checker: FormatChecker,
    normalizer: Normalizer,
    pattern: Option<Pattern>,
    show_progress: bool,
}

impl BatchProcessor {
    /// Create a processor; fails if the column schemas are unusable
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let registry = Arc::new(config.schema_registry()?);

        Ok(Self {
            checker: FormatChecker::new(registry),
            normalizer: Normalizer::new(config.clone()),
            config,
            pattern: None,
            show_progress: false,
        })
    }

    /// Restrict the batch to file names matching `pattern`
    pub fn with_pattern(mut self, pattern: Option<Pattern>) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Validate every file in the input directory
    pub async fn check_all(&self) -> Result<BatchResult> {
        self.run(Operation::Check).await
    }

    /// Normalize every file in the input directory into the output directory
    pub async fn transform_all(&self) -> Result<BatchResult> {
        self.run(Operation::Transform).await
    }

    async fn run(&self, operation: Operation) -> Result<BatchResult> {
        let start_time = Instant::now();

        let files = FileDiscovery::new(self.config.input_dir.clone())
            .with_pattern(self.pattern.clone())
            .discover()?;
        info!(
            "Starting {} of {} files in {}",
            operation,
            files.len(),
            self.config.input_dir.display()
        );

        let pb = self.progress_bar(files.len() as u64, operation);
        let concurrent_limit = self.config.workers.max(1);

        let mut outcomes: Vec<FileOutcome> = stream::iter(files)
            .map(|path| {
                let pb = pb.clone();
                async move {
                    if let Some(file_name) = path.file_name() {
                        pb.set_message(file_name.to_string_lossy().to_string());
                    }
                    let outcome = self.process_file(path, operation).await;
                    pb.inc(1);
                    outcome
                }
            })
            .buffer_unordered(concurrent_limit)
            .collect()
            .await;

        pb.finish_and_clear();
        outcomes.sort_by(|a, b| a.path().cmp(b.path()));

        let mut stats = ProcessingStats::default();
        for outcome in &outcomes {
            record_outcome(&mut stats, outcome);
        }
        stats.processing_time_ms = start_time.elapsed().as_millis();

        debug!(
            "Finished {}: {} processed, {} failed, {} skipped",
            operation, stats.files_processed, stats.files_failed, stats.files_skipped
        );
        Ok(BatchResult { outcomes, stats })
    }

    async fn process_file(&self, path: PathBuf, operation: Operation) -> FileOutcome {
        if let Err(e) = FileName::from_path(&path) {
            warn!("Skipping {}: {}", path.display(), e);
            return FileOutcome::Skipped {
                path,
                reason: e.to_string(),
            };
        }

        let task_path = path.clone();
        let joined = match operation {
            Operation::Check => {
                let checker = self.checker.clone();
                task::spawn_blocking(move || {
                    checker
                        .check_file(&task_path)
                        .map(|report| FileOutcome::Checked {
                            path: task_path.clone(),
                            report,
                        })
                })
                .await
            }
            Operation::Transform => {
                let normalizer = self.normalizer.clone();
                task::spawn_blocking(move || {
                    normalizer
                        .transform_file(&task_path)
                        .map(|output| FileOutcome::Transformed {
                            path: task_path.clone(),
                            output,
                        })
                })
                .await
            }
        };

        let result = joined.unwrap_or_else(|e| {
            Err(MwrError::ProcessingInterrupted {
                reason: format!("worker for {} stopped: {}", path.display(), e),
            })
        });

        match result {
            Ok(outcome) => {
                log_outcome(&outcome);
                outcome
            }
            Err(e) => {
                error!("Failed to {} {}: {}", operation, path.display(), e);
                FileOutcome::Failed { path, error: e }
            }
        }
    }

    fn progress_bar(&self, len: u64, operation: Operation) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} {prefix:.bold} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
        );
        pb.set_prefix(operation.to_string());
        pb.enable_steady_tick(Duration::from_millis(PROGRESS_UPDATE_INTERVAL_MS));
        pb
    }
}

fn log_outcome(outcome: &FileOutcome) {
    match outcome {
        FileOutcome::Checked { report, .. } => {
            info!(
                file = report.file(),
                status = report.status_code(),
                diagnostics = ?report.messages(),
                "Checked {}",
                report.record_type()
            );
        }
        FileOutcome::Transformed { path, output } => {
            info!(
                file = %path.display(),
                output = %output.display(),
                "Transformed"
            );
        }
        FileOutcome::Failed { .. } | FileOutcome::Skipped { .. } => {}
    }
}

fn record_outcome(stats: &mut ProcessingStats, outcome: &FileOutcome) {
    match outcome {
        FileOutcome::Checked { report, .. } => {
            stats.files_processed += 1;
            if report.passed() {
                stats.files_passed += 1;
            } else {
                stats.files_flagged += 1;
            }
        }
        FileOutcome::Transformed { .. } => stats.files_processed += 1,
        FileOutcome::Failed { .. } => stats.files_failed += 1,
        FileOutcome::Skipped { .. } => stats.files_skipped += 1,
    }
}

/// Print the coloured end-of-run summary to stdout
pub fn print_summary(stats: &ProcessingStats, operation: Operation) {
    println!("\n{}", "Processing Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        stats.processing_time_ms.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Files processed:".bright_cyan(),
        stats.files_processed.to_string().bright_white()
    );
    if operation == Operation::Check {
        println!(
            "  {} {}",
            "Files passed:".bright_cyan(),
            stats.files_passed.to_string().bright_green()
        );
        if stats.files_flagged > 0 {
            println!(
                "  {} {}",
                "Files with failed checks:".bright_yellow(),
                stats.files_flagged.to_string().bright_yellow().bold()
            );
        }
    }
    if stats.files_failed > 0 {
        println!(
            "  {} {}",
            "Files failed:".bright_red(),
            stats.files_failed.to_string().bright_red().bold()
        );
    }
    if stats.files_skipped > 0 {
        println!(
            "  {} {}",
            "Files skipped:".bright_yellow(),
            stats.files_skipped.to_string().bright_white()
        );
    }
}
