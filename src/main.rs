use clap::Parser;
use mwr_processor::cli::{self, Args};
use std::process;

fn main() {
    let args = Args::parse();

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        tokio::select! {
            result = cli::run(args) => result,
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    return Err(anyhow::anyhow!("Failed to listen for CTRL+C: {}", e));
                }
                eprintln!("\nReceived CTRL+C, shutting down gracefully...");
                Err(mwr_processor::MwrError::ProcessingInterrupted {
                    reason: "Processing interrupted by user".to_string(),
                }
                .into())
            }
        }
    });

    match result {
        // validation failures are reported, not fatal; only unprocessable files fail the run
        Ok(stats) if stats.has_failures() => process::exit(1),
        Ok(_) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}
