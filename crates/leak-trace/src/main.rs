//! `leak-trace`: recover viewer identities from leaked images.
//!
//! Startup sequence:
//! 1. Parse arguments and load [`Config`](config::Config) from the environment.
//! 2. Initialise structured JSON logging on stderr.
//! 3. Scan every file, printing one JSON line per file to stdout.
//!
//! Exits non-zero if any file could not be read or decoded.

mod args;
mod config;
mod scan;
mod telemetry;

use std::process::ExitCode;

use anyhow::Result;
use args::{Args, Parser};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = config::Config::from_env()
        .and_then(|c| c.with_log_level(args.log_level.clone()))
        .map_err(|e| {
            eprintln!("ERROR: leak-trace configuration invalid: {e}");
            e
        })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;

    // -----------------------------------------------------------------------
    // 3. Scan
    // -----------------------------------------------------------------------
    let mut stdout = std::io::stdout();
    let summary = scan::run(&args.files, &mut stdout).await?;
    if summary.failed > 0 {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
