//! Command-line arguments.

use std::path::PathBuf;

pub use clap::Parser;

/// Scan leaked images for the viewer identity embedded when they were rendered.
///
/// Prints one JSON line per file to stdout; logs go to stderr.
#[derive(Parser, Debug)]
#[command(name = "leak-trace", version, about, long_about = None)]
pub struct Args {
    /// Override `LOG_LEVEL` (error, warn, info, debug, trace)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Image files to scan
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}
