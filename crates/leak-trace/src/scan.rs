//! Per-file detection and JSON-lines reporting.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use common::protocol::{DetectionReport, ErrorResponse};
use common::ServiceError;
use serde::Serialize;
use tracing::{debug, info, warn};

/// One output line.
#[derive(Debug, Serialize)]
struct ScanLine<'a> {
    file: &'a str,
    #[serde(flatten)]
    report: Option<DetectionReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorResponse>,
}

/// Totals over a scan run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    pub found: usize,
    pub absent: usize,
    pub failed: usize,
}

/// Scan `files` in order, writing one JSON line per file to `out`.
///
/// A file that cannot be read or decoded is reported on its line and counted
/// as failed; the run continues.
///
/// # Errors
///
/// Returns an error only if writing to `out` fails.
pub async fn run<P, W>(files: &[P], out: &mut W) -> Result<ScanSummary>
where
    P: AsRef<Path>,
    W: Write,
{
    let mut summary = ScanSummary::default();
    for path in files {
        let path = path.as_ref();
        let label = path.display().to_string();
        let line = match scan_file(path).await {
            Ok(report) => {
                if report.is_found() {
                    summary.found += 1;
                    info!(file = %label, "watermark recovered");
                } else {
                    summary.absent += 1;
                    debug!(file = %label, "no watermark");
                }
                ScanLine {
                    file: &label,
                    report: Some(report),
                    error: None,
                }
            }
            Err(e) => {
                summary.failed += 1;
                warn!(file = %label, error = %e, "scan failed");
                ScanLine {
                    file: &label,
                    report: None,
                    error: Some(e.to_response()),
                }
            }
        };
        serde_json::to_writer(&mut *out, &line).context("failed to write scan result")?;
        writeln!(out).context("failed to write scan result")?;
    }
    info!(
        found = summary.found,
        absent = summary.absent,
        failed = summary.failed,
        "scan complete"
    );
    Ok(summary)
}

async fn scan_file(path: &Path) -> Result<DetectionReport, ServiceError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ServiceError::BadRequest(format!("cannot read file: {e}")))?;
    vault::detect(bytes).await
}
