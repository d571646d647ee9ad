use crate::output::read_report;
use crate::utils::config::REPORT_SCHEMA_VERSION;
use anyhow::{Context, Result};
use std::path::Path;

/// Validate a report JSON file
pub fn validate_report_file(file_path: impl AsRef<Path>) -> Result<()> {
    let file_path = file_path.as_ref();
    println!("Validating report: {}", file_path.display());

    let report = read_report(file_path)
        .with_context(|| format!("Invalid report {}", file_path.display()))?;

    if report.version != REPORT_SCHEMA_VERSION {
        anyhow::bail!(
            "Unsupported report version {} (expected {})",
            report.version,
            REPORT_SCHEMA_VERSION
        );
    }

    println!("✓ Valid report JSON");
    println!("  Version: {}", report.version);
    println!("  Source: {}", report.source);
    match report.status.parse.error() {
        None => println!("  Status: complete"),
        Some(error) => println!("  Status: partial ({})", error),
    }
    println!("  Frames: {}", report.frame_count);
    println!("  Total Cycles: {}", report.total_cycles);
    println!("  Functions: {}", report.flat.len());
    println!("  Hot Paths: {}", report.hot_paths.len());

    Ok(())
}

/// Display version information
pub fn display_version() {
    println!("uprof-studio v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", REPORT_SCHEMA_VERSION);
    println!();
    println!("Analyzer for .uprof script profiler traces.");
}
