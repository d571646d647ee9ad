//! Output writers for reports and flamegraphs.
//!
//! This module handles writing data to disk:
//! - JSON reports
//! - SVG flamegraphs
//! - Text renderings of the views

pub mod json;
pub mod svg;
pub mod text;

use crate::utils::error::OutputError;
use log::debug;
use std::path::Path;

// Re-export main functions
pub use json::{read_report, report_to_string, write_report};
pub use svg::write_svg;
pub use text::{render_flat_table, render_tree};

/// Check that `path` can be written, creating missing parent directories
///
/// **Public** - shared by the JSON and SVG writers
///
/// # Errors
/// * `OutputError::InvalidPath` - empty path, existing directory, or the
///   parent directory cannot be created
pub fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!("Cannot create directory {}: {}", parent.display(), e))
            })?;
        }
    }

    Ok(())
}
