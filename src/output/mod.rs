//! Output writers for score data.
//!
//! This module handles writing data to disk in various formats:
//! - Binary score files (main, globals and timeline companions)
//! - Reading the binary files back
//! - JSON and text summaries

pub mod binarizer;
pub mod json;
pub mod reader;
pub mod wire;

// Re-export main types and functions
pub use binarizer::{globals_path, timeline_path, ScoreBinarizer};
pub use json::{build_summary, generate_text_summary, read_summary, write_summary, ScoreSummary};
pub use reader::{read_globals_file, read_score_file, read_timeline_file, GlobalsFile, ScoreFile, TimelineFile};

use crate::utils::error::OutputError;
use log::debug;
use std::path::Path;

/// Check that `path` can be written as a file and create its parent directories
///
/// **Private** - shared by every writer in this module
///
/// # Errors
/// * `OutputError::InvalidPath` - Path is empty, is a directory, or its parent cannot be created
pub(crate) fn prepare_output_path(path: &Path) -> Result<(), OutputError> {
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
