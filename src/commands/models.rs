use crate::parser::category::ExportDetail;
use crate::utils::config::{ExportParams, DEFAULT_OUTPUT_NAME, DEFAULT_TOP_ENTRIES};
use clap::ValueEnum;
use std::path::PathBuf;

/// Trace producer of the input files
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// Clang `-ftime-trace` JSON, one unit per file
    Clang,
    /// Generic JSON timelines, any number of units per file
    Timeline,
}

/// Arguments for the generate command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct GenerateArgs {
    /// Trace file or directory to scan
    pub input: PathBuf,

    pub format: InputFormat,

    /// Path of the main score file; companions are written next to it
    pub output: PathBuf,

    pub params: ExportParams,

    /// Print text summary to stdout
    pub print_summary: bool,

    /// Output path for a JSON summary (optional)
    pub summary_json: Option<PathBuf>,

    /// Entries per list in summaries
    pub top_entries: usize,
}

impl Default for GenerateArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::from("."),
            format: InputFormat::Clang,
            output: PathBuf::from(DEFAULT_OUTPUT_NAME),
            params: ExportParams::default(),
            print_summary: false,
            summary_json: None,
            top_entries: DEFAULT_TOP_ENTRIES,
        }
    }
}

impl GenerateArgs {
    pub fn with_detail(mut self, detail: ExportDetail) -> Self {
        self.params.detail = detail;
        self
    }
}
