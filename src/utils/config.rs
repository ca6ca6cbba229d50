//! Configuration and constants for the score generator.

use crate::parser::category::ExportDetail;

/// Binary format version stamped at the start of every score file.
///
/// Readers reject files whose version differs.
pub const SCORE_VERSION: u32 = 12;

/// Number of units written to a timeline file before rolling to the next one
pub const DEFAULT_TIMELINE_PACK: u32 = 100;

/// Fixed width of the decimal file number in `<base>.t0000`
pub const TIMELINE_FILE_DIGITS: usize = 4;

/// Default output file name for the main score file
pub const DEFAULT_OUTPUT_NAME: &str = "compileData.scor";

/// Extension appended to the base path for the globals file
pub const GLOBALS_EXTENSION: &str = "gbl";

/// Prefix of the extension appended to the base path for timeline files
pub const TIMELINE_EXTENSION_PREFIX: &str = "t";

/// Name written when an interned string cannot be resolved
pub const UNKNOWN_NAME: &str = "?";

/// Name id written to timelines for events without a global dictionary entry
pub const INVALID_NAME_ID: u32 = u32::MAX;

/// Default number of entries per category in summaries
pub const DEFAULT_TOP_ENTRIES: usize = 10;

// Clang -ftime-trace names that do not map to a single category
pub const CLANG_TOTAL_PREFIX: &str = "Total ";
pub const TRACE_FILE_EXTENSION: &str = "json";

/// Request-scoped export settings passed down the aggregation chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportParams {
    /// Detail of the global statistics
    pub detail: ExportDetail,

    /// Detail of the exported timelines, never finer than `detail`
    pub timeline_detail: ExportDetail,

    /// Timelines per companion file
    pub timeline_pack: u32,

    /// Write timeline companion files
    pub timeline_enabled: bool,

    /// Build the include graph
    pub includers_enabled: bool,
}

impl Default for ExportParams {
    fn default() -> Self {
        Self {
            detail: ExportDetail::Full,
            timeline_detail: ExportDetail::Full,
            timeline_pack: DEFAULT_TIMELINE_PACK,
            timeline_enabled: true,
            includers_enabled: true,
        }
    }
}

impl ExportParams {
    /// Timeline detail clamped to the statistics detail
    pub fn effective_timeline_detail(&self) -> ExportDetail {
        self.timeline_detail.min(self.detail)
    }
}
