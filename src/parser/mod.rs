//! Trace producers and the timeline schema they feed.
//!
//! This module handles:
//! - The category model and detail cutoffs
//! - Parsing clang `-ftime-trace` JSON
//! - Parsing the generic JSON timeline format
//! - Defining the timeline types shared with the engine and binarizer

pub mod category;
pub mod clang_trace;
pub mod schema;
pub mod timeline_input;

// Re-export main types
pub use category::{CompileCategory, ExportDetail, DISPLAY_COUNT, GATHER_FULL};
pub use clang_trace::{load_clang_trace, parse_clang_trace};
pub use schema::{CompileEvent, CompileTimeline, CompileTrack, Timestamp, UnitContext, UnitTrace};
pub use timeline_input::{load_timeline_input, unit_trace, TimelineInput};
