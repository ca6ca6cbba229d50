//! Aggregation of unit traces into the run-wide score.
//!
//! This module transforms per-unit event tracks into:
//! - Zero-based timelines with self durations
//! - Per-category global statistics keyed by interned name
//! - Per-unit bucket totals, the include graph and the folder tree

pub mod engine;
pub mod includes;
pub mod score;
pub mod self_time;
pub mod strings;
pub mod track_builder;

// Re-export main types and functions
pub use engine::process_timeline;
pub use includes::build_folders;
pub use score::{CompileData, CompileDictionary, CompileFolder, CompileIncluder, CompileUnit, ScoreData};
pub use strings::StringTable;
pub use track_builder::TrackBuilder;
