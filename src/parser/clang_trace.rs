//! Clang `-ftime-trace` adapter.
//!
//! Each trace file describes one translation unit in the Chrome trace event
//! format. Only complete events (`"ph": "X"`) carry activity data; clang's
//! `ExecuteCompiler` event spans the whole unit and delimits its time
//! section, and `"Total ..."` events are per-file summaries that are ignored.

use super::category::{CompileCategory, ExportDetail};
use super::schema::{PassSlot, Timestamp, UnitTrace};
use crate::aggregator::strings::StringTable;
use crate::aggregator::track_builder::TrackBuilder;
use crate::utils::config::{CLANG_TOTAL_PREFIX, TRACE_FILE_EXTENSION};
use crate::utils::error::ParseError;
use log::{debug, warn};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Top-level object of a clang time trace
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClangTraceFile {
    #[serde(default)]
    pub trace_events: Vec<ClangTraceEvent>,

    /// Absolute start of the process clock, in microseconds
    #[serde(default)]
    pub beginning_of_time: Option<u64>,
}

/// One event of a clang time trace
#[derive(Debug, Clone, Deserialize)]
pub struct ClangTraceEvent {
    #[serde(default)]
    pub ph: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub ts: f64,

    #[serde(default)]
    pub dur: Option<f64>,

    #[serde(default)]
    pub tid: u64,

    #[serde(default)]
    pub args: Option<ClangTraceArgs>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClangTraceArgs {
    #[serde(default)]
    pub detail: Option<String>,
}

impl ClangTraceEvent {
    fn is_complete(&self) -> bool {
        self.ph == "X"
    }

    fn duration(&self) -> u32 {
        self.dur.unwrap_or(0.0).clamp(0.0, u32::MAX as f64) as u32
    }

    fn detail(&self) -> Option<&str> {
        self.args
            .as_ref()
            .and_then(|args| args.detail.as_deref())
            .filter(|detail| !detail.is_empty())
    }
}

/// Unit name for a trace file: its path without the `.json` extension
///
/// **Public** - used by commands to name units before parsing
pub fn unit_name_for(path: &Path) -> String {
    let is_trace = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(TRACE_FILE_EXTENSION));
    if is_trace {
        path.with_extension("").to_string_lossy().into_owned()
    } else {
        path.to_string_lossy().into_owned()
    }
}

/// Load and parse one clang trace file
///
/// **Public** - main entry point for clang inputs
///
/// # Errors
/// * `ParseError::IoError` - File cannot be read
/// * `ParseError::JsonError` - File is not a valid trace object
pub fn load_clang_trace(
    path: &Path,
    strings: &mut StringTable,
    detail: ExportDetail,
) -> Result<UnitTrace, ParseError> {
    debug!("Reading clang trace: {}", path.display());
    let content = fs::read_to_string(path)?;
    parse_clang_trace(&unit_name_for(path), &content, strings, detail)
}

/// Parse the JSON text of one clang trace into a unit trace
///
/// **Public** - exposed for in-memory use and tests
///
/// # Arguments
/// * `unit_name` - Name given to the translation unit
/// * `content` - Raw JSON text
/// * `strings` - Table receiving every interned name
/// * `detail` - Events this detail does not keep are dropped on ingestion
pub fn parse_clang_trace(
    unit_name: &str,
    content: &str,
    strings: &mut StringTable,
    detail: ExportDetail,
) -> Result<UnitTrace, ParseError> {
    let trace: ClangTraceFile = serde_json::from_str(content)?;
    let base_time = trace.beginning_of_time.unwrap_or(0);
    let unit_hash = strings.store(unit_name);

    let events: Vec<&ClangTraceEvent> = trace
        .trace_events
        .iter()
        .filter(|event| event.is_complete() && !event.name.starts_with(CLANG_TOTAL_PREFIX))
        .collect();

    if events.is_empty() {
        warn!("No complete events in clang trace for {}", unit_name);
    }

    // The unit section is clang's own ExecuteCompiler span when present
    let (origin, section_duration) = match events
        .iter()
        .find(|event| event.name == "ExecuteCompiler")
    {
        Some(root) => (root.ts, root.duration()),
        None => {
            let start = events.iter().map(|e| e.ts).fold(f64::INFINITY, f64::min);
            let end = events
                .iter()
                .map(|e| e.ts + e.dur.unwrap_or(0.0))
                .fold(0.0, f64::max);
            if start.is_finite() {
                (start, (end - start).clamp(0.0, u32::MAX as f64) as u32)
            } else {
                (0.0, 0)
            }
        }
    };

    let mut builder = TrackBuilder::new(unit_hash);
    builder.begin_section(to_timestamp(origin));

    for event in events {
        let category = CompileCategory::from_clang_name(&event.name);
        if category == CompileCategory::ExecuteCompiler || !detail.keeps(category) {
            continue;
        }

        let name_hash = match event.detail() {
            Some(text) => strings.store(text),
            None if category.is_pass() => unit_hash,
            None => strings.store(&event.name),
        };

        let thread_id = event.tid as u32;
        let start = to_timestamp(event.ts);
        builder.add_event(thread_id, category, start, event.duration(), name_hash);

        let slot = match category {
            CompileCategory::FrontEnd => Some(PassSlot::FrontEnd),
            CompileCategory::BackEnd => Some(PassSlot::BackEnd),
            _ => None,
        };
        if let Some(slot) = slot {
            let absolute = Timestamp::from_micros(base_time).saturating_add(start.as_micros());
            builder.context_mut().record(slot, absolute, thread_id);
        }
    }

    builder.close_section(section_duration);
    Ok(builder.finish())
}

fn to_timestamp(micros: f64) -> Timestamp {
    Timestamp::from_micros(micros.max(0.0) as u64)
}
