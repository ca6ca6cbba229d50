//! Generic JSON timeline input.
//!
//! A producer-neutral format carrying already-demultiplexed units:
//!
//! ```json
//! { "units": [ { "unitName": "a.cpp", "startTime": 0,
//!                "tracks": [ [ { "category": "Include", "start": 0,
//!                                "duration": 5, "name": "h.h" } ] ] } ] }
//! ```
//!
//! Event starts are relative to the unit; `startTime` optionally places the
//! unit on the build's absolute clock.

use super::category::{CompileCategory, ExportDetail};
use super::schema::{PassSlot, Timestamp, UnitTrace};
use crate::aggregator::strings::StringTable;
use crate::aggregator::track_builder::TrackBuilder;
use crate::utils::error::ParseError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// File-level container of unit timelines
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimelineInput {
    #[serde(default)]
    pub units: Vec<InputUnit>,
}

/// One completed unit, one inner array per thread
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputUnit {
    pub unit_name: String,

    #[serde(default)]
    pub start_time: u64,

    #[serde(default)]
    pub tracks: Vec<Vec<InputEvent>>,
}

/// One timed activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputEvent {
    pub category: CompileCategory,
    pub start: u64,
    pub duration: u32,
    #[serde(default)]
    pub name: String,
}

/// Read a timeline input file
///
/// **Public** - main entry point for generic inputs
///
/// # Errors
/// * `ParseError::IoError` - File cannot be read
/// * `ParseError::JsonError` - File does not match the input shape
/// * `ParseError::InvalidFormat` - A unit has an empty name
pub fn load_timeline_input(path: &Path) -> Result<TimelineInput, ParseError> {
    debug!("Reading timeline input: {}", path.display());
    let file = File::open(path)?;
    let input: TimelineInput = serde_json::from_reader(BufReader::new(file))?;

    if let Some(index) = input.units.iter().position(|unit| unit.unit_name.is_empty()) {
        return Err(ParseError::InvalidFormat(format!("unit {} has no name", index)));
    }
    Ok(input)
}

/// Build the unit trace of one input unit
///
/// **Public** - converts the input shape into builder calls
///
/// The unit forms a single time section spanning its latest event end.
pub fn unit_trace(unit: &InputUnit, strings: &mut StringTable, detail: ExportDetail) -> UnitTrace {
    let unit_hash = strings.store(&unit.unit_name);
    let mut builder = TrackBuilder::new(unit_hash);
    builder.begin_section(Timestamp::from_micros(0));

    let mut section_end = 0u64;
    for (thread, track) in unit.tracks.iter().enumerate() {
        let thread_id = thread as u32;
        for event in track {
            section_end = section_end.max(event.start.saturating_add(event.duration as u64));

            // The builder injects the unit root itself
            if event.category == CompileCategory::ExecuteCompiler || !detail.keeps(event.category) {
                continue;
            }

            let name_hash = if event.name.is_empty() && event.category.is_pass() {
                unit_hash
            } else {
                strings.store(&event.name)
            };
            builder.add_event(
                thread_id,
                event.category,
                Timestamp::from_micros(event.start),
                event.duration,
                name_hash,
            );

            let slot = match event.category {
                CompileCategory::FrontEnd => Some(PassSlot::FrontEnd),
                CompileCategory::BackEnd => Some(PassSlot::BackEnd),
                _ => None,
            };
            if let Some(slot) = slot {
                let absolute = Timestamp::from_micros(unit.start_time).saturating_add(event.start);
                builder.context_mut().record(slot, absolute, thread_id);
            }
        }
    }

    builder.close_section(section_end.min(u32::MAX as u64) as u32);
    builder.finish()
}
