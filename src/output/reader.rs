//! Binary score reader.
//!
//! Decodes the files written by the binarizer back into plain structures.
//! Every file must start with the current format version.

use super::binarizer::{globals_path, timeline_path};
use super::wire::{
    capacity_for, read_compile_data, read_ids, read_string, read_u32, read_u64, read_u8, try_read_u32,
};
use crate::aggregator::score::{CategoryTotal, CompileData};
use crate::parser::category::{CompileCategory, DISPLAY_COUNT, GATHER_FULL};
use crate::utils::config::SCORE_VERSION;
use crate::utils::error::FormatError;
use log::debug;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// One statistics record with its decoded name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedData {
    pub name: String,
    pub data: CompileData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitRecord {
    pub name: String,
    pub values: [u32; DISPLAY_COUNT],
}

impl UnitRecord {
    pub fn value(&self, category: CompileCategory) -> u32 {
        self.values.get(category.index()).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderRecord {
    pub name: String,
    pub children: Vec<u32>,
    pub unit_ids: Vec<u32>,
    pub include_ids: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncluderRecord {
    pub includes: Vec<u32>,
    pub units: Vec<u32>,
}

/// Decoded main score file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreFile {
    pub version: u32,
    pub timeline_pack: u32,
    pub full_duration: u64,
    pub num_threads: u32,
    pub totals: [CategoryTotal; DISPLAY_COUNT],
    pub units: Vec<UnitRecord>,
    pub includes: Vec<NamedData>,
    pub folders: Vec<FolderRecord>,
    pub includers: Vec<IncluderRecord>,
}

/// Decoded globals file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalsFile {
    /// Indexed by category, Include left empty
    pub categories: Vec<Vec<NamedData>>,
    pub tags: Vec<(String, String)>,
}

impl GlobalsFile {
    pub fn category(&self, category: CompileCategory) -> &[NamedData] {
        self.categories
            .get(category.index())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineEventRecord {
    pub start: u32,
    pub duration: u32,
    pub name_id: u32,
    pub category: CompileCategory,
}

/// One unit timeline: tracks of events
pub type TimelineRecord = Vec<Vec<TimelineEventRecord>>;

/// Decoded timeline file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineFile {
    pub timelines: Vec<TimelineRecord>,
}

fn check_version(r: &mut impl Read) -> Result<u32, FormatError> {
    let found = read_u32(r)?;
    if found != SCORE_VERSION {
        return Err(FormatError::VersionMismatch {
            expected: SCORE_VERSION,
            found,
        });
    }
    Ok(found)
}

fn read_records(r: &mut impl Read) -> Result<Vec<NamedData>, FormatError> {
    let count = read_u32(r)?;
    let mut records = Vec::with_capacity(capacity_for(count));
    for _ in 0..count {
        let (name, data) = read_compile_data(r)?;
        records.push(NamedData { name, data });
    }
    Ok(records)
}

/// Decode a main score file from a stream
pub fn decode_score(r: &mut impl Read) -> Result<ScoreFile, FormatError> {
    let version = check_version(r)?;
    let timeline_pack = read_u32(r)?;
    let full_duration = read_u64(r)?;
    let num_threads = read_u32(r)?;

    let mut totals = [CategoryTotal::default(); DISPLAY_COUNT];
    for total in totals.iter_mut() {
        total.accumulated = read_u64(r)?;
        total.count = read_u32(r)?;
    }

    let unit_count = read_u32(r)?;
    let mut units = Vec::with_capacity(capacity_for(unit_count));
    for _ in 0..unit_count {
        let name = read_string(r)?;
        let mut values = [0u32; DISPLAY_COUNT];
        for value in values.iter_mut() {
            *value = read_u32(r)?;
        }
        units.push(UnitRecord { name, values });
    }

    let includes = read_records(r)?;

    let folder_count = read_u32(r)?;
    let mut folders = Vec::with_capacity(capacity_for(folder_count));
    for _ in 0..folder_count {
        folders.push(FolderRecord {
            name: read_string(r)?,
            children: read_ids(r)?,
            unit_ids: read_ids(r)?,
            include_ids: read_ids(r)?,
        });
    }

    let includer_count = read_u32(r)?;
    let mut includers = Vec::with_capacity(capacity_for(includer_count));
    for _ in 0..includer_count {
        includers.push(IncluderRecord {
            includes: read_ids(r)?,
            units: read_ids(r)?,
        });
    }

    Ok(ScoreFile {
        version,
        timeline_pack,
        full_duration,
        num_threads,
        totals,
        units,
        includes,
        folders,
        includers,
    })
}

/// Decode a globals file from a stream
pub fn decode_globals(r: &mut impl Read) -> Result<GlobalsFile, FormatError> {
    check_version(r)?;

    let mut categories = vec![Vec::new(); GATHER_FULL];
    for records in categories
        .iter_mut()
        .skip(CompileCategory::Include.index() + 1)
    {
        *records = read_records(r)?;
    }

    let tag_count = read_u32(r)?;
    let mut tags = Vec::with_capacity(capacity_for(tag_count));
    for _ in 0..tag_count {
        tags.push((read_string(r)?, read_string(r)?));
    }

    Ok(GlobalsFile { categories, tags })
}

/// Decode a timeline file from a stream, reading timelines until it ends
pub fn decode_timelines(r: &mut impl Read) -> Result<TimelineFile, FormatError> {
    check_version(r)?;

    let mut timelines = Vec::new();
    while let Some(track_count) = try_read_u32(r)? {
        let mut tracks = Vec::with_capacity(capacity_for(track_count));
        for _ in 0..track_count {
            let event_count = read_u32(r)?;
            let mut events = Vec::with_capacity(capacity_for(event_count));
            for _ in 0..event_count {
                let start = read_u32(r)?;
                let duration = read_u32(r)?;
                let name_id = read_u32(r)?;
                let raw = read_u8(r)?;
                let category = CompileCategory::from_u8(raw).ok_or(FormatError::InvalidCategory(raw))?;
                events.push(TimelineEventRecord {
                    start,
                    duration,
                    name_id,
                    category,
                });
            }
            tracks.push(events);
        }
        timelines.push(tracks);
    }

    Ok(TimelineFile { timelines })
}

fn open(path: &Path) -> Result<BufReader<File>, FormatError> {
    debug!("Reading score data from: {}", path.display());
    Ok(BufReader::new(File::open(path)?))
}

/// Read a main score file
///
/// **Public** - used by the validate command and tests
///
/// # Errors
/// * `FormatError::IoError` - File missing or truncated
/// * `FormatError::VersionMismatch` - File written by another format version
pub fn read_score_file(path: impl AsRef<Path>) -> Result<ScoreFile, FormatError> {
    decode_score(&mut open(path.as_ref())?)
}

/// Read the globals file belonging to `base`
pub fn read_globals_file(base: impl AsRef<Path>) -> Result<GlobalsFile, FormatError> {
    decode_globals(&mut open(&globals_path(base.as_ref()))?)
}

/// Read timeline file number `number` belonging to `base`
pub fn read_timeline_file(base: impl AsRef<Path>, number: u32) -> Result<TimelineFile, FormatError> {
    decode_timelines(&mut open(&timeline_path(base.as_ref(), number))?)
}
