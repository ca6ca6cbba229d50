//! Run-wide aggregate produced by the engine and read by the binarizer.

use super::strings::StringTable;
use crate::parser::category::{CompileCategory, DISPLAY_COUNT, GATHER_FULL};
use crate::parser::schema::{Timestamp, UnitContext};
use std::collections::{BTreeSet, HashMap};

/// Statistics for one name within one category, across the whole build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileData {
    pub name_hash: u64,
    pub accumulated: u64,
    pub self_accumulated: u64,
    pub minimum: u32,
    pub maximum: u32,
    pub self_maximum: u32,
    /// Unit in which `maximum` was last reached
    pub max_id: u32,
    pub self_max_id: u32,
    pub count: u32,
    pub unit_accumulated: u64,
    pub unit_count: u32,
    // Last unit folded into this entry, for distinct unit counting
    pub(crate) last_unit: Option<u32>,
}

impl CompileData {
    pub fn new(name_hash: u64) -> Self {
        Self {
            name_hash,
            accumulated: 0,
            self_accumulated: 0,
            minimum: u32::MAX,
            maximum: 0,
            self_maximum: 0,
            max_id: 0,
            self_max_id: 0,
            count: 0,
            unit_accumulated: 0,
            unit_count: 0,
            last_unit: None,
        }
    }

    /// Fold one occurrence observed in unit `unit_id`
    ///
    /// Maxima use `>=`, so among equally slow occurrences the most recently
    /// folded unit is the one referenced.
    pub fn fold(&mut self, duration: u32, self_duration: u32, unit_id: u32, unit_total: u32) {
        self.accumulated += duration as u64;
        self.self_accumulated += self_duration as u64;
        self.minimum = self.minimum.min(duration);
        if duration >= self.maximum {
            self.maximum = duration;
            self.max_id = unit_id;
        }
        if self_duration >= self.self_maximum {
            self.self_maximum = self_duration;
            self.self_max_id = unit_id;
        }
        self.count += 1;

        if self.last_unit != Some(unit_id) {
            self.last_unit = Some(unit_id);
            self.unit_count += 1;
            self.unit_accumulated += unit_total as u64;
        }
    }
}

/// Append-only entries of one category with hash lookup
#[derive(Debug, Clone, Default)]
pub struct CompileDictionary {
    entries: Vec<CompileData>,
    index: HashMap<u64, u32>,
}

impl CompileDictionary {
    /// Index of the entry for `name_hash`, creating it on first sight
    pub fn get_or_insert(&mut self, name_hash: u64) -> u32 {
        if let Some(&id) = self.index.get(&name_hash) {
            return id;
        }
        let id = self.entries.len() as u32;
        self.entries.push(CompileData::new(name_hash));
        self.index.insert(name_hash, id);
        id
    }

    pub fn find(&self, name_hash: u64) -> Option<&CompileData> {
        self.index
            .get(&name_hash)
            .map(|&id| &self.entries[id as usize])
    }

    pub fn id_of(&self, name_hash: u64) -> Option<u32> {
        self.index.get(&name_hash).copied()
    }

    pub fn entry_mut(&mut self, id: u32) -> &mut CompileData {
        &mut self.entries[id as usize]
    }

    pub fn entries(&self) -> &[CompileData] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Summary of one folded translation unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileUnit {
    pub unit_id: u32,
    pub name_hash: u64,
    pub values: [u32; DISPLAY_COUNT],
    pub context: UnitContext,
}

impl CompileUnit {
    pub fn value(&self, category: CompileCategory) -> u32 {
        self.values.get(category.index()).copied().unwrap_or(0)
    }
}

/// Direct includers of one include file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileIncluder {
    /// Include ids of files that include this one
    pub includes: BTreeSet<u32>,
    /// Unit ids whose source includes this file
    pub units: BTreeSet<u32>,
}

/// Directory node of the folder tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileFolder {
    pub name: String,
    pub children: Vec<u32>,
    pub unit_ids: Vec<u32>,
    pub include_ids: Vec<u32>,
    pub(crate) child_lookup: HashMap<u64, u32>,
}

impl CompileFolder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Category total across every unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryTotal {
    pub accumulated: u64,
    pub count: u32,
}

/// Whole-build figures
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreSession {
    pub full_duration: u64,
    pub num_threads: u32,
    pub totals: [CategoryTotal; DISPLAY_COUNT],
    pub(crate) first_start: Option<Timestamp>,
    pub(crate) last_end: Option<Timestamp>,
    pub(crate) threads: BTreeSet<u32>,
}

impl ScoreSession {
    /// Account for one unit's wall-clock span and bucket totals
    pub fn record_unit(&mut self, unit: &CompileUnit) {
        for (total, &value) in self.totals.iter_mut().zip(unit.values.iter()) {
            if value > 0 {
                total.accumulated += value as u64;
                total.count += 1;
            }
        }

        let Some(start) = unit.context.start() else {
            return;
        };
        let end = start.saturating_add(unit.value(CompileCategory::ExecuteCompiler) as u64);

        self.first_start = Some(self.first_start.map_or(start, |s| s.min(start)));
        self.last_end = Some(self.last_end.map_or(end, |e| e.max(end)));
        self.full_duration = self
            .last_end
            .zip(self.first_start)
            .map(|(end, start)| end.as_micros().saturating_sub(start.as_micros()))
            .unwrap_or(0);

        for (slot, start_time) in unit.context.start_time.iter().enumerate() {
            if start_time.is_some() {
                self.threads.insert(unit.context.thread_id[slot]);
            }
        }
        self.num_threads = self.threads.len() as u32;
    }
}

/// Root aggregate of one run
#[derive(Debug, Clone)]
pub struct ScoreData {
    pub session: ScoreSession,
    pub units: Vec<CompileUnit>,
    pub globals: Vec<CompileDictionary>,
    pub includers: Vec<CompileIncluder>,
    pub strings: StringTable,
    pub folders: Vec<CompileFolder>,
}

impl Default for ScoreData {
    fn default() -> Self {
        Self {
            session: ScoreSession::default(),
            units: Vec::new(),
            globals: vec![CompileDictionary::default(); GATHER_FULL],
            includers: Vec::new(),
            strings: StringTable::new(),
            folders: Vec::new(),
        }
    }
}

impl ScoreData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Global dictionary of a gathered category
    pub fn dictionary(&self, category: CompileCategory) -> Option<&CompileDictionary> {
        self.globals.get(category.index())
    }

    /// Entry for `name` in `category`, looked up by content hash
    pub fn find_global(&self, category: CompileCategory, name: &str) -> Option<&CompileData> {
        let hash = super::strings::crc64(name.as_bytes());
        self.dictionary(category)?.find(hash)
    }

    /// True when any category past Include has statistics
    pub fn has_gathered_globals(&self) -> bool {
        self.globals
            .iter()
            .skip(CompileCategory::Include.index() + 1)
            .any(|dictionary| !dictionary.is_empty())
    }
}
