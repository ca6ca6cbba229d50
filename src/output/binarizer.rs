//! Binary score writer.
//!
//! ## File layout
//! ```text
//! <base>          main file
//!   version u32, timeline pack u32
//!   session: full duration u64, thread count u32, DISPLAY_COUNT x (accumulated u64, count u32)
//!   units: count u32, then per unit base name + DISPLAY_COUNT x u32
//!   include statistics: count u32, then records (full paths)
//!   folders: count u32, then per folder name, children, unit ids, include ids
//!   includers: count u32, then per include file parent include ids, unit ids
//!
//! <base>.gbl      globals file, only when a category past Include has entries
//!   version u32
//!   per category Include+1 .. GATHER_FULL: count u32, then records
//!   (base names, full paths for OptimizeModule)
//!   tags: count u32, then (key, value) strings
//!
//! <base>.t0000    timeline files, `pack` timelines each
//!   version u32
//!   per timeline: track count u32, per track event count u32,
//!   per event start u32, duration u32, name id u32, category u8
//! ```
//!
//! Id lists are a u32 count followed by u32 ids. A statistics record is a
//! name followed by accumulated u64, self accumulated u64, minimum u32,
//! maximum u32, self maximum u32, count u32, unit count u32,
//! unit accumulated u64, max unit u32, self max unit u32.

use super::prepare_output_path;
use super::wire::{write_compile_data, write_ids, write_string, write_u32, write_u64, write_u8};
use crate::aggregator::score::{CompileIncluder, ScoreData};
use crate::aggregator::strings::base_name;
use crate::parser::category::{CompileCategory, GATHER_FULL};
use crate::parser::schema::CompileTimeline;
use crate::utils::config::{
    ExportParams, GLOBALS_EXTENSION, SCORE_VERSION, TIMELINE_EXTENSION_PREFIX, TIMELINE_FILE_DIGITS,
};
use crate::utils::error::OutputError;
use log::{debug, error, info};
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Path of a companion file: the base path with `.extension` appended
pub fn companion_path(base: &Path, extension: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// Path of the globals file for `base`
pub fn globals_path(base: &Path) -> PathBuf {
    companion_path(base, GLOBALS_EXTENSION)
}

/// Path of timeline file number `number` for `base`
pub fn timeline_path(base: &Path, number: u32) -> PathBuf {
    let extension = format!(
        "{}{:0width$}",
        TIMELINE_EXTENSION_PREFIX,
        number,
        width = TIMELINE_FILE_DIGITS
    );
    companion_path(base, &extension)
}

/// Writer of one score file set
///
/// **Public** - owned by the generate command for the whole run
#[derive(Debug)]
pub struct ScoreBinarizer {
    base_path: PathBuf,
    timeline_pack: u32,
    timeline_enabled: bool,
    timelines_written: u32,
    current_timeline: Option<BufWriter<File>>,
}

impl ScoreBinarizer {
    pub fn new(base_path: impl Into<PathBuf>, params: &ExportParams) -> Self {
        Self {
            base_path: base_path.into(),
            timeline_pack: params.timeline_pack.max(1),
            timeline_enabled: params.timeline_enabled,
            timelines_written: 0,
            current_timeline: None,
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn timelines_written(&self) -> u32 {
        self.timelines_written
    }

    pub fn timeline_enabled(&self) -> bool {
        self.timeline_enabled
    }

    /// Append one unit timeline to the current timeline file
    ///
    /// **Public** - called once per folded unit, in unit id order
    ///
    /// A new numbered file is started every `timeline_pack` timelines.
    ///
    /// # Errors
    /// * `OutputError::TimelineDisabled` - Timelines are off or failed earlier
    /// * `OutputError::TimelineLimit` - File number no longer fits the digits;
    ///   all further timeline writes are refused
    /// * `OutputError::WriteFailed` - I/O error; further writes are refused
    pub fn binarize_timeline(&mut self, timeline: &CompileTimeline) -> Result<(), OutputError> {
        if !self.timeline_enabled {
            return Err(OutputError::TimelineDisabled);
        }

        let result = self.write_timeline(timeline);
        if result.is_err() {
            self.timeline_enabled = false;
            self.current_timeline = None;
        }
        result
    }

    fn write_timeline(&mut self, timeline: &CompileTimeline) -> Result<(), OutputError> {
        if self.timelines_written % self.timeline_pack == 0 {
            let number = self.timelines_written / self.timeline_pack;
            self.open_timeline_file(number)?;
        }

        let Some(writer) = self.current_timeline.as_mut() else {
            return Err(OutputError::TimelineDisabled);
        };

        write_u32(writer, timeline.tracks.len() as u32)?;
        for track in &timeline.tracks {
            write_u32(writer, track.events.len() as u32)?;
            for event in &track.events {
                write_u32(writer, event.start)?;
                write_u32(writer, event.duration)?;
                write_u32(writer, event.name_id)?;
                write_u8(writer, event.category as u8)?;
            }
        }

        self.timelines_written += 1;
        Ok(())
    }

    fn open_timeline_file(&mut self, number: u32) -> Result<(), OutputError> {
        if let Some(mut previous) = self.current_timeline.take() {
            previous.flush()?;
        }

        if number >= 10u32.pow(TIMELINE_FILE_DIGITS as u32) {
            return Err(OutputError::TimelineLimit(number, TIMELINE_FILE_DIGITS));
        }

        let path = timeline_path(&self.base_path, number);
        debug!("Opening timeline file: {}", path.display());
        let mut writer = create_output(&path)?;
        write_u32(&mut writer, SCORE_VERSION)?;
        self.current_timeline = Some(writer);
        Ok(())
    }

    /// Flush and close the current timeline file
    pub fn finish_timelines(&mut self) -> Result<(), OutputError> {
        if let Some(mut writer) = self.current_timeline.take() {
            writer.flush()?;
        }
        Ok(())
    }

    /// Write the main score file
    ///
    /// **Public** - end-of-run output
    pub fn write_main(&self, score: &ScoreData, params: &ExportParams) -> Result<(), OutputError> {
        info!("Writing score to: {}", self.base_path.display());
        let mut w = create_output(&self.base_path)?;

        write_u32(&mut w, SCORE_VERSION)?;
        write_u32(&mut w, self.timeline_pack)?;

        write_u64(&mut w, score.session.full_duration)?;
        write_u32(&mut w, score.session.num_threads)?;
        for total in &score.session.totals {
            write_u64(&mut w, total.accumulated)?;
            write_u32(&mut w, total.count)?;
        }

        write_u32(&mut w, score.units.len() as u32)?;
        for unit in &score.units {
            write_string(&mut w, base_name(score.strings.resolve(unit.name_hash)))?;
            for &value in &unit.values {
                write_u32(&mut w, value)?;
            }
        }

        let includes = score
            .dictionary(CompileCategory::Include)
            .map(|dictionary| dictionary.entries())
            .unwrap_or_default();
        write_u32(&mut w, includes.len() as u32)?;
        for data in includes {
            write_compile_data(&mut w, score.strings.resolve(data.name_hash), data)?;
        }

        write_u32(&mut w, score.folders.len() as u32)?;
        for folder in &score.folders {
            write_string(&mut w, &folder.name)?;
            write_ids(&mut w, folder.children.iter())?;
            write_ids(&mut w, folder.unit_ids.iter())?;
            write_ids(&mut w, folder.include_ids.iter())?;
        }

        let includers: &[CompileIncluder] = if params.includers_enabled {
            score.includers.as_slice()
        } else {
            &[]
        };
        write_u32(&mut w, includers.len() as u32)?;
        for includer in includers {
            write_ids(&mut w, includer.includes.iter())?;
            write_ids(&mut w, includer.units.iter())?;
        }

        w.flush()?;
        Ok(())
    }

    /// Write the globals file
    ///
    /// **Public** - end-of-run output
    ///
    /// # Returns
    /// `false` when no category past Include has entries and nothing was written
    pub fn write_globals(&self, score: &ScoreData, params: &ExportParams) -> Result<bool, OutputError> {
        if !score.has_gathered_globals() {
            debug!("No gathered statistics past includes, skipping globals file");
            return Ok(false);
        }

        let path = globals_path(&self.base_path);
        info!("Writing globals to: {}", path.display());
        let mut w = create_output(&path)?;

        write_u32(&mut w, SCORE_VERSION)?;
        for index in CompileCategory::Include.index() + 1..GATHER_FULL {
            let category = CompileCategory::from_u8(index as u8).unwrap_or(CompileCategory::Invalid);
            let entries = score.globals[index].entries();
            write_u32(&mut w, entries.len() as u32)?;
            for data in entries {
                let name = global_name(category, score.strings.resolve(data.name_hash));
                write_compile_data(&mut w, name, data)?;
            }
        }

        let tags = [
            ("generator", format!("compile-score {}", env!("CARGO_PKG_VERSION"))),
            ("detail", params.detail.to_string()),
            ("timeline_detail", params.effective_timeline_detail().to_string()),
        ];
        write_u32(&mut w, tags.len() as u32)?;
        for (key, value) in &tags {
            write_string(&mut w, key)?;
            write_string(&mut w, value)?;
        }

        w.flush()?;
        Ok(true)
    }

    /// Write every end-of-run file, logging each failure
    ///
    /// **Public** - a failing file never prevents the others from being written
    ///
    /// # Returns
    /// Number of files that failed
    pub fn finalize(&mut self, score: &ScoreData, params: &ExportParams) -> usize {
        let mut failures = 0;

        if let Err(e) = self.finish_timelines() {
            error!("Failed to finish timeline file: {}", e);
            failures += 1;
        }
        if let Err(e) = self.write_main(score, params) {
            error!("Failed to write {}: {}", self.base_path.display(), e);
            failures += 1;
        }
        if let Err(e) = self.write_globals(score, params) {
            error!("Failed to write {}: {}", globals_path(&self.base_path).display(), e);
            failures += 1;
        }

        failures
    }
}

/// Name written for a globals record
///
/// OptimizeModule entries are module paths and stay whole. Everything else
/// keeps the text after the last separator, or the whole text when nothing
/// follows it (`operator/`).
fn global_name(category: CompileCategory, text: &str) -> &str {
    if category == CompileCategory::OptimizeModule {
        return text;
    }
    match base_name(text) {
        "" => text,
        name => name,
    }
}

/// Create an output file, creating parent directories when needed
///
/// **Private** - shared by every file role
fn create_output(path: &Path) -> Result<BufWriter<File>, OutputError> {
    prepare_output_path(path)?;

    let file = File::create(path).map_err(OutputError::WriteFailed)?;
    Ok(BufWriter::new(file))
}
