//! Per-unit, per-thread event track construction.
//!
//! Producers feed events in arrival order. Each event is placed into its
//! thread's track in start order, searching only the events added since the
//! last section boundary so insertion stays cheap on large units.
//!
//! Time is split into sections (one per coarse compiler pass). Event starts
//! are measured from the open section's origin and shifted by the summed
//! duration of every section closed before it, so passes recorded against
//! different clocks land one after the other on a single unit timeline.

use crate::parser::category::CompileCategory;
use crate::parser::schema::{RawEvent, RawTrack, Timestamp, UnitContext, UnitTrace};
use log::debug;

#[derive(Debug)]
struct TrackState {
    thread_id: u32,
    events: Vec<RawEvent>,
    // First index still open to ordered insertion
    window_start: usize,
}

/// Builder collecting the tracks of one unit while it is being compiled
#[derive(Debug)]
pub struct TrackBuilder {
    name_hash: u64,
    context: UnitContext,
    tracks: Vec<TrackState>,
    section_origin: Timestamp,
    section_offset: i64,
    has_root: bool,
}

impl TrackBuilder {
    /// Create a builder for the unit named by `name_hash`
    pub fn new(name_hash: u64) -> Self {
        Self {
            name_hash,
            context: UnitContext::default(),
            tracks: Vec::new(),
            section_origin: Timestamp::default(),
            section_offset: 0,
            has_root: false,
        }
    }

    pub fn name_hash(&self) -> u64 {
        self.name_hash
    }

    pub fn context_mut(&mut self) -> &mut UnitContext {
        &mut self.context
    }

    /// Open a time section whose events are timed from `origin`
    pub fn begin_section(&mut self, origin: Timestamp) {
        self.section_origin = origin;
    }

    /// Close the open section, advancing the unit clock by `duration`
    ///
    /// Later events can no longer be inserted before anything recorded so far.
    pub fn close_section(&mut self, duration: u32) {
        self.section_offset = self.section_offset.saturating_add(duration as i64);
        for track in &mut self.tracks {
            track.window_start = track.events.len();
        }
    }

    /// Add one event recorded on `thread_id`
    ///
    /// **Public** - main entry point for producers
    ///
    /// # Arguments
    /// * `thread_id` - Thread that recorded the event
    /// * `category` - Activity kind
    /// * `start` - Absolute start, on the open section's clock
    /// * `duration` - Duration in microseconds
    /// * `name_hash` - Interned name of the activity
    pub fn add_event(
        &mut self,
        thread_id: u32,
        category: CompileCategory,
        start: Timestamp,
        duration: u32,
        name_hash: u64,
    ) {
        if !self.has_root {
            self.add_root(thread_id);
        }

        let event = RawEvent {
            category,
            start: start
                .offset_from(self.section_origin)
                .saturating_add(self.section_offset),
            duration,
            name_hash,
        };

        let track = self.track_mut(thread_id);
        let window = &track.events[track.window_start..];
        let position = track.window_start
            + window.partition_point(|existing| {
                existing.start < event.start
                    || (existing.start == event.start && existing.duration >= event.duration)
            });
        track.events.insert(position, event);
    }

    /// Finish the unit, back-filling the root with the total section time
    pub fn finish(mut self) -> UnitTrace {
        if !self.has_root {
            self.add_root(0);
        }

        let total = self.section_offset.clamp(0, u32::MAX as i64) as u32;
        if let Some(root) = self
            .tracks
            .first_mut()
            .and_then(|track| track.events.first_mut())
        {
            root.duration = total;
        }

        debug!(
            "Finished unit {:016x}: {} tracks, {} us",
            self.name_hash,
            self.tracks.len(),
            total
        );

        UnitTrace {
            name_hash: self.name_hash,
            context: self.context,
            tracks: self
                .tracks
                .into_iter()
                .map(|track| RawTrack {
                    thread_id: track.thread_id,
                    events: track.events,
                })
                .collect(),
        }
    }

    fn add_root(&mut self, thread_id: u32) {
        self.has_root = true;
        let root = RawEvent {
            category: CompileCategory::ExecuteCompiler,
            start: 0,
            duration: 0,
            name_hash: self.name_hash,
        };
        let track = self.track_mut(thread_id);
        track.events.insert(0, root);
        track.window_start = track.window_start.max(1);
    }

    fn track_mut(&mut self, thread_id: u32) -> &mut TrackState {
        let index = match self.tracks.iter().position(|t| t.thread_id == thread_id) {
            Some(index) => index,
            None => {
                self.tracks.push(TrackState {
                    thread_id,
                    events: Vec::new(),
                    window_start: 0,
                });
                self.tracks.len() - 1
            }
        };
        &mut self.tracks[index]
    }
}
