//! Timeline data shared by trace producers, the engine and the binarizer.
//!
//! Producers build `UnitTrace` values (raw, possibly overlapping events per
//! thread). The engine resolves them into `CompileTimeline` values whose
//! events are zero-based and carry self durations and dictionary ids.

use super::category::CompileCategory;
use crate::utils::config::INVALID_NAME_ID;

/// Point in time, in microseconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    pub const fn as_micros(self) -> u64 {
        self.0
    }

    /// Signed distance from `origin` to `self`, saturating at the i64 range
    pub fn offset_from(self, origin: Timestamp) -> i64 {
        (self.0 as i128 - origin.0 as i128).clamp(i64::MIN as i128, i64::MAX as i128) as i64
    }

    pub fn saturating_add(self, micros: u64) -> Self {
        Self(self.0.saturating_add(micros))
    }
}

/// Which coarse pass a context slot describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassSlot {
    FrontEnd = 0,
    BackEnd = 1,
}

/// Absolute timing of the front end and back end passes of one unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitContext {
    pub start_time: [Option<Timestamp>; 2],
    pub thread_id: [u32; 2],
}

impl UnitContext {
    pub fn record(&mut self, slot: PassSlot, start: Timestamp, thread_id: u32) {
        self.start_time[slot as usize] = Some(start);
        self.thread_id[slot as usize] = thread_id;
    }

    /// Earliest recorded pass start
    pub fn start(&self) -> Option<Timestamp> {
        self.start_time.iter().flatten().copied().min()
    }
}

/// Event as delivered by a producer, relative to the unit's section origin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    pub category: CompileCategory,
    pub start: i64,
    pub duration: u32,
    pub name_hash: u64,
}

impl RawEvent {
    pub fn end(&self) -> i64 {
        self.start.saturating_add(self.duration as i64)
    }
}

/// Events of one thread, ordered by start (longest first on ties)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTrack {
    pub thread_id: u32,
    pub events: Vec<RawEvent>,
}

/// Everything captured for one unit before resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitTrace {
    pub name_hash: u64,
    pub context: UnitContext,
    pub tracks: Vec<RawTrack>,
}

/// One resolved timeline event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileEvent {
    pub category: CompileCategory,
    pub start: u32,
    pub duration: u32,
    pub name_hash: u64,
    pub self_duration: u32,
    pub name_id: u32,
}

impl CompileEvent {
    pub fn new(category: CompileCategory, start: u32, duration: u32, name_hash: u64) -> Self {
        Self {
            category,
            start,
            duration,
            name_hash,
            self_duration: duration,
            name_id: INVALID_NAME_ID,
        }
    }

    pub fn end(&self) -> u32 {
        self.start.saturating_add(self.duration)
    }
}

/// Resolved events of one thread
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileTrack {
    pub thread_id: u32,
    pub events: Vec<CompileEvent>,
}

/// Zero-based timeline of one unit, ready for binarization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileTimeline {
    pub unit_id: u32,
    pub tracks: Vec<CompileTrack>,
}

impl CompileTimeline {
    pub fn event_count(&self) -> usize {
        self.tracks.iter().map(|track| track.events.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_offset() {
        let origin = Timestamp::from_micros(100);
        assert_eq!(Timestamp::from_micros(150).offset_from(origin), 50);
        assert_eq!(Timestamp::from_micros(90).offset_from(origin), -10);
        assert_eq!(Timestamp::from_micros(u64::MAX).offset_from(Timestamp::default()), i64::MAX);
    }

    #[test]
    fn test_context_start_is_earliest_pass() {
        let mut context = UnitContext::default();
        assert_eq!(context.start(), None);
        context.record(PassSlot::BackEnd, Timestamp::from_micros(40), 2);
        context.record(PassSlot::FrontEnd, Timestamp::from_micros(10), 1);
        assert_eq!(context.start(), Some(Timestamp::from_micros(10)));
        assert_eq!(context.thread_id, [1, 2]);
    }
}
