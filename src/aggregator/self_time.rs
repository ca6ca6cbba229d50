//! Self-time resolution for one finished unit.
//!
//! Turns the raw tracks of a unit into a zero-based timeline, computes the
//! exclusive duration of every event and the per-category bucket totals of
//! the unit.
//!
//! Bucket totals use one overlap threshold per category: an event adds its
//! duration only when it starts at or after the end of the last counted
//! event of the same category. Nested or overlapping same-category work,
//! including work on other threads, is therefore counted once as wall-clock
//! time rather than summed per thread.

use crate::parser::category::DISPLAY_COUNT;
use crate::parser::schema::{CompileEvent, CompileTrack, RawTrack, UnitContext, UnitTrace};
use std::cmp::Reverse;

/// A unit after self-time resolution, before folding into global statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUnit {
    pub name_hash: u64,
    pub context: UnitContext,
    pub values: [u32; DISPLAY_COUNT],
    pub tracks: Vec<CompileTrack>,
}

/// Resolve a unit's raw tracks
///
/// **Public** - called by the engine once a unit is complete
///
/// # Algorithm
/// 1. Shift every event by the earliest start found on any track
/// 2. Compute self durations per track from direct nesting
/// 3. Accumulate bucket totals with per-category overlap thresholds
pub fn resolve_unit(trace: UnitTrace) -> ResolvedUnit {
    let origin = trace
        .tracks
        .iter()
        .flat_map(|track| track.events.iter().map(|e| e.start))
        .min()
        .unwrap_or(0);

    let mut tracks: Vec<CompileTrack> = trace
        .tracks
        .into_iter()
        .map(|track| normalize_track(track, origin))
        .collect();

    for track in &mut tracks {
        compute_self_durations(&mut track.events);
    }

    let values = bucket_totals(&tracks);

    ResolvedUnit {
        name_hash: trace.name_hash,
        context: trace.context,
        values,
        tracks,
    }
}

fn normalize_track(track: RawTrack, origin: i64) -> CompileTrack {
    let events = track
        .events
        .into_iter()
        .map(|raw| {
            let start = raw.start.saturating_sub(origin).clamp(0, u32::MAX as i64) as u32;
            CompileEvent::new(raw.category, start, raw.duration, raw.name_hash)
        })
        .collect();

    CompileTrack {
        thread_id: track.thread_id,
        events,
    }
}

/// Subtract directly nested children from each event's duration
///
/// **Public** - `events` must be ordered by start, longest first on ties
pub fn compute_self_durations(events: &mut [CompileEvent]) {
    for event in events.iter_mut() {
        event.self_duration = event.duration;
    }

    let mut open: Vec<usize> = Vec::new();
    for index in 0..events.len() {
        let start = events[index].start;
        while let Some(&top) = open.last() {
            if events[top].end() <= start {
                open.pop();
            } else {
                break;
            }
        }

        if let Some(&parent) = open.last() {
            // Partially overlapping children only remove the shared span
            let nested_end = events[index].end().min(events[parent].end());
            let nested = nested_end.saturating_sub(start);
            events[parent].self_duration = events[parent].self_duration.saturating_sub(nested);
        }

        open.push(index);
    }
}

/// Per-category wall-clock totals for one unit
///
/// **Public** - exposed for the engine and tests
pub fn bucket_totals(tracks: &[CompileTrack]) -> [u32; DISPLAY_COUNT] {
    let mut ordered: Vec<&CompileEvent> = tracks
        .iter()
        .flat_map(|track| track.events.iter())
        .filter(|event| event.category.is_display())
        .collect();
    ordered.sort_by_key(|event| (event.start, Reverse(event.duration)));

    let mut values = [0u32; DISPLAY_COUNT];
    let mut thresholds = [0u32; DISPLAY_COUNT];
    for event in ordered {
        let slot = event.category.index();
        if event.start >= thresholds[slot] {
            values[slot] = values[slot].saturating_add(event.duration);
            thresholds[slot] = event.end();
        }
    }
    values
}
