//! Folding of finished units into the run-wide score.
//!
//! Each unit is resolved, its gathered events are folded into the global
//! per-category dictionaries, its summary is appended to the unit list and
//! its timeline is trimmed to the requested timeline detail. All state is
//! append-only, so a run stopped after any unit still holds a valid score.

use super::includes::record_includers;
use super::score::{CompileUnit, ScoreData};
use super::self_time::resolve_unit;
use crate::parser::category::{CompileCategory, ExportDetail};
use crate::parser::schema::{CompileTimeline, CompileTrack, UnitTrace};
use crate::utils::config::ExportParams;
use log::debug;

/// Fold one finished unit into `score`
///
/// **Public** - main entry point of the aggregation engine
///
/// # Arguments
/// * `score` - Run-wide aggregate, mutated in place
/// * `trace` - Raw tracks of the finished unit
/// * `params` - Export settings for this run
///
/// # Returns
/// The unit's timeline, with dictionary ids resolved and trimmed to the
/// timeline detail, ready for the binarizer
pub fn process_timeline(
    score: &mut ScoreData,
    trace: UnitTrace,
    params: &ExportParams,
) -> CompileTimeline {
    let resolved = resolve_unit(trace);
    let unit_id = score.units.len() as u32;
    let unit_total = resolved.values[CompileCategory::ExecuteCompiler.index()];
    let gather_cutoff = params.detail.gather_cutoff();

    let mut tracks = resolved.tracks;
    let mut folded = 0usize;
    for track in &mut tracks {
        for event in &mut track.events {
            if event.category < gather_cutoff {
                let dictionary = &mut score.globals[event.category.index()];
                let id = dictionary.get_or_insert(event.name_hash);
                dictionary
                    .entry_mut(id)
                    .fold(event.duration, event.self_duration, unit_id, unit_total);
                event.name_id = id;
                folded += 1;
            } else if event.category.is_pass() {
                event.name_id = unit_id;
            }
        }
    }

    if params.includers_enabled {
        record_includers(&mut score.includers, unit_id, &tracks);
    }

    let unit = CompileUnit {
        unit_id,
        name_hash: resolved.name_hash,
        values: resolved.values,
        context: resolved.context,
    };
    score.session.record_unit(&unit);

    debug!(
        "Folded unit {} ({}): {} events gathered, {} us",
        unit_id,
        score.strings.resolve(unit.name_hash),
        folded,
        unit_total
    );
    score.units.push(unit);

    strip_timeline(&mut tracks, params.effective_timeline_detail());

    CompileTimeline { unit_id, tracks }
}

/// Remove events finer than the timeline detail
///
/// **Public** - exposed for tests
pub fn strip_timeline(tracks: &mut [CompileTrack], timeline_detail: ExportDetail) {
    for track in tracks {
        track
            .events
            .retain(|event| timeline_detail.keeps(event.category));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::track_builder::TrackBuilder;
    use crate::parser::schema::Timestamp;

    fn build_unit(
        score: &mut ScoreData,
        name: &str,
        events: &[(CompileCategory, u64, u32, &str)],
    ) -> UnitTrace {
        let mut builder = TrackBuilder::new(score.strings.store(name));
        let mut end = 0;
        for &(category, start, duration, event_name) in events {
            let hash = score.strings.store(event_name);
            builder.add_event(0, category, Timestamp::from_micros(start), duration, hash);
            end = end.max(start as u32 + duration);
        }
        builder.close_section(end);
        builder.finish()
    }

    #[test]
    fn test_end_to_end_single_unit() {
        let mut score = ScoreData::new();
        let trace = build_unit(
            &mut score,
            "a.cpp",
            &[
                (CompileCategory::Include, 0, 5, "h.h"),
                (CompileCategory::FrontEnd, 0, 20, "a.cpp"),
                (CompileCategory::BackEnd, 20, 10, "a.cpp"),
            ],
        );

        process_timeline(&mut score, trace, &ExportParams::default());

        let unit = &score.units[0];
        assert_eq!(unit.value(CompileCategory::FrontEnd), 20);
        assert_eq!(unit.value(CompileCategory::BackEnd), 10);
        assert_eq!(unit.value(CompileCategory::ExecuteCompiler), 30);

        let include = score.find_global(CompileCategory::Include, "h.h").unwrap();
        assert_eq!(include.accumulated, 5);
        assert_eq!(include.count, 1);
        assert_eq!(score.dictionary(CompileCategory::Include).unwrap().len(), 1);
    }

    #[test]
    fn test_equal_maxima_reference_latest_unit() {
        let mut score = ScoreData::new();
        for name in ["first.cpp", "second.cpp"] {
            let trace = build_unit(&mut score, name, &[(CompileCategory::ParseClass, 0, 8, "Widget")]);
            process_timeline(&mut score, trace, &ExportParams::default());
        }

        let entry = score.find_global(CompileCategory::ParseClass, "Widget").unwrap();
        assert_eq!(entry.count, 2);
        assert_eq!(entry.maximum, 8);
        assert_eq!(entry.max_id, 1);
    }

    #[test]
    fn test_name_ids_are_canonical() {
        let mut score = ScoreData::new();
        let first = build_unit(&mut score, "a.cpp", &[(CompileCategory::Include, 0, 5, "x.h")]);
        let second = build_unit(
            &mut score,
            "b.cpp",
            &[
                (CompileCategory::Include, 0, 2, "y.h"),
                (CompileCategory::Include, 3, 2, "x.h"),
            ],
        );

        process_timeline(&mut score, first, &ExportParams::default());
        let timeline = process_timeline(&mut score, second, &ExportParams::default());

        let ids: Vec<u32> = timeline.tracks[0]
            .events
            .iter()
            .filter(|e| e.category == CompileCategory::Include)
            .map(|e| e.name_id)
            .collect();
        assert_eq!(ids, vec![1, 0]);
        assert_eq!(timeline.unit_id, 1);
    }

    #[test]
    fn test_gather_limit_skips_finer_categories() {
        let mut score = ScoreData::new();
        let trace = build_unit(
            &mut score,
            "a.cpp",
            &[
                (CompileCategory::ParseClass, 0, 4, "A"),
                (CompileCategory::CodeGenFunction, 10, 4, "f"),
            ],
        );
        let params = ExportParams {
            detail: ExportDetail::Basic,
            ..Default::default()
        };

        process_timeline(&mut score, trace, &params);

        assert!(score.find_global(CompileCategory::ParseClass, "A").is_some());
        assert!(score.dictionary(CompileCategory::CodeGenFunction).unwrap().is_empty());
        // Bucket totals still see every display category
        assert_eq!(score.units[0].value(CompileCategory::CodeGenFunction), 4);
    }

    #[test]
    fn test_timeline_detail_strips_between_cutoffs() {
        let mut score = ScoreData::new();
        let trace = build_unit(
            &mut score,
            "a.cpp",
            &[
                (CompileCategory::FrontEnd, 0, 20, "a.cpp"),
                (CompileCategory::Include, 0, 5, "h.h"),
                (CompileCategory::InstantiateFunction, 6, 4, "f<int>"),
                (CompileCategory::RunPass, 20, 2, "pass"),
            ],
        );
        let params = ExportParams {
            detail: ExportDetail::Full,
            timeline_detail: ExportDetail::None,
            ..Default::default()
        };

        let timeline = process_timeline(&mut score, trace, &params);

        let categories: Vec<CompileCategory> =
            timeline.tracks[0].events.iter().map(|e| e.category).collect();
        assert_eq!(
            categories,
            vec![
                CompileCategory::ExecuteCompiler,
                CompileCategory::FrontEnd,
                CompileCategory::Include,
            ]
        );
        // Statistics keep the stripped event
        assert!(score
            .find_global(CompileCategory::InstantiateFunction, "f<int>")
            .is_some());
    }

    #[test]
    fn test_pass_events_reference_unit() {
        let mut score = ScoreData::new();
        let trace = build_unit(&mut score, "a.cpp", &[(CompileCategory::FrontEnd, 0, 20, "a.cpp")]);
        process_timeline(&mut score, trace.clone(), &ExportParams::default());
        let timeline = process_timeline(&mut score, trace, &ExportParams::default());

        assert!(timeline.tracks[0]
            .events
            .iter()
            .filter(|e| e.category.is_pass())
            .all(|e| e.name_id == 1));
    }

    #[test]
    fn test_empty_unit_is_still_recorded() {
        let mut score = ScoreData::new();
        let name = score.strings.store("empty.cpp");
        let trace = TrackBuilder::new(name).finish();

        let timeline = process_timeline(&mut score, trace, &ExportParams::default());

        assert_eq!(score.units.len(), 1);
        assert_eq!(score.units[0].value(CompileCategory::ExecuteCompiler), 0);
        assert_eq!(timeline.event_count(), 1);
    }
}
