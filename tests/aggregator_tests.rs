use compile_score::aggregator::{build_folders, process_timeline, ScoreData};
use compile_score::parser::timeline_input::{unit_trace, InputEvent, InputUnit};
use compile_score::parser::{CompileCategory, ExportDetail};
use compile_score::utils::config::{ExportParams, INVALID_NAME_ID};
use pretty_assertions::assert_eq;

fn event(category: CompileCategory, start: u64, duration: u32, name: &str) -> InputEvent {
    InputEvent {
        category,
        start,
        duration,
        name: name.to_string(),
    }
}

fn fold_unit(score: &mut ScoreData, name: &str, events: Vec<InputEvent>, params: &ExportParams) {
    let unit = InputUnit {
        unit_name: name.to_string(),
        start_time: 0,
        tracks: vec![events],
    };
    let trace = unit_trace(&unit, &mut score.strings, params.detail);
    process_timeline(score, trace, params);
}

#[test]
fn test_single_unit_scenario() {
    let mut score = ScoreData::new();
    let params = ExportParams::default();
    fold_unit(
        &mut score,
        "a.cpp",
        vec![
            event(CompileCategory::Include, 0, 5, "h.h"),
            event(CompileCategory::FrontEnd, 0, 20, "a.cpp"),
            event(CompileCategory::BackEnd, 20, 10, "a.cpp"),
        ],
        &params,
    );

    let unit = &score.units[0];
    assert_eq!(unit.value(CompileCategory::FrontEnd), 20);
    assert_eq!(unit.value(CompileCategory::BackEnd), 10);
    assert_eq!(unit.value(CompileCategory::ExecuteCompiler), 30);

    let header = score.find_global(CompileCategory::Include, "h.h").unwrap();
    assert_eq!(header.accumulated, 5);
    assert_eq!(header.count, 1);
    assert_eq!(score.dictionary(CompileCategory::Include).unwrap().len(), 1);
}

#[test]
fn test_statistics_across_units() {
    let mut score = ScoreData::new();
    let params = ExportParams::default();

    for (name, duration) in [("a.cpp", 7u32), ("b.cpp", 3), ("c.cpp", 7)] {
        fold_unit(
            &mut score,
            name,
            vec![
                event(CompileCategory::FrontEnd, 0, 10, ""),
                event(CompileCategory::InstantiateFunction, 1, duration, "f<int>"),
            ],
            &params,
        );
    }

    let data = score
        .find_global(CompileCategory::InstantiateFunction, "f<int>")
        .unwrap();
    assert_eq!(data.count, 3);
    assert_eq!(data.accumulated, 17);
    assert_eq!(data.minimum, 3);
    assert_eq!(data.maximum, 7);
    // Equal maxima resolve to the latest unit
    assert_eq!(data.max_id, 2);
    assert_eq!(data.unit_count, 3);
    assert_eq!(data.unit_accumulated, 30);
}

#[test]
fn test_detail_limits_gathering() {
    let mut score = ScoreData::new();
    let params = ExportParams {
        detail: ExportDetail::Basic,
        ..Default::default()
    };
    fold_unit(
        &mut score,
        "a.cpp",
        vec![
            event(CompileCategory::FrontEnd, 0, 50, ""),
            event(CompileCategory::ParseClass, 0, 10, "Widget"),
            event(CompileCategory::InstantiateClass, 10, 10, "vector<int>"),
            event(CompileCategory::Include, 20, 5, "w.h"),
        ],
        &params,
    );

    assert!(score.find_global(CompileCategory::ParseClass, "Widget").is_some());
    assert!(score.find_global(CompileCategory::Include, "w.h").is_some());
    assert!(score
        .find_global(CompileCategory::InstantiateClass, "vector<int>")
        .is_none());
    assert_eq!(score.units[0].value(CompileCategory::InstantiateClass), 0);
}

#[test]
fn test_timeline_detail_never_finer_than_detail() {
    let mut score = ScoreData::new();
    let params = ExportParams {
        detail: ExportDetail::None,
        timeline_detail: ExportDetail::Full,
        ..Default::default()
    };
    let unit = InputUnit {
        unit_name: "a.cpp".to_string(),
        start_time: 0,
        tracks: vec![vec![
            event(CompileCategory::FrontEnd, 0, 50, ""),
            event(CompileCategory::ParseClass, 0, 10, "Widget"),
            event(CompileCategory::Include, 20, 5, "w.h"),
        ]],
    };
    let trace = unit_trace(&unit, &mut score.strings, params.detail);
    let timeline = process_timeline(&mut score, trace, &params);

    let categories: Vec<CompileCategory> = timeline.tracks[0]
        .events
        .iter()
        .map(|e| e.category)
        .collect();
    assert_eq!(
        categories,
        vec![
            CompileCategory::ExecuteCompiler,
            CompileCategory::FrontEnd,
            CompileCategory::Include,
        ]
    );
}

#[test]
fn test_timeline_name_ids() {
    let mut score = ScoreData::new();
    let params = ExportParams::default();
    fold_unit(&mut score, "a.cpp", vec![event(CompileCategory::FrontEnd, 0, 5, "")], &params);

    let unit = InputUnit {
        unit_name: "b.cpp".to_string(),
        start_time: 0,
        tracks: vec![vec![
            event(CompileCategory::FrontEnd, 0, 40, ""),
            event(CompileCategory::Include, 0, 10, "x.h"),
            event(CompileCategory::Include, 10, 10, "y.h"),
            event(CompileCategory::RunPass, 25, 5, "Inliner"),
        ]],
    };
    let trace = unit_trace(&unit, &mut score.strings, params.detail);
    let timeline = process_timeline(&mut score, trace, &params);

    assert_eq!(timeline.unit_id, 1);
    let ids: Vec<(CompileCategory, u32)> = timeline.tracks[0]
        .events
        .iter()
        .map(|e| (e.category, e.name_id))
        .collect();
    assert_eq!(
        ids,
        vec![
            (CompileCategory::ExecuteCompiler, 1),
            (CompileCategory::FrontEnd, 1),
            (CompileCategory::Include, 0),
            (CompileCategory::Include, 1),
            (CompileCategory::RunPass, INVALID_NAME_ID),
        ]
    );
}

#[test]
fn test_folder_tree() {
    let mut score = ScoreData::new();
    let params = ExportParams::default();
    fold_unit(
        &mut score,
        "/proj/src/a.cpp",
        vec![
            event(CompileCategory::FrontEnd, 0, 20, ""),
            event(CompileCategory::Include, 0, 5, "/proj/include/a.h"),
        ],
        &params,
    );
    fold_unit(
        &mut score,
        "/proj/src/net/b.cpp",
        vec![
            event(CompileCategory::FrontEnd, 0, 20, ""),
            event(CompileCategory::Include, 0, 5, "/proj/include/a.h"),
        ],
        &params,
    );
    build_folders(&mut score);

    let names: Vec<&str> = score.folders.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["/proj", "src", "net", "include"]);
    assert_eq!(score.folders[0].children, vec![1, 3]);
    assert_eq!(score.folders[1].unit_ids, vec![0]);
    assert_eq!(score.folders[2].unit_ids, vec![1]);
    assert_eq!(score.folders[3].include_ids, vec![0]);
}

#[test]
fn test_includers_graph() {
    let mut score = ScoreData::new();
    let params = ExportParams::default();
    fold_unit(
        &mut score,
        "a.cpp",
        vec![
            event(CompileCategory::FrontEnd, 0, 100, ""),
            event(CompileCategory::Include, 0, 50, "outer.h"),
            event(CompileCategory::Include, 10, 20, "inner.h"),
        ],
        &params,
    );
    fold_unit(
        &mut score,
        "b.cpp",
        vec![
            event(CompileCategory::FrontEnd, 0, 100, ""),
            event(CompileCategory::Include, 0, 30, "inner.h"),
        ],
        &params,
    );

    assert_eq!(score.includers.len(), 2);
    assert_eq!(score.includers[0].units.iter().copied().collect::<Vec<_>>(), vec![0]);
    assert_eq!(score.includers[1].includes.iter().copied().collect::<Vec<_>>(), vec![0]);
    assert_eq!(score.includers[1].units.iter().copied().collect::<Vec<_>>(), vec![1]);
}

#[test]
fn test_includers_disabled() {
    let mut score = ScoreData::new();
    let params = ExportParams {
        includers_enabled: false,
        ..Default::default()
    };
    fold_unit(
        &mut score,
        "a.cpp",
        vec![
            event(CompileCategory::FrontEnd, 0, 100, ""),
            event(CompileCategory::Include, 0, 50, "outer.h"),
        ],
        &params,
    );

    assert!(score.includers.is_empty());
    assert!(score.find_global(CompileCategory::Include, "outer.h").is_some());
}
