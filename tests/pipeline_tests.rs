use compile_score::commands::{execute_generate, validate_args, GenerateArgs, InputFormat};
use compile_score::output::reader::{read_globals_file, read_score_file, read_timeline_file};
use compile_score::output::{read_summary, timeline_path};
use compile_score::parser::CompileCategory;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;
use std::path::Path;

fn write_clang_trace(path: &Path, frontend: u32, backend: u32, instantiation: &str) {
    let total = frontend + backend;
    let trace = json!({
        "beginningOfTime": 5_000_000,
        "traceEvents": [
            { "ph": "X", "name": "ExecuteCompiler", "ts": 0, "dur": total, "tid": 1 },
            { "ph": "X", "name": "Frontend", "ts": 0, "dur": frontend, "tid": 1 },
            { "ph": "X", "name": "Source", "ts": 2, "dur": 10, "tid": 1, "args": { "detail": "/usr/include/vector" } },
            { "ph": "X", "name": "InstantiateFunction", "ts": 20, "dur": 5, "tid": 1, "args": { "detail": instantiation } },
            { "ph": "X", "name": "Backend", "ts": frontend, "dur": backend, "tid": 1 },
            { "ph": "X", "name": "Total Frontend", "ts": 0, "dur": frontend, "tid": 2 }
        ]
    });
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, trace.to_string()).unwrap();
}

#[test]
fn test_clang_traces_to_score() {
    let dir = tempfile::tempdir().unwrap();
    let traces = dir.path().join("traces");
    write_clang_trace(&traces.join("a.cpp.json"), 100, 50, "std::max<int>");
    write_clang_trace(&traces.join("net/b.cpp.json"), 200, 30, "std::max<int>");
    fs::write(traces.join("broken.json"), "{ not json").unwrap();

    let output = dir.path().join("out/compileData.scor");
    let summary_path = dir.path().join("out/summary.json");
    let args = GenerateArgs {
        input: traces.clone(),
        format: InputFormat::Clang,
        output: output.clone(),
        summary_json: Some(summary_path.clone()),
        ..Default::default()
    };

    validate_args(&args).unwrap();
    let score = execute_generate(&args).unwrap();
    assert_eq!(score.units.len(), 2);

    let file = read_score_file(&output).unwrap();
    let names: Vec<&str> = file.units.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, vec!["a.cpp", "b.cpp"]);
    assert_eq!(file.units[0].value(CompileCategory::ExecuteCompiler), 150);
    assert_eq!(file.units[1].value(CompileCategory::FrontEnd), 200);
    assert_eq!(file.units[1].value(CompileCategory::Include), 10);
    assert_eq!(file.full_duration, 230);
    assert_eq!(file.num_threads, 1);

    assert_eq!(file.includes.len(), 1);
    assert_eq!(file.includes[0].name, "/usr/include/vector");
    assert_eq!(file.includes[0].data.count, 2);
    assert_eq!(file.includers[0].units, vec![0, 1]);

    let globals = read_globals_file(&output).unwrap();
    let functions = globals.category(CompileCategory::InstantiateFunction);
    assert_eq!(functions.len(), 1);
    assert_eq!(functions[0].name, "std::max<int>");
    assert_eq!(functions[0].data.accumulated, 10);

    let timelines = read_timeline_file(&output, 0).unwrap();
    assert_eq!(timelines.timelines.len(), 2);
    assert!(!timeline_path(&output, 1).exists());

    let summary = read_summary(&summary_path).unwrap();
    assert_eq!(summary.unit_count, 2);
    assert_eq!(summary.slowest_units[0].duration, 230);
}

#[test]
fn test_timeline_input_to_score() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("build.json");
    let timeline = json!({
        "units": [
            {
                "unitName": "src/main.cpp",
                "tracks": [[
                    { "category": "FrontEnd", "start": 0, "duration": 40 },
                    { "category": "ParseClass", "start": 5, "duration": 10, "name": "Config" },
                    { "category": "BackEnd", "start": 40, "duration": 20 }
                ]]
            },
            {
                "unitName": "src/util.cpp",
                "tracks": [[
                    { "category": "FrontEnd", "start": 0, "duration": 15 },
                    { "category": "ParseClass", "start": 0, "duration": 12, "name": "Config" }
                ]]
            }
        ]
    });
    fs::write(&input, timeline.to_string()).unwrap();

    let output = dir.path().join("score.scor");
    let args = GenerateArgs {
        input,
        format: InputFormat::Timeline,
        output: output.clone(),
        ..Default::default()
    };
    execute_generate(&args).unwrap();

    let file = read_score_file(&output).unwrap();
    assert_eq!(file.units.len(), 2);
    assert_eq!(file.units[0].value(CompileCategory::ParseClass), 10);

    let globals = read_globals_file(&output).unwrap();
    let classes = globals.category(CompileCategory::ParseClass);
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].data.count, 2);
    assert_eq!(classes[0].data.maximum, 12);
    assert_eq!(classes[0].data.max_id, 1);
}

#[test]
fn test_all_inputs_broken_still_writes_empty_score() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("bad.json"), "not json").unwrap();

    let output = dir.path().join("score.scor");
    let args = GenerateArgs {
        input: dir.path().to_path_buf(),
        output: output.clone(),
        ..Default::default()
    };
    let score = execute_generate(&args).unwrap();

    assert!(score.units.is_empty());
    let file = read_score_file(&output).unwrap();
    assert!(file.units.is_empty());
    assert_eq!(file.folders.len(), 1);
}
