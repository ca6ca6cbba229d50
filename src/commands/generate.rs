//! Generate command implementation.
//!
//! The generate command:
//! 1. Collects trace files from the input path
//! 2. Parses each file into unit traces
//! 3. Folds every unit into the score and writes its timeline
//! 4. Builds the folder tree
//! 5. Writes the main and globals files
//! 6. Prints or writes the summary when requested

use super::models::{GenerateArgs, InputFormat};
use crate::aggregator::{build_folders, process_timeline, ScoreData};
use crate::output::{build_summary, generate_text_summary, write_summary, ScoreBinarizer};
use crate::parser::clang_trace::load_clang_trace;
use crate::parser::schema::UnitTrace;
use crate::parser::timeline_input::{load_timeline_input, unit_trace};
use crate::utils::config::TRACE_FILE_EXTENSION;
use crate::utils::error::ParseError;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

/// Execute the generate command
///
/// **Public** - main entry point called from main.rs
///
/// Input files that fail to parse are skipped with a warning. A failing
/// timeline write disables further timelines but the main and globals
/// files are still written.
///
/// # Returns
/// The aggregated score, for callers that want to inspect it
///
/// # Errors
/// * No trace files found under the input path
/// * Main or globals file could not be written
/// * JSON summary could not be written
pub fn execute_generate(args: &GenerateArgs) -> Result<ScoreData> {
    let start_time = Instant::now();

    info!("Generating score from: {}", args.input.display());
    info!(
        "Detail: {}, timeline detail: {}",
        args.params.detail,
        args.params.effective_timeline_detail()
    );

    let inputs = collect_inputs(&args.input)
        .with_context(|| format!("Failed to scan {}", args.input.display()))?;
    if inputs.is_empty() {
        anyhow::bail!("No trace files found in {}", args.input.display());
    }
    info!("Found {} trace files", inputs.len());

    let mut score = ScoreData::new();
    let mut binarizer = ScoreBinarizer::new(&args.output, &args.params);
    let mut skipped = 0usize;

    for path in &inputs {
        let traces = match load_unit_traces(path, args.format, &mut score, args) {
            Ok(traces) => traces,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                skipped += 1;
                continue;
            }
        };

        for trace in traces {
            let timeline = process_timeline(&mut score, trace, &args.params);
            if binarizer.timeline_enabled() {
                if let Err(e) = binarizer.binarize_timeline(&timeline) {
                    warn!("Timeline output stopped: {}", e);
                }
            }
        }
    }

    if skipped > 0 {
        warn!("{} of {} input files could not be read", skipped, inputs.len());
    }

    build_folders(&mut score);
    debug!("Built {} folders", score.folders.len());

    let failures = binarizer.finalize(&score, &args.params);
    if failures > 0 {
        anyhow::bail!("Failed to write {} score file(s)", failures);
    }
    info!(
        "✓ Score written to: {} ({} units, {} timelines)",
        args.output.display(),
        score.units.len(),
        binarizer.timelines_written()
    );

    if args.print_summary || args.summary_json.is_some() {
        let summary = build_summary(&score, args.top_entries);

        if let Some(json_path) = &args.summary_json {
            write_summary(&summary, json_path).context("Failed to write summary JSON")?;
            info!("✓ Summary written to: {}", json_path.display());
        }

        if args.print_summary {
            println!("\n{}", "=".repeat(80));
            println!("COMPILE SCORE SUMMARY");
            println!("{}", "=".repeat(80));
            println!("{}", generate_text_summary(&summary));
            println!("{}", "=".repeat(80));
        }
    }

    let elapsed = start_time.elapsed();
    info!("Generation completed in {:.2}s", elapsed.as_secs_f64());

    Ok(score)
}

/// Parse one input file into its unit traces
///
/// **Private** - internal helper for execute_generate
fn load_unit_traces(
    path: &Path,
    format: InputFormat,
    score: &mut ScoreData,
    args: &GenerateArgs,
) -> Result<Vec<UnitTrace>, ParseError> {
    let detail = args.params.detail;
    match format {
        InputFormat::Clang => Ok(vec![load_clang_trace(path, &mut score.strings, detail)?]),
        InputFormat::Timeline => {
            let input = load_timeline_input(path)?;
            debug!("{}: {} units", path.display(), input.units.len());
            Ok(input
                .units
                .iter()
                .map(|unit| unit_trace(unit, &mut score.strings, detail))
                .collect())
        }
    }
}

/// Collect trace files under `input`
///
/// **Public** - a file is returned as is; a directory is walked recursively
/// for `.json` files, sorted by path so unit ids are stable across runs
pub fn collect_inputs(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(input) {
        let entry = entry.context("Failed to read directory entry")?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_trace = entry
            .path()
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(TRACE_FILE_EXTENSION));
        if is_trace {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

/// Validate generate arguments
///
/// **Public** - can be called before execute_generate for early validation
pub fn validate_args(args: &GenerateArgs) -> Result<()> {
    if args.input.as_os_str().is_empty() {
        anyhow::bail!("Input path cannot be empty");
    }

    if !args.input.exists() {
        anyhow::bail!("Input path does not exist: {}", args.input.display());
    }

    if args.output.as_os_str().is_empty() {
        anyhow::bail!("Output path cannot be empty");
    }

    if args.output.is_dir() {
        anyhow::bail!("Output path is a directory: {}", args.output.display());
    }

    if args.params.timeline_pack == 0 {
        anyhow::bail!("timeline_pack must be greater than 0");
    }

    if args.top_entries == 0 {
        anyhow::bail!("top must be greater than 0");
    }

    if args.top_entries > 1000 {
        anyhow::bail!("top is too large (max 1000)");
    }

    if args.params.timeline_detail > args.params.detail {
        warn!(
            "Timeline detail {} is finer than detail {}, using {}",
            args.params.timeline_detail,
            args.params.detail,
            args.params.effective_timeline_detail()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::config::ExportParams;
    use std::fs;

    fn args_for(input: &Path, output: &Path) -> GenerateArgs {
        GenerateArgs {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_args_valid() {
        let dir = tempfile::tempdir().unwrap();
        let args = args_for(dir.path(), &dir.path().join("out.scor"));
        assert!(validate_args(&args).is_ok());
    }

    #[test]
    fn test_validate_args_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let args = args_for(&dir.path().join("missing"), &dir.path().join("out.scor"));
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_output_is_directory() {
        let dir = tempfile::tempdir().unwrap();
        let args = args_for(dir.path(), dir.path());
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_zero_pack() {
        let dir = tempfile::tempdir().unwrap();
        let args = GenerateArgs {
            params: ExportParams {
                timeline_pack: 0,
                ..Default::default()
            },
            ..args_for(dir.path(), &dir.path().join("out.scor"))
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_top_entries() {
        let dir = tempfile::tempdir().unwrap();
        let base = args_for(dir.path(), &dir.path().join("out.scor"));

        let zero = GenerateArgs {
            top_entries: 0,
            ..base.clone()
        };
        assert!(validate_args(&zero).is_err());

        let large = GenerateArgs {
            top_entries: 2000,
            ..base
        };
        assert!(validate_args(&large).is_err());
    }

    #[test]
    fn test_collect_inputs_sorted_json_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("b.json"), "{}").unwrap();
        fs::write(dir.path().join("sub/a.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let files = collect_inputs(dir.path()).unwrap();
        assert_eq!(
            files,
            vec![dir.path().join("b.json"), dir.path().join("sub/a.json")]
        );
    }

    #[test]
    fn test_execute_generate_without_inputs_fails() {
        let dir = tempfile::tempdir().unwrap();
        let args = args_for(dir.path(), &dir.path().join("out.scor"));
        assert!(execute_generate(&args).is_err());
    }
}
