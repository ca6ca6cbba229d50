use crate::output::reader::{read_globals_file, read_score_file, read_timeline_file};
use crate::output::{globals_path, timeline_path};
use crate::parser::category::CompileCategory;
use crate::utils::config::SCORE_VERSION;
use anyhow::{Context, Result};
use std::path::Path;

/// Validate a main score file and its companions
pub fn validate_score_file(file_path: &Path) -> Result<()> {
    println!("Validating score: {}", file_path.display());

    let score = read_score_file(file_path)
        .with_context(|| format!("Failed to read {}", file_path.display()))?;

    println!("✓ Valid score file");
    println!("  Version: {}", score.version);
    println!("  Build span: {} us", score.full_duration);
    println!("  Threads: {}", score.num_threads);
    println!("  Units: {}", score.units.len());
    println!("  Include files: {}", score.includes.len());
    println!("  Folders: {}", score.folders.len());
    println!("  Includers: {}", score.includers.len());

    if globals_path(file_path).exists() {
        let globals = read_globals_file(file_path).context("Failed to read globals file")?;
        println!("✓ Valid globals file");
        for category in CompileCategory::ALL.iter().skip(CompileCategory::Include.index() + 1) {
            let entries = globals.category(*category);
            if !entries.is_empty() {
                println!("  {}: {}", category, entries.len());
            }
        }
    }

    let mut number = 0;
    let mut timelines = 0;
    while timeline_path(file_path, number).exists() {
        let file = read_timeline_file(file_path, number)
            .with_context(|| format!("Failed to read timeline file {}", number))?;
        timelines += file.timelines.len();
        number += 1;
    }
    if number > 0 {
        println!("✓ Valid timeline files: {} ({} timelines)", number, timelines);
    }

    Ok(())
}

/// Display the binary format description
pub fn display_format() {
    println!("Compile Score Binary Format");
    println!("Current Version: {}", SCORE_VERSION);
    println!();
    println!("All integers are native-endian. Strings carry a 7-bit continuation length prefix.");
    println!();
    println!("<base>            main file");
    println!("  version u32, timeline pack u32");
    println!("  session         full duration u64, threads u32, per display category accumulated u64 + count u32");
    println!("  units           count u32, per unit name + per display category duration u32");
    println!("  includes        count u32, statistics records");
    println!("  folders         count u32, per folder name + children, unit ids, include ids");
    println!("  includers       count u32, per include file includer ids + unit ids");
    println!("<base>.gbl        globals file");
    println!("  version u32, per gathered category after Include: count u32 + statistics records, tags");
    println!("<base>.tNNNN      timeline files");
    println!("  version u32, per unit: track count u32, per track event count u32,");
    println!("  per event start u32, duration u32, name id u32, category u8");
    println!();
    println!("Categories:");
    for category in CompileCategory::ALL {
        println!("  {:>2}  {}", category as u8, category);
    }
}

/// Display version information
pub fn display_version() {
    println!("Compile Score Generator v{}", env!("CARGO_PKG_VERSION"));
    println!("Score Format: v{}", SCORE_VERSION);
    println!();
    println!("Aggregates compiler time traces into binary score files.");
}
