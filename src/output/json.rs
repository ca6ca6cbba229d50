//! JSON and text summary reports.
//!
//! Condenses a finished score into the slowest entries per category and the
//! slowest units, for quick inspection without a score viewer.

use super::prepare_output_path;
use crate::aggregator::score::{CompileData, ScoreData};
use crate::aggregator::strings::base_name;
use crate::parser::category::{CompileCategory, GATHER_FULL};
use crate::utils::error::OutputError;
use chrono::Utc;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Top-level summary report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    /// Crate version that produced the report
    pub version: String,

    pub unit_count: usize,

    /// Wall-clock span of the build in microseconds
    pub full_duration: u64,

    pub num_threads: u32,

    /// Slowest units by ExecuteCompiler duration
    pub slowest_units: Vec<UnitSummary>,

    /// Non-empty gathered categories, in category order
    pub categories: Vec<CategorySummary>,

    /// ISO 8601 timestamp
    pub generated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSummary {
    pub name: String,
    pub duration: u32,
    pub frontend: u32,
    pub backend: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: CompileCategory,
    pub entry_count: usize,
    pub top: Vec<EntrySummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySummary {
    pub name: String,
    pub accumulated: u64,
    pub self_accumulated: u64,
    pub count: u32,
    pub maximum: u32,
    /// Unit where the maximum was reached
    pub worst_unit: String,
}

/// Build a summary of `score` keeping `top_n` entries per list
///
/// **Public** - used by the generate command
pub fn build_summary(score: &ScoreData, top_n: usize) -> ScoreSummary {
    let unit_name = |unit_id: u32| -> String {
        score
            .units
            .get(unit_id as usize)
            .map(|unit| base_name(score.strings.resolve(unit.name_hash)).to_string())
            .unwrap_or_default()
    };

    let mut units: Vec<UnitSummary> = score
        .units
        .iter()
        .map(|unit| UnitSummary {
            name: score.strings.resolve(unit.name_hash).to_string(),
            duration: unit.value(CompileCategory::ExecuteCompiler),
            frontend: unit.value(CompileCategory::FrontEnd),
            backend: unit.value(CompileCategory::BackEnd),
        })
        .collect();
    units.sort_by(|a, b| b.duration.cmp(&a.duration));
    units.truncate(top_n);

    let categories = score
        .globals
        .iter()
        .enumerate()
        .take(GATHER_FULL)
        .filter(|(_, dictionary)| !dictionary.is_empty())
        .filter_map(|(index, dictionary)| {
            let category = CompileCategory::from_u8(index as u8)?;
            let mut entries: Vec<&CompileData> = dictionary.entries().iter().collect();
            entries.sort_by(|a, b| b.accumulated.cmp(&a.accumulated));

            let top = entries
                .into_iter()
                .take(top_n)
                .map(|data| EntrySummary {
                    name: score.strings.resolve(data.name_hash).to_string(),
                    accumulated: data.accumulated,
                    self_accumulated: data.self_accumulated,
                    count: data.count,
                    maximum: data.maximum,
                    worst_unit: unit_name(data.max_id),
                })
                .collect();

            Some(CategorySummary {
                category,
                entry_count: dictionary.len(),
                top,
            })
        })
        .collect();

    ScoreSummary {
        version: env!("CARGO_PKG_VERSION").to_string(),
        unit_count: score.units.len(),
        full_duration: score.session.full_duration,
        num_threads: score.session.num_threads,
        slowest_units: units,
        categories,
        generated_at: Utc::now().to_rfc3339(),
    }
}

/// Write a summary to a JSON file
///
/// **Public** - main entry point for JSON output
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_summary(summary: &ScoreSummary, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing summary to: {}", output_path.display());

    prepare_output_path(output_path)?;

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    serde_json::to_writer_pretty(BufWriter::new(file), summary)
        .map_err(OutputError::SerializationFailed)?;

    info!(
        "Summary written successfully ({} bytes)",
        calculate_file_size(output_path)
    );

    Ok(())
}

/// Read a summary back from a JSON file
///
/// **Public** - useful for validation and testing
pub fn read_summary(input_path: impl AsRef<Path>) -> Result<ScoreSummary, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading summary from: {}", input_path.display());

    let file = File::open(input_path).map_err(OutputError::WriteFailed)?;
    let summary: ScoreSummary =
        serde_json::from_reader(file).map_err(OutputError::SerializationFailed)?;

    debug!(
        "Summary loaded: version {}, {} units",
        summary.version, summary.unit_count
    );

    Ok(summary)
}

/// Render a summary as a text report
///
/// **Public** - printed by `--summary`
pub fn generate_text_summary(summary: &ScoreSummary) -> String {
    let mut lines = Vec::new();

    lines.push(format!(
        "Units: {}   Build span: {}   Threads: {}",
        summary.unit_count,
        format_micros(summary.full_duration),
        summary.num_threads
    ));

    lines.push(String::new());
    lines.push("  SLOWEST UNITS".to_string());
    lines.push(format!(
        "  {:<48} {:>12} {:>12} {:>12}",
        "Unit", "Total", "Frontend", "Backend"
    ));
    for unit in &summary.slowest_units {
        lines.push(format!(
            "  {:<48} {:>12} {:>12} {:>12}",
            truncate(&unit.name, 48, true),
            format_micros(unit.duration as u64),
            format_micros(unit.frontend as u64),
            format_micros(unit.backend as u64)
        ));
    }

    for category in &summary.categories {
        lines.push(String::new());
        lines.push(format!("  {} ({} entries)", category.category, category.entry_count));
        let keep_tail = category.category.is_path();
        for entry in &category.top {
            lines.push(format!(
                "  {:<48} {:>12} {:>8}x  max {:>10} in {}",
                truncate(&entry.name, 48, keep_tail),
                format_micros(entry.accumulated),
                entry.count,
                format_micros(entry.maximum as u64),
                entry.worst_unit
            ));
        }
    }

    lines.join("\n")
}

/// Microseconds as a short human-readable duration
fn format_micros(micros: u64) -> String {
    if micros >= 1_000_000 {
        format!("{:.2}s", micros as f64 / 1_000_000.0)
    } else if micros >= 1_000 {
        format!("{:.2}ms", micros as f64 / 1_000.0)
    } else {
        format!("{}us", micros)
    }
}

/// Shorten long names to `width` characters
///
/// Paths keep their tail; symbols keep their head.
fn truncate(text: &str, width: usize, keep_tail: bool) -> String {
    let count = text.chars().count();
    if count <= width {
        return text.to_string();
    }
    if keep_tail {
        let tail: String = text.chars().skip(count - (width - 3)).collect();
        format!("...{}", tail)
    } else {
        let head: String = text.chars().take(width - 3).collect();
        format!("{}...", head)
    }
}

/// Calculate file size in bytes
///
/// **Private** - internal utility
fn calculate_file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}
