//! Compile Score CLI
//!
//! Generates binary score files from compiler time traces.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use compile_score::commands::{
    display_format, display_version, execute_generate, validate_args, validate_score_file, GenerateArgs,
    InputFormat,
};
use compile_score::parser::ExportDetail;
use compile_score::utils::config::{ExportParams, DEFAULT_OUTPUT_NAME, DEFAULT_TIMELINE_PACK};
use env_logger::Env;
use std::path::PathBuf;

/// Compile Score - build time aggregation for C++ compilers
#[derive(Parser, Debug)]
#[command(name = "score-gen")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a score from clang -ftime-trace files
    Clang(GenerateOptions),

    /// Generate a score from generic JSON timelines
    Timeline(GenerateOptions),

    /// Validate a score file and its companions
    Validate {
        /// Path to the main score file
        file: PathBuf,
    },

    /// Display the binary format description
    Format,

    /// Display version information
    Version,
}

#[derive(Args, Debug)]
struct GenerateOptions {
    /// Trace file or directory to scan
    input: PathBuf,

    /// Output path for the main score file
    #[arg(short, long, default_value = DEFAULT_OUTPUT_NAME)]
    output: PathBuf,

    /// Detail of the global statistics
    #[arg(long, value_enum, default_value_t = ExportDetail::Full, env = "SCORE_DETAIL")]
    detail: ExportDetail,

    /// Detail of the timelines, clamped to --detail
    #[arg(long, value_enum, default_value_t = ExportDetail::Full, env = "SCORE_TIMELINE_DETAIL")]
    timeline_detail: ExportDetail,

    /// Timelines per timeline file
    #[arg(long, default_value_t = DEFAULT_TIMELINE_PACK)]
    timeline_pack: u32,

    /// Skip timeline files
    #[arg(long)]
    no_timeline: bool,

    /// Skip the include graph
    #[arg(long)]
    no_includers: bool,

    /// Print text summary to stdout
    #[arg(long)]
    summary: bool,

    /// Output path for a JSON summary (optional)
    #[arg(long)]
    json: Option<PathBuf>,

    /// Number of entries per summary list
    #[arg(long, default_value = "10")]
    top: usize,
}

impl GenerateOptions {
    fn into_args(self, format: InputFormat) -> GenerateArgs {
        GenerateArgs {
            input: self.input,
            format,
            output: self.output,
            params: ExportParams {
                detail: self.detail,
                timeline_detail: self.timeline_detail,
                timeline_pack: self.timeline_pack,
                timeline_enabled: !self.no_timeline,
                includers_enabled: !self.no_includers,
            },
            print_summary: self.summary,
            summary_json: self.json,
            top_entries: self.top,
        }
    }
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Clang(options) => generate(options.into_args(InputFormat::Clang))?,
        Commands::Timeline(options) => generate(options.into_args(InputFormat::Timeline))?,
        Commands::Validate { file } => validate_score_file(&file)?,
        Commands::Format => display_format(),
        Commands::Version => display_version(),
    }

    Ok(())
}

fn generate(args: GenerateArgs) -> Result<()> {
    // Validate args first
    validate_args(&args)?;
    execute_generate(&args)?;
    Ok(())
}
