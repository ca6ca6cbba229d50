//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod generate;
pub mod models;
pub mod utils;

// Re-export main command functions
pub use generate::{collect_inputs, execute_generate, validate_args};
pub use models::{GenerateArgs, InputFormat};
pub use utils::{display_format, display_version, validate_score_file};
