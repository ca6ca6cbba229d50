//! Compile Score
//!
//! Aggregates per-unit compiler time traces into a build-wide score and
//! serializes it into compact binary files for a score viewer.
//!
//! This crate provides the core implementation for the
//! `score-gen` CLI tool.
//!
//! ## Getting Started
//!
//! ```bash
//! score-gen clang build/ -o compileData.scor --summary
//! score-gen validate compileData.scor
//! ```

pub mod aggregator;
pub mod commands;
pub mod output;
pub mod parser;
pub mod utils;
