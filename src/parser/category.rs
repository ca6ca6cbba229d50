//! Compiler activity categories and detail-level cutoffs.
//!
//! Categories are ordered: fine-grained leaf activities come first, the
//! coarse passes (FrontEnd, BackEnd, ExecuteCompiler) sit above them, and
//! the low-level pass categories come last. Every cutoff in the engine is a
//! comparison against this ordering.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of compiler activity recorded in a trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum CompileCategory {
    Include = 0,
    ParseClass,
    ParseTemplate,
    InstantiateClass,
    InstantiateFunction,
    InstantiateVariable,
    InstantiateConcept,
    CodeGenFunction,
    OptimizeFunction,
    OptimizeModule,
    FrontEnd,
    BackEnd,
    ExecuteCompiler,
    Other,
    RunPass,
    CodeGenPasses,
    PerFunctionPasses,
    PerModulePasses,
    DebugType,
    DebugGlobalVariable,
    Invalid,
}

/// Number of categories with a global per-name dictionary
pub const GATHER_FULL: usize = CompileCategory::FrontEnd as usize;

/// Number of categories with a per-unit bucket total
pub const DISPLAY_COUNT: usize = CompileCategory::Other as usize + 1;

/// Number of valid categories
pub const CATEGORY_COUNT: usize = CompileCategory::Invalid as usize;

impl CompileCategory {
    /// All valid categories in ascending order
    pub const ALL: [CompileCategory; CATEGORY_COUNT] = [
        Self::Include,
        Self::ParseClass,
        Self::ParseTemplate,
        Self::InstantiateClass,
        Self::InstantiateFunction,
        Self::InstantiateVariable,
        Self::InstantiateConcept,
        Self::CodeGenFunction,
        Self::OptimizeFunction,
        Self::OptimizeModule,
        Self::FrontEnd,
        Self::BackEnd,
        Self::ExecuteCompiler,
        Self::Other,
        Self::RunPass,
        Self::CodeGenPasses,
        Self::PerFunctionPasses,
        Self::PerModulePasses,
        Self::DebugType,
        Self::DebugGlobalVariable,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Decode a category from its wire value
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    /// Map a clang `-ftime-trace` event name to a category
    ///
    /// **Public** - used by the clang trace adapter
    pub fn from_clang_name(name: &str) -> Self {
        match name {
            "Source" => Self::Include,
            "ParseClass" => Self::ParseClass,
            "ParseTemplate" => Self::ParseTemplate,
            "InstantiateClass" => Self::InstantiateClass,
            "InstantiateFunction" => Self::InstantiateFunction,
            "InstantiateVariable" => Self::InstantiateVariable,
            "InstantiateConcept" => Self::InstantiateConcept,
            "CodeGen Function" => Self::CodeGenFunction,
            "OptFunction" => Self::OptimizeFunction,
            "OptModule" => Self::OptimizeModule,
            "Frontend" => Self::FrontEnd,
            "Backend" => Self::BackEnd,
            "ExecuteCompiler" => Self::ExecuteCompiler,
            "RunPass" => Self::RunPass,
            "CodeGenPasses" => Self::CodeGenPasses,
            "PerFunctionPasses" => Self::PerFunctionPasses,
            "PerModulePasses" => Self::PerModulePasses,
            "DebugType" => Self::DebugType,
            "DebugGlobalVariable" => Self::DebugGlobalVariable,
            _ => Self::Other,
        }
    }

    /// Coarse compiler passes, named after the unit rather than a symbol
    pub fn is_pass(self) -> bool {
        matches!(self, Self::FrontEnd | Self::BackEnd | Self::ExecuteCompiler)
    }

    /// Categories whose names are file paths
    pub fn is_path(self) -> bool {
        matches!(self, Self::Include | Self::OptimizeModule)
    }

    /// Categories below the display limit own a per-unit bucket
    pub fn is_display(self) -> bool {
        self.index() < DISPLAY_COUNT
    }

    /// Low-level categories only collected at full detail
    pub fn is_full_only(self) -> bool {
        self >= Self::Other && self != Self::Invalid
    }
}

impl fmt::Display for CompileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::str::FromStr for CompileCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|category| format!("{:?}", category).eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

/// Requested amount of detail for statistics or timelines
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportDetail {
    /// Include statistics only
    None,
    /// Includes plus class and template parsing
    Basic,
    /// Everything the front end does
    #[value(name = "frontend")]
    FrontEnd,
    /// Front end, code generation, optimization and low-level passes
    Full,
}

impl ExportDetail {
    /// First category excluded from global statistics at this detail
    pub fn gather_cutoff(self) -> CompileCategory {
        match self {
            Self::None => CompileCategory::ParseClass,
            Self::Basic => CompileCategory::InstantiateClass,
            Self::FrontEnd => CompileCategory::CodeGenFunction,
            Self::Full => CompileCategory::FrontEnd,
        }
    }

    /// Whether an event of `category` is kept at this detail
    pub fn keeps(self, category: CompileCategory) -> bool {
        if category == CompileCategory::Invalid {
            return false;
        }
        category < self.gather_cutoff()
            || category.is_pass()
            || (self == Self::Full && category.is_full_only())
    }
}

impl fmt::Display for ExportDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Basic => "basic",
            Self::FrontEnd => "frontend",
            Self::Full => "full",
        };
        f.write_str(name)
    }
}
