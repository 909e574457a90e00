//! Modgraph Config - Pure configuration data structures
//!
//! This crate contains only data structures, no logic or global state.
//! Every resolution run receives its configuration explicitly; nothing here
//! is shared between runs.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default version-suffix pattern for automatic module names
pub const DEFAULT_VERSION_PATTERN: &str = r"-(\d+(\.|$))";

/// Root-module selection beyond the modules under compilation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootSelection {
    /// Explicitly named root modules (the `--add-modules` list)
    Modules(Vec<String>),
    /// Every module found on the module path
    AllModulePath,
}

impl Default for RootSelection {
    fn default() -> Self {
        RootSelection::Modules(Vec::new())
    }
}

/// Automatic module name derivation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Regular expression locating the version suffix in an artifact file name.
    /// Everything from the start of the first match is dropped.
    pub version_pattern: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            version_pattern: DEFAULT_VERSION_PATTERN.to_string(),
        }
    }
}

/// Automatic module resolution behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomaticConfig {
    /// Resolving one automatic module resolves all observable automatic modules
    pub resolve_all: bool,
}

impl Default for AutomaticConfig {
    fn default() -> Self {
        Self { resolve_all: true }
    }
}

/// Configuration for one resolution run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Directories whose immediate subdirectories are modules under compilation
    pub module_source_path: Vec<PathBuf>,
    /// Ordered module path (directories or archives)
    pub module_path: Vec<PathBuf>,
    /// Ordered platform module locations
    pub system_path: Vec<PathBuf>,
    /// Class path entries forming the unnamed module
    pub class_path: Vec<PathBuf>,
    /// Additional root modules
    pub roots: RootSelection,
    /// Automatic module naming rule
    pub naming: NamingConfig,
    /// Automatic module resolution behavior
    pub automatic: AutomaticConfig,
}

impl ResolverConfig {
    /// Parse a JSON configuration document
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Names listed in `RootSelection::Modules`, empty for `AllModulePath`
    pub fn added_modules(&self) -> &[String] {
        match &self.roots {
            RootSelection::Modules(names) => names,
            RootSelection::AllModulePath => &[],
        }
    }
}

/// Execution phase enum for phase-specific configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Scan,
    Resolve,
    Check,
}

impl Phase {
    /// Get the string name of the phase
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Scan => "scan",
            Phase::Resolve => "resolve",
            Phase::Check => "check",
        }
    }

    /// Get the log target name for this phase
    pub fn target(&self) -> String {
        format!("modgraph::{}", self.as_str())
    }
}
