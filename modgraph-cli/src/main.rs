//! Modgraph CLI - Command line interface
//!
//! Resolves the module graph for the modules under compilation and prints
//! diagnostics in the compiler's raw format.

use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process;

mod config;
mod logging;
mod platform;

use crate::config::LogConfig;
use crate::logging::LogFormat;
use modgraph_core::{compile, report, ResolverConfig, RootSelection};
use modgraph_vfs::NativeFileSystem;
use tracing::Level;

/// `--add-modules` 中表示模块路径上全部模块的特殊值
const ALL_MODULE_PATH: &str = "ALL-MODULE-PATH";

#[derive(Parser, Debug)]
#[command(
    name = "modgraph",
    about = "Module graph resolver - automatic modules, readability and access checks",
    version
)]
struct Cli {
    /// JSON configuration file; command line options override its fields
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directories holding one subdirectory per module under compilation
    #[arg(long, value_name = "PATHS")]
    module_source_path: Option<OsString>,

    /// Module path entries (directories or archives)
    #[arg(short = 'p', long, value_name = "PATHS")]
    module_path: Option<OsString>,

    /// Platform module locations
    #[arg(long, value_name = "PATHS")]
    system_path: Option<OsString>,

    /// Class path entries forming the unnamed module
    #[arg(long, visible_alias = "cp", value_name = "PATHS")]
    class_path: Option<OsString>,

    /// Additional root modules, or ALL-MODULE-PATH
    #[arg(long, value_delimiter = ',', value_name = "MODULES")]
    add_modules: Vec<String>,

    /// Only resolve automatic modules that are required or added
    #[arg(long)]
    no_resolve_all_automatic: bool,

    /// Regular expression locating the version suffix in archive names
    #[arg(long, value_name = "REGEX")]
    version_pattern: Option<String>,

    /// Print the resolved module index as JSON
    #[arg(long)]
    describe: bool,

    /// Print readable messages with source context to stderr
    #[arg(long)]
    explain: bool,

    /// Global log level: error, warn, info, debug, trace
    #[arg(long, default_value = "warn")]
    log_level: Level,

    /// Per-phase log level, e.g. `resolve=debug`
    #[arg(long = "log-phase", value_name = "PHASE=LEVEL")]
    log_phases: Vec<String>,

    /// Log output format
    #[arg(long, value_enum, default_value = "compact")]
    log_format: LogFormat,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli) {
        eprintln!("Error: {e}");
        process::exit(2);
    }

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(2);
        }
    };

    let vfs = NativeFileSystem::new();
    let outcome = compile(&config, &vfs);

    // --describe 时 stdout 只输出 JSON
    let written = if cli.describe {
        platform::write_raw(&outcome.log, &mut std::io::stderr())
    } else {
        platform::write_raw(&outcome.log, &mut std::io::stdout())
    };
    if let Err(e) = written {
        eprintln!("Error: {e}");
        process::exit(2);
    }
    if cli.explain {
        platform::explain(&outcome.log, &vfs);
    }

    if cli.describe {
        if let Some(graph) = &outcome.graph {
            match report::to_json(graph) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(2);
                }
            }
        }
    }

    if !outcome.succeeded() {
        process::exit(1);
    }
}

fn init_logging(cli: &Cli) -> Result<(), String> {
    let mut log_config = LogConfig::new(cli.log_level);
    for directive in &cli.log_phases {
        log_config.apply_override(directive)?;
    }
    let file = match &cli.log_file {
        Some(path) => Some(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| format!("cannot open log file '{}': {e}", path.display()))?,
        ),
        None => None,
    };
    logging::init(&log_config, cli.log_format, file)
}

/// Configuration file first, then command line overrides
fn build_config(cli: &Cli) -> Result<ResolverConfig, String> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("cannot read '{}': {e}", path.display()))?;
            ResolverConfig::from_json(&text)
                .map_err(|e| format!("cannot parse '{}': {e}", path.display()))?
        }
        None => ResolverConfig::default(),
    };

    if let Some(paths) = &cli.module_source_path {
        config.module_source_path = split_paths(paths);
    }
    if let Some(paths) = &cli.module_path {
        config.module_path = split_paths(paths);
    }
    if let Some(paths) = &cli.system_path {
        config.system_path = split_paths(paths);
    }
    if let Some(paths) = &cli.class_path {
        config.class_path = split_paths(paths);
    }
    if !cli.add_modules.is_empty() {
        config.roots = if cli.add_modules.iter().any(|m| m == ALL_MODULE_PATH) {
            RootSelection::AllModulePath
        } else {
            RootSelection::Modules(cli.add_modules.clone())
        };
    }
    if cli.no_resolve_all_automatic {
        config.automatic.resolve_all = false;
    }
    if let Some(pattern) = &cli.version_pattern {
        config.naming.version_pattern = pattern.clone();
    }
    Ok(config)
}

/// Split a list joined with the platform path separator
fn split_paths(paths: &OsString) -> Vec<PathBuf> {
    std::env::split_paths(paths)
        .filter(|p| !p.as_os_str().is_empty())
        .collect()
}
