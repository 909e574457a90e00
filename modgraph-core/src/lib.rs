//! Modgraph Core - module graph resolution (pure logic, IO through the VFS)
//!
//! Scans module path artifacts, derives automatic module names, resolves
//! readability between modules and checks package access from the sources
//! of the modules under compilation.
//!
//! Configuration is passed explicitly via parameters, not via global state.
//!
//! # Usage
//! ```rust,ignore
//! use modgraph_core::{compile, ResolverConfig};
//! use modgraph_vfs::NativeFileSystem;
//!
//! let outcome = compile(&config, &NativeFileSystem::new());
//! print!("{}", outcome.log.render());
//! ```

pub mod access;
pub mod artifact;
pub mod diagnostic;
pub mod error;
pub mod finder;
pub mod graph;
pub mod module;
pub mod report;
pub mod resolver;
pub mod session;
pub mod syntax;

pub use access::{Access, AccessChecker};
pub use artifact::{Artifact, ArtifactKind};
pub use diagnostic::{Diagnostic, DiagnosticCode, DiagnosticLog, SourceLocation};
pub use error::ResolveError;
pub use finder::{ModuleFinder, ObservableModules};
pub use graph::ModuleGraph;
pub use module::{
    AutomaticNaming, DefaultNaming, Export, ModuleDescriptor, ModuleKind, ModuleOrigin, ModuleRef,
    Requires,
};
pub use report::{summarize, ModuleSummary};
pub use resolver::{resolve, Resolver};
pub use session::{compile, resolve_graph, CompileOutcome};

// Re-export config types from modgraph-config
pub use modgraph_config::{
    AutomaticConfig, NamingConfig, Phase, ResolverConfig, RootSelection, DEFAULT_VERSION_PATTERN,
};
