//! 一次完整运行：构图，然后做访问检查
//!
//! 每次调用从头扫描、从头解析，不保留任何跨调用状态。

use crate::access::AccessChecker;
use crate::diagnostic::DiagnosticLog;
use crate::error::ResolveError;
use crate::finder::ModuleFinder;
use crate::graph::ModuleGraph;
use crate::module::{DefaultNaming, NamingError};
use crate::resolver::Resolver;
use modgraph_config::ResolverConfig;
use modgraph_vfs::VirtualFileSystem;
use tracing::{info, warn};

/// 运行结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOutcome {
    /// 构图失败时为空
    pub graph: Option<ModuleGraph>,
    pub log: DiagnosticLog,
}

impl CompileOutcome {
    /// 没有报告任何错误
    pub fn succeeded(&self) -> bool {
        self.log.is_empty()
    }
}

/// 只构图，不做访问检查
pub fn resolve_graph(
    config: &ResolverConfig,
    vfs: &dyn VirtualFileSystem,
) -> Result<ModuleGraph, ResolveError> {
    let naming = DefaultNaming::from_config(&config.naming).map_err(|e| match e {
        NamingError::InvalidPattern { pattern, .. } => ResolveError::InvalidOption {
            option: "version-pattern".to_string(),
            value: pattern,
        },
        NamingError::InvalidName { file_name, reason } => ResolveError::InvalidAutomaticName {
            path: file_name.into(),
            reason,
        },
    })?;
    let observable = ModuleFinder::new(vfs, &naming).find_all(config)?;
    Resolver::new(&observable, config).resolve()
}

/// 构图并检查全部正在编译的模块
pub fn compile(config: &ResolverConfig, vfs: &dyn VirtualFileSystem) -> CompileOutcome {
    let graph = match resolve_graph(config, vfs) {
        Ok(graph) => graph,
        Err(e) => {
            warn!(target: "modgraph::resolve", error = %e, "resolution failed");
            let mut log = DiagnosticLog::new();
            log.push(e.to_diagnostic());
            return CompileOutcome { graph: None, log };
        }
    };

    let log = AccessChecker::new(&graph, vfs).check_all();
    info!(
        target: "modgraph::check",
        modules = graph.compiled().count(),
        errors = log.error_count(),
        "compilation finished"
    );
    CompileOutcome {
        graph: Some(graph),
        log,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modgraph_config::NamingConfig;
    use modgraph_vfs::MemoryFileSystem;
    use std::path::PathBuf;

    #[test]
    fn test_bad_version_pattern() {
        let config = ResolverConfig {
            naming: NamingConfig {
                version_pattern: "([".to_string(),
            },
            ..ResolverConfig::default()
        };
        let outcome = compile(&config, &MemoryFileSystem::new());
        assert!(outcome.graph.is_none());
        assert_eq!(
            outcome.log.lines(),
            vec![
                "- compiler.err.bad.value.for.option: version-pattern, ([",
                "1 error",
            ]
        );
    }

    #[test]
    fn test_empty_configuration_succeeds() {
        let outcome = compile(&ResolverConfig::default(), &MemoryFileSystem::new());
        assert!(outcome.succeeded());
        assert!(outcome.graph.unwrap().is_empty());
    }

    #[test]
    fn test_compile_clean_module() {
        let fs = MemoryFileSystem::with_files([
            ("/src/m2/module-info.java", b"module m2 { exports m2; }".to_vec()),
            ("/src/m2/m2/M2.java", b"package m2; public class M2 { }".to_vec()),
        ]);
        let config = ResolverConfig {
            module_source_path: vec![PathBuf::from("/src")],
            ..ResolverConfig::default()
        };
        let outcome = compile(&config, &fs);
        assert!(outcome.succeeded());
        assert_eq!(outcome.log.render(), "");
    }
}
