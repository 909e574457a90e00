//! 访问检查
//!
//! 对每个正在编译的模块，扫描其源文件中的包引用并判断能否访问：
//! - 包在本模块内：允许
//! - 某个包含该包的模块被本模块读取，且向本模块导出该包：允许
//! - 图中没有模块包含该包：`doesnt.exist`
//! - 否则：`not.def.access.package.cant.access`（按需导入为 `package.not.visible`）
//!
//! 访问违规只产生诊断，不中断检查。

use crate::diagnostic::{Diagnostic, DiagnosticCode, DiagnosticLog, SourceLocation};
use crate::graph::ModuleGraph;
use crate::module::ModuleDescriptor;
use crate::syntax::{scan_compilation_unit, PackageReference, ReferenceKind};
use modgraph_vfs::VirtualFileSystem;
use std::path::Path;
use tracing::{debug, info};

/// 单个引用的检查结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    /// 图中没有模块包含该包
    NotFound,
    /// 包存在但不可访问
    NotAccessible,
}

/// 访问检查器
pub struct AccessChecker<'a> {
    graph: &'a ModuleGraph,
    vfs: &'a dyn VirtualFileSystem,
}

impl<'a> AccessChecker<'a> {
    pub fn new(graph: &'a ModuleGraph, vfs: &'a dyn VirtualFileSystem) -> Self {
        Self { graph, vfs }
    }

    /// 检查全部正在编译的模块
    pub fn check_all(&self) -> DiagnosticLog {
        let mut log = DiagnosticLog::new();
        for module in self.graph.compiled() {
            log.extend(self.check_module(module));
        }
        info!(
            target: "modgraph::check",
            errors = log.error_count(),
            "access check finished"
        );
        log
    }

    /// 检查一个模块的全部源文件
    pub fn check_module(&self, module: &ModuleDescriptor) -> Vec<Diagnostic> {
        module
            .sources
            .iter()
            .flat_map(|source| self.check_source(module, source))
            .collect()
    }

    /// 检查一个源文件
    pub fn check_source(&self, module: &ModuleDescriptor, path: &Path) -> Vec<Diagnostic> {
        let text = match self.vfs.read_file(path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                return vec![Diagnostic::new(
                    DiagnosticCode::CantReadFile,
                    [path.display().to_string(), e.to_string()],
                )]
            }
        };
        let unit = match scan_compilation_unit(&text) {
            Ok(unit) => unit,
            Err(e) => {
                return vec![Diagnostic::new(DiagnosticCode::from(e.kind), Vec::<String>::new())
                    .at(SourceLocation::new(path, e.position))]
            }
        };

        debug!(
            target: "modgraph::check",
            module = %module.name,
            file = %path.display(),
            references = unit.references.len(),
            "checking compilation unit"
        );

        unit.references
            .iter()
            .filter_map(|reference| {
                let access = self.check_reference(module, &reference.package);
                violation(access, reference).map(|d| d.at(SourceLocation::new(path, reference.position)))
            })
            .collect()
    }

    /// 判断 `from` 能否访问 `package`
    pub fn check_reference(&self, from: &ModuleDescriptor, package: &str) -> Access {
        if from.contains(package) {
            return Access::Granted;
        }
        let candidates = self.graph.candidates(package);
        if candidates.is_empty() {
            return Access::NotFound;
        }
        let granted = candidates.iter().any(|owner| {
            self.graph.can_read(&from.name, &owner.name) && owner.exports_to(package, &from.name)
        });
        if granted {
            Access::Granted
        } else {
            Access::NotAccessible
        }
    }
}

fn violation(access: Access, reference: &PackageReference) -> Option<Diagnostic> {
    match (access, reference.kind) {
        (Access::Granted, _) => None,
        (Access::NotFound, _) => Some(Diagnostic::new(
            DiagnosticCode::DoesntExist,
            [reference.package.clone()],
        )),
        (Access::NotAccessible, ReferenceKind::Type) => Some(Diagnostic::new(
            DiagnosticCode::NotDefAccessPackageCantAccess,
            [reference.display_name(), reference.package.clone()],
        )),
        (Access::NotAccessible, ReferenceKind::Package) => Some(Diagnostic::new(
            DiagnosticCode::PackageNotVisible,
            [reference.package.clone()],
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{ModuleOrigin, ModuleRef};
    use crate::syntax::parse_descriptor;
    use modgraph_vfs::MemoryFileSystem;
    use std::collections::BTreeSet;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn explicit(source: &str, packages: &[&str], origin: ModuleOrigin) -> ModuleDescriptor {
        let decl = parse_descriptor(source).unwrap();
        let path = format!("/src/{}", decl.name);
        ModuleDescriptor::explicit(&decl, None, path, set(packages), origin)
    }

    /// m1 读 lib；lib 导出 lib.api，限定导出 lib.friend 给 m3；hidden 有 lib.internal
    fn graph() -> ModuleGraph {
        let mut graph = ModuleGraph::new();
        let mut m1 = explicit("module m1 { requires lib; }", &["impl"], ModuleOrigin::Source);
        m1.sources = vec!["/src/m1/impl/Impl.java".into()];
        graph.add_module(m1);
        graph.add_module(explicit(
            "module lib { exports lib.api; exports lib.friend to m3; }",
            &["lib.api", "lib.friend", "lib.internal"],
            ModuleOrigin::ModulePath,
        ));
        graph.add_module(explicit("module other { }", &["other"], ModuleOrigin::ModulePath));
        graph.add_read(&ModuleRef::named("m1"), ModuleRef::named("lib"));
        graph
    }

    fn check(graph: &ModuleGraph, source: &str) -> Vec<String> {
        let fs = MemoryFileSystem::with_files([("/src/m1/impl/Impl.java", source.as_bytes().to_vec())]);
        let checker = AccessChecker::new(graph, &fs);
        checker.check_all().lines()
    }

    #[test]
    fn test_reference_outcomes() {
        let graph = graph();
        let m1 = graph.get_named("m1").unwrap();
        let fs = MemoryFileSystem::new();
        let checker = AccessChecker::new(&graph, &fs);

        assert_eq!(checker.check_reference(m1, "impl"), Access::Granted);
        assert_eq!(checker.check_reference(m1, "lib.api"), Access::Granted);
        assert_eq!(checker.check_reference(m1, "lib.friend"), Access::NotAccessible);
        assert_eq!(checker.check_reference(m1, "lib.internal"), Access::NotAccessible);
        assert_eq!(checker.check_reference(m1, "other"), Access::NotAccessible);
        assert_eq!(checker.check_reference(m1, "nowhere"), Access::NotFound);
    }

    #[test]
    fn test_diagnostics_in_source_order() {
        let lines = check(
            &graph(),
            "package impl;\nimport lib.internal.*;\nclass Impl { lib.api.A a; other.O o; gone.G g; }",
        );
        assert_eq!(
            lines,
            vec![
                "Impl.java:2:20: compiler.err.package.not.visible: lib.internal",
                "Impl.java:3:32: compiler.err.not.def.access.package.cant.access: other.O, other",
                "Impl.java:3:42: compiler.err.doesnt.exist: gone",
                "3 errors",
            ]
        );
    }

    #[test]
    fn test_lexer_error_is_reported() {
        let lines = check(&graph(), "package impl;\nclass Impl { /* never closed");
        assert_eq!(lines, vec!["Impl.java:2:14: compiler.err.unclosed.comment", "1 error"]);
    }

    #[test]
    fn test_unreadable_source() {
        let graph = graph();
        let fs = MemoryFileSystem::new();
        let checker = AccessChecker::new(&graph, &fs);
        let log = checker.check_all();
        assert_eq!(log.error_count(), 1);
        assert_eq!(log.iter().next().unwrap().code, DiagnosticCode::CantReadFile);
    }

    #[test]
    fn test_clean_source() {
        assert!(check(&graph(), "package impl; class Impl { lib.api.A a; }").is_empty());
    }
}
