//! 模块模型
//!
//! 每个制品（目录或归档）产生恰好一个 [`ModuleDescriptor`]：
//! 带描述符的制品是显式模块，不带的是自动模块，类路径整体构成无名模块。

pub mod naming;

use crate::diagnostic::SourceLocation;
use crate::syntax::ModuleDeclaration;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

pub use naming::{AutomaticNaming, DefaultNaming, NamingError};

/// 模块种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    /// 带 `module-info` 的模块
    Explicit,
    /// 由文件名推导名字的模块
    Automatic,
    /// 类路径
    Unnamed,
}

impl ModuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleKind::Explicit => "explicit",
            ModuleKind::Automatic => "automatic",
            ModuleKind::Unnamed => "unnamed",
        }
    }
}

/// 模块来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleOrigin {
    System,
    ModulePath,
    /// 正在编译的源码模块
    Source,
    ClassPath,
}

/// 图中的模块标识，无名模块排在所有具名模块之后
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModuleRef {
    Named(String),
    Unnamed,
}

impl ModuleRef {
    pub fn named(name: impl Into<String>) -> Self {
        ModuleRef::Named(name.into())
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            ModuleRef::Named(name) => Some(name),
            ModuleRef::Unnamed => None,
        }
    }
}

impl fmt::Display for ModuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleRef::Named(name) => f.write_str(name),
            ModuleRef::Unnamed => f.write_str("<unnamed>"),
        }
    }
}

impl Serialize for ModuleRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// 依赖声明
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requires {
    pub module: String,
    pub transitive: bool,
    pub is_static: bool,
    /// 声明所在位置；来自归档的描述符没有可报告的源文件时为空
    pub location: Option<SourceLocation>,
}

/// 导出声明
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub package: String,
    /// 限定导出目标，空集表示对所有模块导出
    pub targets: BTreeSet<String>,
}

impl Export {
    pub fn is_qualified(&self) -> bool {
        !self.targets.is_empty()
    }
}

/// 模块描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    pub name: ModuleRef,
    pub kind: ModuleKind,
    pub origin: ModuleOrigin,
    /// 声明顺序
    pub requires: Vec<Requires>,
    pub exports: Vec<Export>,
    /// 模块包含的包
    pub packages: BTreeSet<String>,
    /// 模块来源路径（制品或源码目录）
    pub artifact: PathBuf,
    /// 源码模块的编译单元，按字典序
    pub sources: Vec<PathBuf>,
}

impl ModuleDescriptor {
    /// 由解析出的模块声明构造显式模块
    pub fn explicit(
        declaration: &ModuleDeclaration,
        descriptor_file: Option<&Path>,
        artifact: impl AsRef<Path>,
        packages: BTreeSet<String>,
        origin: ModuleOrigin,
    ) -> Self {
        let requires = declaration
            .requires
            .iter()
            .map(|r| Requires {
                module: r.module.clone(),
                transitive: r.transitive,
                is_static: r.is_static,
                location: descriptor_file.map(|file| SourceLocation::new(file, r.position)),
            })
            .collect();

        let exports = declaration
            .exports
            .iter()
            .map(|e| Export {
                package: e.package.clone(),
                targets: e.targets.iter().cloned().collect(),
            })
            .collect();

        Self {
            name: ModuleRef::Named(declaration.name.clone()),
            kind: ModuleKind::Explicit,
            origin,
            requires,
            exports,
            packages,
            artifact: artifact.as_ref().to_path_buf(),
            sources: Vec::new(),
        }
    }

    /// 自动模块：不声明依赖，导出全部包
    pub fn automatic(
        name: impl Into<String>,
        artifact: impl AsRef<Path>,
        packages: BTreeSet<String>,
        origin: ModuleOrigin,
    ) -> Self {
        Self {
            name: ModuleRef::Named(name.into()),
            kind: ModuleKind::Automatic,
            origin,
            requires: Vec::new(),
            exports: Vec::new(),
            packages,
            artifact: artifact.as_ref().to_path_buf(),
            sources: Vec::new(),
        }
    }

    /// 类路径构成的无名模块
    pub fn unnamed(artifact: impl AsRef<Path>, packages: BTreeSet<String>) -> Self {
        Self {
            name: ModuleRef::Unnamed,
            kind: ModuleKind::Unnamed,
            origin: ModuleOrigin::ClassPath,
            requires: Vec::new(),
            exports: Vec::new(),
            packages,
            artifact: artifact.as_ref().to_path_buf(),
            sources: Vec::new(),
        }
    }

    /// 具名模块的名字
    pub fn module_name(&self) -> Option<&str> {
        self.name.name()
    }

    pub fn is_automatic(&self) -> bool {
        self.kind == ModuleKind::Automatic
    }

    pub fn contains(&self, package: &str) -> bool {
        self.packages.contains(package)
    }

    /// 是否向 `reader` 导出 `package`
    ///
    /// 自动模块与无名模块导出所含的全部包。
    pub fn exports_to(&self, package: &str, reader: &ModuleRef) -> bool {
        match self.kind {
            ModuleKind::Automatic | ModuleKind::Unnamed => self.contains(package),
            ModuleKind::Explicit => self.exports.iter().any(|export| {
                export.package == package
                    && (!export.is_qualified()
                        || reader.name().is_some_and(|name| export.targets.contains(name)))
            }),
        }
    }

    /// 导出的包（自动模块为全部包）
    pub fn exported_packages(&self) -> Vec<String> {
        match self.kind {
            ModuleKind::Automatic | ModuleKind::Unnamed => self.packages.iter().cloned().collect(),
            ModuleKind::Explicit => self.exports.iter().map(|e| e.package.clone()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_descriptor;

    fn packages(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_explicit_from_declaration() {
        let decl = parse_descriptor(
            "module m1 { requires public automatic; requires static m3; exports p; exports q to m2; }",
        )
        .unwrap();
        let module = ModuleDescriptor::explicit(
            &decl,
            Some(Path::new("/src/m1/module-info.java")),
            "/src/m1",
            packages(&["p", "q", "r"]),
            ModuleOrigin::Source,
        );

        assert_eq!(module.module_name(), Some("m1"));
        assert!(module.requires[0].transitive);
        assert!(module.requires[1].is_static);
        let location = module.requires[0].location.as_ref().unwrap();
        assert_eq!(location.file_name(), "module-info.java");

        let m2 = ModuleRef::named("m2");
        let m4 = ModuleRef::named("m4");
        assert!(module.exports_to("p", &m4));
        assert!(module.exports_to("q", &m2));
        assert!(!module.exports_to("q", &m4));
        assert!(!module.exports_to("q", &ModuleRef::Unnamed));
        assert!(!module.exports_to("r", &m2));
    }

    #[test]
    fn test_duplicate_export_is_rejected() {
        assert!(parse_descriptor("module m { exports p to a; exports p to b; }").is_err());
    }

    #[test]
    fn test_automatic_exports_everything() {
        let module = ModuleDescriptor::automatic(
            "test.api",
            "/mp/test-api-1.0.jar",
            packages(&["api", "api.impl"]),
            ModuleOrigin::ModulePath,
        );
        assert!(module.requires.is_empty());
        assert!(module.exports_to("api.impl", &ModuleRef::named("m1")));
        assert!(!module.exports_to("other", &ModuleRef::named("m1")));
        assert_eq!(module.exported_packages(), vec!["api", "api.impl"]);
    }

    #[test]
    fn test_unnamed_sorts_last() {
        let mut refs = vec![ModuleRef::Unnamed, ModuleRef::named("z"), ModuleRef::named("a")];
        refs.sort();
        assert_eq!(refs, vec![ModuleRef::named("a"), ModuleRef::named("z"), ModuleRef::Unnamed]);
        assert_eq!(ModuleRef::Unnamed.to_string(), "<unnamed>");
    }
}
