//! 测试辅助工具
//!
//! 在内存文件系统中搭建模块路径、源码路径和类路径

#![allow(dead_code)]

use modgraph_core::artifact::archive::ArchiveWriter;
use modgraph_core::{compile, CompileOutcome, ResolverConfig, RootSelection};
use modgraph_vfs::MemoryFileSystem;
use std::path::PathBuf;

pub const MODULE_PATH: &str = "/module-path";
pub const MODULE_SRC: &str = "/module-src";
pub const SYSTEM: &str = "/jdk";

/// 打包一个 jar：条目名 → 内容
pub fn jar(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ArchiveWriter::new();
    for (name, content) in entries {
        writer.add(name, content.as_bytes());
    }
    writer.finish()
}

/// 只含类文件的 jar（自动模块）
pub fn class_jar(classes: &[&str]) -> Vec<u8> {
    let entries: Vec<(&str, &str)> = classes.iter().map(|c| (*c, "")).collect();
    jar(&entries)
}

/// 测试场景
#[derive(Default)]
pub struct Scenario {
    files: Vec<(String, Vec<u8>)>,
    pub config: ResolverConfig,
}

impl Scenario {
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            config: ResolverConfig {
                module_path: vec![PathBuf::from(MODULE_PATH)],
                module_source_path: vec![PathBuf::from(MODULE_SRC)],
                ..ResolverConfig::default()
            },
        }
    }

    pub fn file(mut self, path: &str, content: impl Into<Vec<u8>>) -> Self {
        self.files.push((path.to_string(), content.into()));
        self
    }

    /// 模块路径上的归档
    pub fn module_jar(self, file_name: &str, content: Vec<u8>) -> Self {
        let path = format!("{MODULE_PATH}/{file_name}");
        self.file(&path, content)
    }

    /// 源码模块：描述符加若干 `(相对路径, 源码)`
    pub fn source_module(mut self, name: &str, descriptor: &str, sources: &[(&str, &str)]) -> Self {
        self = self.file(&format!("{MODULE_SRC}/{name}/module-info.java"), descriptor);
        for (path, text) in sources {
            self = self.file(&format!("{MODULE_SRC}/{name}/{path}"), *text);
        }
        self
    }

    /// 系统路径上的展开模块
    pub fn system_module(mut self, name: &str, descriptor: &str, classes: &[&str]) -> Self {
        if !self.config.system_path.contains(&PathBuf::from(SYSTEM)) {
            self.config.system_path.push(PathBuf::from(SYSTEM));
        }
        self = self.file(&format!("{SYSTEM}/{name}/module-info.java"), descriptor);
        for class in classes {
            self = self.file(&format!("{SYSTEM}/{name}/{class}"), Vec::new());
        }
        self
    }

    pub fn class_path(mut self, path: &str) -> Self {
        self.config.class_path.push(PathBuf::from(path));
        self
    }

    pub fn add_modules(mut self, names: &[&str]) -> Self {
        self.config.roots = RootSelection::Modules(names.iter().map(|n| n.to_string()).collect());
        self
    }

    pub fn resolve_all_automatic(mut self, enabled: bool) -> Self {
        self.config.automatic.resolve_all = enabled;
        self
    }

    pub fn fs(&self) -> MemoryFileSystem {
        MemoryFileSystem::with_files(self.files.iter().cloned())
    }

    pub fn compile(&self) -> CompileOutcome {
        compile(&self.config, &self.fs())
    }
}

/// 原始格式输出行
pub fn raw_lines(outcome: &CompileOutcome) -> Vec<String> {
    outcome.log.lines()
}
