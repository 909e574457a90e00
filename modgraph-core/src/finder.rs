//! 模块查找
//!
//! 依次扫描系统路径、模块路径和模块源码路径，得到可观察模块集合。
//! 任意两个可观察模块同名即失败，不做遮蔽。

use crate::artifact::{is_archive, Artifact, DESCRIPTOR_CLASS, DESCRIPTOR_SOURCE};
use crate::diagnostic::SourceLocation;
use crate::error::ResolveError;
use crate::module::{AutomaticNaming, ModuleDescriptor, ModuleOrigin, NamingError};
use crate::syntax::{is_identifier, parse_descriptor};
use modgraph_config::ResolverConfig;
use modgraph_vfs::VirtualFileSystem;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const SOURCE_EXTENSION: &str = "java";

/// 可观察模块集合
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservableModules {
    modules: BTreeMap<String, ModuleDescriptor>,
    /// 正在编译的模块，按扫描顺序
    compiled: Vec<String>,
    unnamed: Option<ModuleDescriptor>,
}

impl ObservableModules {
    pub fn get(&self, name: &str) -> Option<&ModuleDescriptor> {
        self.modules.get(name)
    }

    /// 按名字排序的具名模块
    pub fn iter(&self) -> impl Iterator<Item = &ModuleDescriptor> {
        self.modules.values()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// 正在编译的模块名
    pub fn compiled(&self) -> &[String] {
        &self.compiled
    }

    /// 模块路径上的模块名，按名字排序
    pub fn module_path_names(&self) -> Vec<String> {
        self.modules
            .values()
            .filter(|m| m.origin == ModuleOrigin::ModulePath)
            .filter_map(|m| m.module_name().map(str::to_string))
            .collect()
    }

    pub fn unnamed(&self) -> Option<&ModuleDescriptor> {
        self.unnamed.as_ref()
    }

    fn insert(&mut self, module: ModuleDescriptor) -> Result<(), ResolveError> {
        let Some(name) = module.module_name().map(str::to_string) else {
            return Ok(());
        };
        if let Some(existing) = self.modules.get(&name) {
            return Err(ResolveError::NameConflict {
                name,
                first: existing.artifact.clone(),
                second: module.artifact.clone(),
            });
        }
        if module.origin == ModuleOrigin::Source {
            self.compiled.push(name.clone());
        }
        self.modules.insert(name, module);
        Ok(())
    }
}

/// 模块查找器
pub struct ModuleFinder<'a> {
    vfs: &'a dyn VirtualFileSystem,
    naming: &'a dyn AutomaticNaming,
}

impl<'a> ModuleFinder<'a> {
    pub fn new(vfs: &'a dyn VirtualFileSystem, naming: &'a dyn AutomaticNaming) -> Self {
        Self { vfs, naming }
    }

    /// 构建可观察模块集合
    pub fn find_all(&self, config: &ResolverConfig) -> Result<ObservableModules, ResolveError> {
        let mut observable = ObservableModules::default();

        for entry in &config.system_path {
            for module in self.scan_entry(entry, ModuleOrigin::System)? {
                observable.insert(module)?;
            }
        }
        for entry in &config.module_path {
            for module in self.scan_entry(entry, ModuleOrigin::ModulePath)? {
                observable.insert(module)?;
            }
        }
        for dir in &config.module_source_path {
            for module in self.source_modules(dir)? {
                observable.insert(module)?;
            }
        }
        observable.unnamed = self.class_path(&config.class_path)?;

        info!(
            target: "modgraph::scan",
            observable = observable.len(),
            compiled = observable.compiled.len(),
            "module path scanned"
        );
        Ok(observable)
    }

    /// 模块路径条目：带描述符（文本或编译后）的目录是一个展开模块，否则扫描其子项
    fn scan_entry(
        &self,
        entry: &Path,
        origin: ModuleOrigin,
    ) -> Result<Vec<ModuleDescriptor>, ResolveError> {
        if !self.vfs.exists(entry) {
            warn!(target: "modgraph::scan", entry = %entry.display(), "module path entry does not exist");
            return Ok(Vec::new());
        }
        if !self.vfs.is_dir(entry) || self.is_exploded_module(entry) {
            return Ok(vec![self.module_from(entry, origin)?]);
        }

        let children = self
            .vfs
            .read_dir(entry)
            .map_err(|e| ResolveError::io(entry, e))?;
        let mut modules = Vec::new();
        for child in children {
            if self.vfs.is_dir(&child) || is_archive(&child) {
                modules.push(self.module_from(&child, origin)?);
            } else {
                debug!(target: "modgraph::scan", file = %child.display(), "skipping non-module file");
            }
        }
        Ok(modules)
    }

    fn is_exploded_module(&self, dir: &Path) -> bool {
        [DESCRIPTOR_SOURCE, DESCRIPTOR_CLASS]
            .iter()
            .any(|name| self.vfs.is_file(&dir.join(name)))
    }

    fn module_from(&self, path: &Path, origin: ModuleOrigin) -> Result<ModuleDescriptor, ResolveError> {
        let artifact = Artifact::open(self.vfs, path)?;

        let module = match &artifact.descriptor {
            Some(source) => {
                let declaration = parse_descriptor(&source.text).map_err(|e| {
                    ResolveError::MalformedDescriptor {
                        path: source.path.clone(),
                        message: e.message.clone(),
                        location: Some(SourceLocation::new(&source.path, e.position)),
                    }
                })?;
                ModuleDescriptor::explicit(
                    &declaration,
                    Some(source.path.as_path()),
                    &artifact.path,
                    artifact.packages.clone(),
                    origin,
                )
            }
            None => {
                let name = self
                    .naming
                    .derive_name(&artifact.file_name())
                    .map_err(|e| naming_error(&artifact.path, e))?;
                ModuleDescriptor::automatic(name, &artifact.path, artifact.packages.clone(), origin)
            }
        };

        debug!(
            target: "modgraph::scan",
            module = %module.name,
            kind = module.kind.as_str(),
            artifact = %artifact.path.display(),
            "found module"
        );
        Ok(module)
    }

    /// 模块源码路径：`<dir>/<name>/module-info.java`
    fn source_modules(&self, dir: &Path) -> Result<Vec<ModuleDescriptor>, ResolveError> {
        if !self.vfs.is_dir(dir) {
            warn!(target: "modgraph::scan", dir = %dir.display(), "module source path entry is not a directory");
            return Ok(Vec::new());
        }

        let mut modules = Vec::new();
        for root in self.vfs.read_dir(dir).map_err(|e| ResolveError::io(dir, e))? {
            let descriptor = root.join(DESCRIPTOR_SOURCE);
            if !self.vfs.is_file(&descriptor) {
                continue;
            }
            modules.push(self.source_module(&root, &descriptor)?);
        }
        Ok(modules)
    }

    fn source_module(&self, root: &Path, descriptor: &Path) -> Result<ModuleDescriptor, ResolveError> {
        let bytes = self
            .vfs
            .read_file(descriptor)
            .map_err(|e| ResolveError::io(descriptor, e))?;
        let text = String::from_utf8(bytes)
            .map_err(|e| ResolveError::io(descriptor, format!("invalid UTF-8: {e}")))?;
        let declaration = parse_descriptor(&text).map_err(|e| ResolveError::MalformedDescriptor {
            path: descriptor.to_path_buf(),
            message: e.message.clone(),
            location: Some(SourceLocation::new(descriptor, e.position)),
        })?;

        let expected = root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        if declaration.name != expected {
            return Err(ResolveError::ModuleNameMismatch {
                declared: declaration.name.clone(),
                expected,
                location: Some(SourceLocation::new(descriptor, declaration.name_position)),
            });
        }

        let mut sources = Vec::new();
        self.collect_sources(root, &mut sources)?;
        sources.retain(|path| path.as_path() != descriptor);
        sources.sort();

        let packages: BTreeSet<String> = sources
            .iter()
            .filter_map(|source| source_package(root, source))
            .collect();

        let mut module = ModuleDescriptor::explicit(
            &declaration,
            Some(descriptor),
            root,
            packages,
            ModuleOrigin::Source,
        );
        module.sources = sources;
        Ok(module)
    }

    fn collect_sources(&self, dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), ResolveError> {
        for child in self.vfs.read_dir(dir).map_err(|e| ResolveError::io(dir, e))? {
            if self.vfs.is_dir(&child) {
                self.collect_sources(&child, out)?;
            } else if child.extension().is_some_and(|ext| ext == SOURCE_EXTENSION) {
                out.push(child);
            }
        }
        Ok(())
    }

    /// 类路径上所有条目的包合并为无名模块
    fn class_path(&self, entries: &[PathBuf]) -> Result<Option<ModuleDescriptor>, ResolveError> {
        let Some(first) = entries.first() else {
            return Ok(None);
        };
        let mut packages = BTreeSet::new();
        for entry in entries {
            if !self.vfs.exists(entry) {
                warn!(target: "modgraph::scan", entry = %entry.display(), "class path entry does not exist");
                continue;
            }
            packages.extend(Artifact::open(self.vfs, entry)?.packages);
        }
        Ok(Some(ModuleDescriptor::unnamed(first, packages)))
    }
}

/// 源文件所在目录对应的包，根目录下的文件属于无名包
fn source_package(root: &Path, source: &Path) -> Option<String> {
    let dir = source.parent()?.strip_prefix(root).ok()?;
    let segments: Vec<String> = dir
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if segments.is_empty() || !segments.iter().all(|s| is_identifier(s)) {
        return None;
    }
    Some(segments.join("."))
}

fn naming_error(path: &Path, error: NamingError) -> ResolveError {
    match error {
        NamingError::InvalidName { reason, .. } => ResolveError::InvalidAutomaticName {
            path: path.to_path_buf(),
            reason,
        },
        NamingError::InvalidPattern { pattern, .. } => ResolveError::InvalidOption {
            option: "version-pattern".to_string(),
            value: pattern,
        },
    }
}
