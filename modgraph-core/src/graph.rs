//! 模块图
//!
//! 解析完成后的只读结果：参与解析的模块和每个模块可读的模块集合。
//! 全部使用有序容器，同样的输入总是得到相等（`==`）的图。

use crate::module::{ModuleDescriptor, ModuleOrigin, ModuleRef};
use std::collections::{BTreeMap, BTreeSet};

/// 解析后的模块图
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleGraph {
    modules: BTreeMap<ModuleRef, ModuleDescriptor>,
    reads: BTreeMap<ModuleRef, BTreeSet<ModuleRef>>,
}

impl ModuleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入模块，模块总是可读自身
    pub fn add_module(&mut self, module: ModuleDescriptor) {
        let id = module.name.clone();
        self.reads.entry(id.clone()).or_default().insert(id.clone());
        self.modules.insert(id, module);
    }

    /// 记录 `from` 可读 `to`
    pub fn add_read(&mut self, from: &ModuleRef, to: ModuleRef) {
        self.reads.entry(from.clone()).or_default().insert(to);
    }

    pub fn get(&self, id: &ModuleRef) -> Option<&ModuleDescriptor> {
        self.modules.get(id)
    }

    pub fn get_named(&self, name: &str) -> Option<&ModuleDescriptor> {
        self.modules.get(&ModuleRef::named(name))
    }

    pub fn contains(&self, id: &ModuleRef) -> bool {
        self.modules.contains_key(id)
    }

    /// 按标识排序的全部模块，无名模块在最后
    pub fn modules(&self) -> impl Iterator<Item = &ModuleDescriptor> {
        self.modules.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &ModuleRef> {
        self.modules.keys()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// `id` 可读的模块
    pub fn reads(&self, id: &ModuleRef) -> Option<&BTreeSet<ModuleRef>> {
        self.reads.get(id)
    }

    pub fn can_read(&self, from: &ModuleRef, to: &ModuleRef) -> bool {
        self.reads.get(from).is_some_and(|set| set.contains(to))
    }

    /// 正在编译的模块
    pub fn compiled(&self) -> impl Iterator<Item = &ModuleDescriptor> {
        self.modules
            .values()
            .filter(|m| m.origin == ModuleOrigin::Source)
    }

    /// 包含 `package` 的模块：具名模块按名字排序，无名模块在最后
    pub fn candidates(&self, package: &str) -> Vec<&ModuleDescriptor> {
        self.modules.values().filter(|m| m.contains(package)).collect()
    }
}
