//! 可读性解析
//!
//! # 解析规则
//! - 根模块：正在编译的模块，加上 `RootSelection` 选中的模块
//! - 按声明顺序广度优先展开 `requires`
//! - 开启 `automatic.resolve_all` 时，解析到任一自动模块即解析全部可观察自动模块
//!
//! # 可读性
//! - 每个模块可读自身
//! - `M requires N`：M 可读 N 以及 N 隐含的全部模块
//! - N 隐含的模块：沿 `requires transitive` 的闭包；N 为自动模块时，
//!   为图中其它全部自动模块和无名模块
//! - 自动模块和无名模块可读图中全部模块

use crate::error::ResolveError;
use crate::finder::ObservableModules;
use crate::graph::ModuleGraph;
use crate::module::{ModuleDescriptor, ModuleRef};
use modgraph_config::{ResolverConfig, RootSelection};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tracing::{debug, info};

/// 可读性解析器
pub struct Resolver<'a> {
    observable: &'a ObservableModules,
    config: &'a ResolverConfig,
}

impl<'a> Resolver<'a> {
    pub fn new(observable: &'a ObservableModules, config: &'a ResolverConfig) -> Self {
        Self { observable, config }
    }

    /// 解析出完整的模块图
    pub fn resolve(&self) -> Result<ModuleGraph, ResolveError> {
        let selected = self.select()?;

        let mut graph = ModuleGraph::new();
        for module in selected {
            graph.add_module(module.clone());
        }
        if let Some(unnamed) = self.observable.unnamed() {
            graph.add_module(unnamed.clone());
        }
        self.compute_reads(&mut graph);

        info!(
            target: "modgraph::resolve",
            modules = graph.len(),
            "module graph resolved"
        );
        Ok(graph)
    }

    /// 根模块
    fn roots(&self) -> Result<Vec<&'a ModuleDescriptor>, ResolveError> {
        let mut names: Vec<String> = self.observable.compiled().to_vec();
        names.extend(self.config.added_modules().iter().cloned());
        if self.config.roots == RootSelection::AllModulePath {
            names.extend(self.observable.module_path_names());
        }

        names
            .into_iter()
            .map(|name| {
                self.observable
                    .get(&name)
                    .ok_or(ResolveError::MissingModule {
                        name,
                        location: None,
                    })
            })
            .collect()
    }

    /// 按广度优先选出参与解析的模块
    fn select(&self) -> Result<Vec<&'a ModuleDescriptor>, ResolveError> {
        let mut queue: VecDeque<&'a ModuleDescriptor> = self.roots()?.into();
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        let mut selected = Vec::new();
        let mut automatic_expanded = false;

        while let Some(module) = queue.pop_front() {
            let Some(name) = module.module_name() else {
                continue;
            };
            if !seen.insert(name) {
                continue;
            }
            debug!(target: "modgraph::resolve", module = name, "resolving");
            selected.push(module);

            for requires in &module.requires {
                let target = self.observable.get(&requires.module).ok_or_else(|| {
                    ResolveError::MissingModule {
                        name: requires.module.clone(),
                        location: requires.location.clone(),
                    }
                })?;
                queue.push_back(target);
            }

            if module.is_automatic() && self.config.automatic.resolve_all && !automatic_expanded {
                automatic_expanded = true;
                for other in self.observable.iter().filter(|m| m.is_automatic()) {
                    queue.push_back(other);
                }
            }
        }
        Ok(selected)
    }

    fn compute_reads(&self, graph: &mut ModuleGraph) {
        let everyone: Vec<ModuleRef> = graph.ids().cloned().collect();
        let automatic: BTreeSet<ModuleRef> = graph
            .modules()
            .filter(|m| m.is_automatic())
            .map(|m| m.name.clone())
            .chain(graph.contains(&ModuleRef::Unnamed).then_some(ModuleRef::Unnamed))
            .collect();

        let mut edges: BTreeMap<ModuleRef, BTreeSet<ModuleRef>> = BTreeMap::new();
        for module in graph.modules() {
            let reads = edges.entry(module.name.clone()).or_default();
            if module.is_automatic() || module.name == ModuleRef::Unnamed {
                reads.extend(everyone.iter().cloned());
                continue;
            }
            for requires in &module.requires {
                reads.insert(ModuleRef::named(&requires.module));
                reads.extend(implied(graph, &requires.module, &automatic));
            }
        }

        for (from, targets) in edges {
            for to in targets {
                debug!(target: "modgraph::resolve", from = %from, to = %to, "reads");
                graph.add_read(&from, to);
            }
        }
    }
}

/// 依赖 `name` 时隐含可读的模块
fn implied(graph: &ModuleGraph, name: &str, automatic: &BTreeSet<ModuleRef>) -> BTreeSet<ModuleRef> {
    let mut out = BTreeSet::new();
    let mut seen = BTreeSet::new();
    let mut stack = vec![name.to_string()];

    while let Some(current) = stack.pop() {
        if !seen.insert(current.clone()) {
            continue;
        }
        let Some(module) = graph.get_named(&current) else {
            continue;
        };
        if module.is_automatic() {
            out.extend(automatic.iter().cloned());
        }
        for requires in module.requires.iter().filter(|r| r.transitive) {
            out.insert(ModuleRef::named(&requires.module));
            stack.push(requires.module.clone());
        }
    }
    out
}

/// 解析可观察模块集合
pub fn resolve(
    observable: &ObservableModules,
    config: &ResolverConfig,
) -> Result<ModuleGraph, ResolveError> {
    Resolver::new(observable, config).resolve()
}
