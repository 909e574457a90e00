//! 模块索引
//!
//! 把模块图整理成按名字排序的摘要列表，可直接序列化为 JSON。

use crate::graph::ModuleGraph;
use crate::module::{ModuleKind, ModuleRef};
use serde::Serialize;

/// 单个模块的摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleSummary {
    pub name: ModuleRef,
    pub kind: ModuleKind,
    pub artifact: String,
    pub requires: Vec<RequiresSummary>,
    pub exports: Vec<ExportSummary>,
    pub reads: Vec<ModuleRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequiresSummary {
    pub module: String,
    pub transitive: bool,
    #[serde(rename = "static")]
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub package: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub to: Vec<String>,
}

/// 生成模块索引
pub fn summarize(graph: &ModuleGraph) -> Vec<ModuleSummary> {
    graph
        .modules()
        .map(|module| {
            let exports = match module.kind {
                ModuleKind::Explicit => module
                    .exports
                    .iter()
                    .map(|e| ExportSummary {
                        package: e.package.clone(),
                        to: e.targets.iter().cloned().collect(),
                    })
                    .collect(),
                ModuleKind::Automatic | ModuleKind::Unnamed => module
                    .exported_packages()
                    .into_iter()
                    .map(|package| ExportSummary {
                        package,
                        to: Vec::new(),
                    })
                    .collect(),
            };
            ModuleSummary {
                name: module.name.clone(),
                kind: module.kind,
                artifact: module.artifact.display().to_string(),
                requires: module
                    .requires
                    .iter()
                    .map(|r| RequiresSummary {
                        module: r.module.clone(),
                        transitive: r.transitive,
                        is_static: r.is_static,
                    })
                    .collect(),
                exports,
                reads: graph
                    .reads(&module.name)
                    .map(|set| set.iter().cloned().collect())
                    .unwrap_or_default(),
            }
        })
        .collect()
}

/// JSON 形式的模块索引
pub fn to_json(graph: &ModuleGraph) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&summarize(graph))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{ModuleDescriptor, ModuleOrigin};
    use crate::syntax::parse_descriptor;

    fn graph() -> ModuleGraph {
        let decl = parse_descriptor("module m1 { requires transitive api; exports p to m2; }").unwrap();
        let mut graph = ModuleGraph::new();
        graph.add_module(ModuleDescriptor::explicit(
            &decl,
            None,
            "/src/m1",
            ["p".to_string()].into(),
            ModuleOrigin::Source,
        ));
        graph.add_module(ModuleDescriptor::automatic(
            "api",
            "/mp/api-1.0.jar",
            ["api".to_string()].into(),
            ModuleOrigin::ModulePath,
        ));
        graph.add_read(&ModuleRef::named("m1"), ModuleRef::named("api"));
        graph
    }

    #[test]
    fn test_summaries_sorted_by_name() {
        let summaries = summarize(&graph());
        let names: Vec<String> = summaries.iter().map(|s| s.name.to_string()).collect();
        assert_eq!(names, vec!["api", "m1"]);

        let m1 = &summaries[1];
        assert_eq!(m1.reads, vec![ModuleRef::named("api"), ModuleRef::named("m1")]);
        assert_eq!(m1.exports[0].to, vec!["m2".to_string()]);
        assert!(m1.requires[0].transitive);
    }

    #[test]
    fn test_json_shape() {
        let value: serde_json::Value = serde_json::from_str(&to_json(&graph()).unwrap()).unwrap();
        assert_eq!(value[0]["name"], "api");
        assert_eq!(value[0]["kind"], "automatic");
        assert_eq!(value[0]["exports"][0]["package"], "api");
        assert!(value[0]["exports"][0].get("to").is_none());
        assert_eq!(value[1]["requires"][0]["static"], false);
    }
}
