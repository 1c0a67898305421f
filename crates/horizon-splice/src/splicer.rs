//! The engine as seen by a host pipeline.
//!
//! A host drives a [`Splicer`] through three hooks:
//!
//! 1. [`once`](Splicer::once) before any node is visited: loads the
//!    definitions on first use and records their dependencies
//! 2. [`resolve`](Splicer::resolve) (or [`resolve_node`](Splicer::resolve_node)
//!    per invocation) while walking the document
//! 3. [`once_exit`](Splicer::once_exit) after the document is done: writes
//!    the variables artifact when configured
//!
//! [`process`](Splicer::process) runs all three over one stylesheet.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use horizon_splice_core::logging::targets;
use horizon_splice_core::{parse_css, Document, NodeId};

use crate::config::SpliceConfig;
use crate::export::export_variables;
use crate::generator::GeneratorTable;
use crate::graph::{DependencyGraph, DependencyMessage};
use crate::loader::ModuleLoader;
use crate::module_path::absolutize;
use crate::registry::{DefinitionRegistry, ScopeTable};
use crate::resolve::Resolver;
use crate::Result;

/// Output of [`Splicer::process`].
#[derive(Debug, Clone)]
pub struct Processed {
    /// The expanded stylesheet
    pub css: String,
    /// Dependencies recorded during the run
    pub graph: DependencyGraph,
}

impl Processed {
    /// Host records for the recorded dependencies.
    pub fn messages(&self) -> Vec<DependencyMessage> {
        self.graph.messages()
    }
}

/// Style or mixin expansion engine.
#[derive(Debug, Clone)]
pub struct Splicer {
    config: SpliceConfig,
    generators: GeneratorTable,
    table: Option<Arc<ScopeTable>>,
}

impl Splicer {
    /// Create an engine for `config`.
    pub fn new(config: SpliceConfig) -> Self {
        Self {
            config,
            generators: GeneratorTable::new(),
            table: None,
        }
    }

    /// Make `generators` available to `generator(...)` exports.
    pub fn with_generators(mut self, generators: GeneratorTable) -> Self {
        self.generators = generators;
        self
    }

    /// The configuration.
    pub fn config(&self) -> &SpliceConfig {
        &self.config
    }

    /// The loaded definitions, once [`once`](Self::once) has run.
    pub fn table(&self) -> Option<&ScopeTable> {
        self.table.as_deref()
    }

    /// Load definitions on first call and record their dependencies into
    /// `graph`.
    pub fn once(&mut self, graph: &mut DependencyGraph) -> Result<()> {
        let root = self.config.root_dir();
        let table = match &self.table {
            Some(table) => Arc::clone(table),
            None => {
                let mut table = ScopeTable::new();
                self.registry(&root).load(&mut table)?;
                let table = Arc::new(table);
                self.table = Some(Arc::clone(&table));
                table
            }
        };

        let parent = self.config.parent_file.as_ref().map(|p| absolutize(&root, p));
        graph.record(&table, parent.as_deref());
        Ok(())
    }

    /// Expand every invocation in `doc`.
    pub fn resolve(&self, doc: &mut Document) -> Result<usize> {
        self.resolver(|resolver| resolver.resolve(doc))
    }

    /// Expand one invocation node.
    pub fn resolve_node(&self, doc: &mut Document, node: NodeId) -> Result<usize> {
        self.resolver(|resolver| resolver.resolve_node(doc, node))
    }

    /// Write the variables artifact when `export_artifact_to` is set.
    pub fn once_exit(&self) -> Result<Option<PathBuf>> {
        let Some(target) = &self.config.export_artifact_to else {
            return Ok(None);
        };
        let target = absolutize(&self.config.root_dir(), target);
        let empty = ScopeTable::new();
        export_variables(self.table().unwrap_or(&empty), &target)?;
        Ok(Some(target))
    }

    /// Run all three hooks over one stylesheet.
    pub fn process(&mut self, css: &str, from: Option<&Path>) -> Result<Processed> {
        let mut graph = DependencyGraph::new();
        self.once(&mut graph)?;

        let mut doc = parse_css(css, from)?;
        let expanded = self.resolve(&mut doc)?;
        self.once_exit()?;

        tracing::info!(
            target: targets::RESOLVE,
            "Processed {}: {expanded} {} invocations, {} dependencies",
            from.map(|p| p.display().to_string()).unwrap_or_else(|| "<input>".into()),
            self.config.kind.noun(),
            graph.len()
        );

        Ok(Processed {
            css: doc.to_css(),
            graph,
        })
    }

    fn registry(&self, root: &Path) -> DefinitionRegistry {
        let loader = ModuleLoader::new(self.config.kind)
            .with_generators(self.generators.clone())
            .with_cache_dir(self.config.cache_dir.as_ref().map(|dir| absolutize(root, dir)));
        DefinitionRegistry::new(loader, root)
            .with_search_paths(self.config.search_paths.clone())
            .with_explicit_files(self.config.explicit_files.clone())
            .with_typedefs(self.config.emit_typedefs)
    }

    fn resolver<T>(&self, f: impl FnOnce(Resolver<'_>) -> T) -> T {
        let empty = ScopeTable::new();
        let table = self.table().unwrap_or(&empty);
        let root = self.config.root_dir();
        f(Resolver::new(table, self.config.kind)
            .with_silent(self.config.silent)
            .with_root(&root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn process_without_definitions_is_identity() {
        let dir = tempdir().unwrap();
        let mut splicer = Splicer::new(SpliceConfig::new().with_root(dir.path()));

        let out = splicer.process(".a { color: red; }", None).unwrap();
        assert_eq!(out.css, ".a {\n  color: red;\n}\n");
        assert!(out.graph.is_empty());
    }

    #[test]
    fn once_loads_a_single_time() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.style.json"), r#"{ "styles": {} }"#).unwrap();
        let mut splicer = Splicer::new(SpliceConfig::new().with_root(dir.path()));

        let mut graph = DependencyGraph::new();
        splicer.once(&mut graph).unwrap();
        let first = splicer.table.clone().unwrap();

        fs::write(dir.path().join("b.style.json"), r#"{ "styles": {} }"#).unwrap();
        splicer.once(&mut graph).unwrap();
        assert!(Arc::ptr_eq(&first, splicer.table.as_ref().unwrap()));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn resolve_node_expands_one_invocation() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("styles")).unwrap();
        fs::write(
            dir.path().join("styles/outer.style.json"),
            r#"{ "styles": { ".o": { "@styles inner": true } } }"#,
        )
        .unwrap();
        fs::write(dir.path().join("styles/inner.style.json"), r#"{ "styles": { "color": "red" } }"#)
            .unwrap();

        let config = SpliceConfig::new()
            .with_root(dir.path())
            .with_search_path("styles")
            .with_typedefs(false);
        let mut splicer = Splicer::new(config);
        splicer.once(&mut DependencyGraph::new()).unwrap();

        let mut doc = parse_css("@styles outer;\n.keep { @styles inner; }", None).unwrap();
        let node = doc.at_rules_named(doc.root(), "styles")[0];

        assert_eq!(splicer.resolve_node(&mut doc, node).unwrap(), 2);
        assert_eq!(
            doc.to_css(),
            ".o {\n  color: red;\n}\n.keep {\n  @styles inner;\n}\n"
        );

        assert_eq!(splicer.resolve_node(&mut doc, node).unwrap(), 0);
    }

    #[test]
    fn once_exit_without_target_does_nothing() {
        let splicer = Splicer::new(SpliceConfig::new());
        assert_eq!(splicer.once_exit().unwrap(), None);
    }
}
