//! Dependency graph recording.
//!
//! Every loaded definition contributes its own file and the files it pulled
//! in while bundling. The host's incremental rebuild consumes the recorded
//! edges; nothing here decides when to rebuild.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use horizon_splice_core::logging::targets;

use crate::registry::ScopeTable;

/// Plugin name carried on every dependency message.
pub const PLUGIN_NAME: &str = "horizon-splice";

/// A recorded `(file, parent)` relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEdge {
    /// The file a rebuild depends on
    pub file: PathBuf,
    /// The file that pulled it in, if any
    pub parent: Option<PathBuf>,
}

/// Host record for one dependency edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyMessage {
    /// Always `"dependency"`
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Always [`PLUGIN_NAME`]
    pub plugin: &'static str,
    /// Dependent file
    pub file: String,
    /// Parent file, empty when there is none
    pub parent: String,
}

/// Ordered, deduplicated dependency edges for one run.
///
/// At most one edge is recorded per file, so the edges form a forest.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    edges: Vec<DependencyEdge>,
    seen: HashSet<PathBuf>,
}

impl DependencyGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Edges in recording order.
    pub fn edges(&self) -> &[DependencyEdge] {
        &self.edges
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether no edge has been recorded.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Whether `file` already has an edge.
    pub fn contains(&self, file: &Path) -> bool {
        self.seen.contains(file)
    }

    /// Append an edge unless `file` is already recorded. Returns whether the
    /// edge was added.
    pub fn push(&mut self, file: PathBuf, parent: Option<PathBuf>) -> bool {
        if !self.seen.insert(file.clone()) {
            return false;
        }
        self.edges.push(DependencyEdge { file, parent });
        true
    }

    /// Record every definition in `table`, local partition first.
    ///
    /// A definition's own file is chained to the most recently recorded file,
    /// or to `root_parent` for the very first edge. Its dependencies get the
    /// definition's file as parent.
    pub fn record(&mut self, table: &ScopeTable, root_parent: Option<&Path>) {
        let before = self.edges.len();
        for definition in table.recording_order() {
            let parent = self
                .edges
                .last()
                .map(|edge| edge.file.clone())
                .or_else(|| root_parent.map(Path::to_path_buf));
            self.push(definition.source_file.clone(), parent);

            for dependency in &definition.dependencies {
                if !self.contains(dependency) {
                    self.push(dependency.clone(), Some(definition.source_file.clone()));
                }
            }
        }
        tracing::debug!(
            target: targets::GRAPH,
            "Recorded {} dependency edges ({} total)",
            self.edges.len() - before,
            self.edges.len()
        );
    }

    /// Host records for every edge, in order.
    pub fn messages(&self) -> Vec<DependencyMessage> {
        self.edges
            .iter()
            .map(|edge| DependencyMessage {
                kind: "dependency",
                plugin: PLUGIN_NAME,
                file: edge.file.display().to_string(),
                parent: edge
                    .parent
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{Definition, DefinitionValue};
    use std::sync::Arc;

    fn definition(file: &str, deps: &[&str]) -> Arc<Definition> {
        let source_file = PathBuf::from(file);
        let mut dependencies = vec![source_file.clone()];
        dependencies.extend(deps.iter().map(PathBuf::from));
        Arc::new(Definition {
            name: crate::module_path::definition_name(&source_file),
            value: DefinitionValue::Empty,
            dependencies,
            source_file,
            doc: None,
        })
    }

    fn pairs(graph: &DependencyGraph) -> Vec<(String, String)> {
        graph
            .messages()
            .into_iter()
            .map(|m| (m.file, m.parent))
            .collect()
    }

    #[test]
    fn chains_definitions_and_parents_dependencies() {
        let mut table = ScopeTable::new();
        table.insert_global(definition("/g/box.style.css", &[]));
        table.insert_local(definition("/src/a.style.css", &["/src/b.style.css"]));

        let mut graph = DependencyGraph::new();
        graph.record(&table, Some(Path::new("/app.css")));

        assert_eq!(
            pairs(&graph),
            vec![
                ("/src/a.style.css".into(), "/app.css".into()),
                ("/src/b.style.css".into(), "/src/a.style.css".into()),
                ("/g/box.style.css".into(), "/src/b.style.css".into()),
            ]
        );
    }

    #[test]
    fn first_edge_without_parent_is_empty() {
        let mut table = ScopeTable::new();
        table.insert_global(definition("/g/box.style.css", &[]));

        let mut graph = DependencyGraph::new();
        graph.record(&table, None);
        assert_eq!(graph.messages()[0].parent, "");
    }

    #[test]
    fn files_are_recorded_once() {
        let mut table = ScopeTable::new();
        table.insert_local(definition("/src/a.style.css", &["/src/shared.css"]));
        table.insert_local(definition("/src/c.style.css", &["/src/shared.css", "/src/a.style.css"]));

        let mut graph = DependencyGraph::new();
        graph.record(&table, None);
        graph.record(&table, None);

        let mut files: Vec<_> = graph.edges().iter().map(|e| e.file.clone()).collect();
        assert_eq!(files.len(), 3);
        files.dedup();
        assert_eq!(files.len(), 3);
    }

    #[test]
    fn message_shape() {
        let mut graph = DependencyGraph::new();
        graph.push(PathBuf::from("/a.css"), None);

        let json = serde_json::to_value(graph.messages()).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{ "type": "dependency", "plugin": "horizon-splice", "file": "/a.css", "parent": "" }])
        );
    }
}
