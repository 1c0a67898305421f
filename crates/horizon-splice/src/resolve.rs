//! Invocation resolution.
//!
//! The resolver expands every invocation at-rule of one kind in a document.
//! Invocations are gathered into a worklist in document order; the nodes a
//! resolution splices in are scanned for further invocations, which go to
//! the front of the worklist so expansion stays depth-first.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_splice::{Definition, DefinitionValue, InvocationKind, Resolver, ScopeTable, StyleTree};
//! use horizon_splice_core::parse_css;
//!
//! let mut tree = StyleTree::new();
//! tree.insert("color".into(), "red".into());
//!
//! let mut table = ScopeTable::new();
//! table.insert_global(Arc::new(Definition {
//!     name: "box".into(),
//!     value: DefinitionValue::Static(tree),
//!     dependencies: vec![],
//!     source_file: "/defs/box.style.json".into(),
//!     doc: None,
//! }));
//!
//! let mut doc = parse_css(".card { @styles box; }", None)?;
//! Resolver::new(&table, InvocationKind::Styles).resolve(&mut doc)?;
//! assert_eq!(doc.to_css(), ".card {\n  color: red;\n}\n");
//! # Ok::<(), horizon_splice::Error>(())
//! ```

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

use horizon_splice_core::logging::targets;
use horizon_splice_core::{Document, NodeId, NodeKind};

use crate::args::parse_invocation;
use crate::definition::{substitute_tree, Definition, DefinitionValue};
use crate::error::Location;
use crate::generator::InvocationContext;
use crate::kind::InvocationKind;
use crate::module_path::{absolutize, normalize};
use crate::registry::ScopeTable;
use crate::slot::fill_slots;
use crate::value::tree_to_nodes;
use crate::{Error, Result};

/// Maximum number of nested expansions.
pub const MAX_EXPANSION_DEPTH: usize = 64;

/// Expands invocations against a loaded [`ScopeTable`].
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    table: &'a ScopeTable,
    kind: InvocationKind,
    silent: bool,
    root: Option<&'a Path>,
}

impl<'a> Resolver<'a> {
    /// Create a resolver for invocations of `kind`.
    pub fn new(table: &'a ScopeTable, kind: InvocationKind) -> Self {
        Self {
            table,
            kind,
            silent: false,
            root: None,
        }
    }

    /// Resolve relative document paths against `root`.
    pub fn with_root(mut self, root: &'a Path) -> Self {
        self.root = Some(root);
        self
    }

    /// Drop unresolvable invocations instead of failing.
    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Expand every invocation in `doc`. Returns how many were processed.
    pub fn resolve(&self, doc: &mut Document) -> Result<usize> {
        let root = doc.root();
        let worklist = self.invocations_under(doc, root).into_iter().map(|n| (n, 0)).collect();
        self.drain(doc, worklist)
    }

    /// Expand a single invocation node and everything it produces.
    pub fn resolve_node(&self, doc: &mut Document, node: NodeId) -> Result<usize> {
        self.drain(doc, VecDeque::from([(node, 0)]))
    }

    fn drain(&self, doc: &mut Document, mut worklist: VecDeque<(NodeId, usize)>) -> Result<usize> {
        let mut processed = 0;
        while let Some((node, depth)) = worklist.pop_front() {
            if !doc.is_attached(node) {
                continue;
            }
            let produced = self.expand(doc, node, depth)?;
            processed += 1;
            for invocation in produced.into_iter().rev() {
                worklist.push_front((invocation, depth + 1));
            }
        }
        Ok(processed)
    }

    /// Invocation nodes strictly below `id`, in document order.
    fn invocations_under(&self, doc: &Document, id: NodeId) -> Vec<NodeId> {
        doc.at_rules_named(id, self.kind.at_rule())
    }

    /// Invocation nodes among `nodes` and their descendants.
    fn invocations_in(&self, doc: &Document, nodes: &[NodeId]) -> Vec<NodeId> {
        let name = self.kind.at_rule();
        nodes
            .iter()
            .flat_map(|&id| {
                let own = doc[id].kind.is_at_rule_named(name).then_some(id);
                own.into_iter().chain(doc.at_rules_named(id, name))
            })
            .collect()
    }

    /// Expand one invocation in place. Returns invocations found in the
    /// spliced output.
    fn expand(&self, doc: &mut Document, node: NodeId, depth: usize) -> Result<Vec<NodeId>> {
        let NodeKind::AtRule { params, .. } = &doc[node].kind else {
            return Ok(vec![]);
        };
        let invocation = parse_invocation(params);
        let span = doc[node].source.clone();
        let location = Location::from(span.clone());

        if depth > MAX_EXPANSION_DEPTH {
            return Err(Error::ExpansionDepthExceeded {
                name: invocation.name,
                limit: MAX_EXPANSION_DEPTH,
                location,
            });
        }

        let Some(definition) = self.lookup(doc, node, &invocation.name) else {
            if self.silent {
                tracing::warn!(
                    target: targets::RESOLVE,
                    "{location}: dropping undefined {} {}",
                    self.kind.noun(),
                    invocation.name
                );
                doc.remove(node);
                return Ok(vec![]);
            }
            return Err(Error::UndefinedDefinition {
                kind: self.kind.noun(),
                name: invocation.name,
                location,
            });
        };

        let generated = match &definition.value {
            DefinitionValue::Template(template) if self.kind.allows_templates() => {
                let bindings = template.bind(&invocation.args).map_err(|param| Error::MissingArgument {
                    name: invocation.name.clone(),
                    param,
                    location: location.clone(),
                })?;
                let container = doc.create_root();
                for &child in template.nodes() {
                    if let Some(copy) = doc.import(&template.body, child) {
                        doc.append(container, copy);
                    }
                }
                substitute_tree(doc, container, &bindings);
                container
            }
            DefinitionValue::Static(tree) => tree_to_nodes(doc, tree),
            DefinitionValue::Generator(generator) => {
                let nested = self.invocations_under(doc, node);
                self.drain(doc, nested.into_iter().map(|n| (n, depth + 1)).collect())?;

                let context = InvocationContext::new(doc, node, &invocation.name);
                match generator.produce(&context, &invocation.args) {
                    Some(tree) => tree_to_nodes(doc, &tree),
                    None => doc.create_root(),
                }
            }
            other => {
                return Err(Error::InvalidDefinitionType {
                    kind: self.kind.noun(),
                    name: invocation.name,
                    found: other.shape(),
                    location,
                });
            }
        };

        doc.set_source_deep(generated, span);
        fill_slots(doc, generated, node, self.kind.slot());

        let spliced = doc.splice_children_before(node, generated);
        doc.remove(generated);
        doc.remove(node);

        tracing::debug!(
            target: targets::RESOLVE,
            "{location}: expanded {} {} into {} nodes",
            self.kind.noun(),
            invocation.name,
            spliced.len()
        );

        Ok(self.invocations_in(doc, &spliced))
    }

    /// Global by name first, then local by path relative to the invoking
    /// file. Definitions without the designated export count as missing.
    fn lookup(&self, doc: &Document, node: NodeId, name: &str) -> Option<Arc<Definition>> {
        let from_file = doc[node]
            .source
            .as_ref()
            .and_then(|span| span.file())
            .or_else(|| doc.source_file())
            .map(|file| match self.root {
                Some(root) => absolutize(root, file),
                None => normalize(file),
            });
        self.table
            .lookup(name, from_file.as_deref(), self.kind.extensions())
            .filter(|definition| !definition.is_empty())
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::Template;
    use crate::generator::GeneratorTable;
    use crate::value::{StyleTree, StyleValue};
    use horizon_splice_core::parse_css;
    use std::path::PathBuf;

    fn define(table: &mut ScopeTable, name: &str, value: DefinitionValue) {
        table.insert_global(Arc::new(Definition {
            name: name.into(),
            value,
            dependencies: vec![],
            source_file: PathBuf::from(format!("/defs/{name}.css")),
            doc: None,
        }));
    }

    fn template(params: &str, body: &str) -> DefinitionValue {
        let body = parse_css(body, None).unwrap();
        DefinitionValue::Template(Template::new(params, body, "mixin-content"))
    }

    fn static_tree(json: &str) -> DefinitionValue {
        DefinitionValue::Static(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn template_binds_arguments_and_fills_slot() {
        let mut table = ScopeTable::new();
        define(
            &mut table,
            "button",
            template("($size: medium)", ".btn-$size { @mixin-content; }"),
        );

        let mut doc = parse_css("@mixin button(large) { color: blue; }", None).unwrap();
        Resolver::new(&table, InvocationKind::Mixin).resolve(&mut doc).unwrap();
        assert_eq!(doc.to_css(), ".btn-large {\n  color: blue;\n}\n");
    }

    #[test]
    fn template_defaults_fill_missing_arguments() {
        let mut table = ScopeTable::new();
        define(&mut table, "pad", template("(a, b: 2px, c: 3px)", "padding: $a $b $c;"));

        let mut doc = parse_css(".x { @mixin pad 1px; }", None).unwrap();
        Resolver::new(&table, InvocationKind::Mixin).resolve(&mut doc).unwrap();
        assert_eq!(doc.to_css(), ".x {\n  padding: 1px 2px 3px;\n}\n");

        let mut doc = parse_css(".x { @mixin pad; }", None).unwrap();
        let err = Resolver::new(&table, InvocationKind::Mixin).resolve(&mut doc).unwrap_err();
        assert!(matches!(err, Error::MissingArgument { ref param, .. } if param == "a"));
    }

    #[test]
    fn nested_invocations_in_output_are_expanded() {
        let mut table = ScopeTable::new();
        define(&mut table, "inner", static_tree(r#"{ "color": "red" }"#));
        define(&mut table, "outer", template("", ".o { @mixin inner; }"));

        let mut doc = parse_css("@mixin outer;", None).unwrap();
        let processed = Resolver::new(&table, InvocationKind::Mixin).resolve(&mut doc).unwrap();
        assert_eq!(processed, 2);
        assert_eq!(doc.to_css(), ".o {\n  color: red;\n}\n");
    }

    #[test]
    fn generator_sees_expanded_children() {
        let generators = GeneratorTable::new().with(
            "wrap",
            |ctx: &InvocationContext<'_>, args: &[String]| -> Option<StyleTree> {
                let mut body = StyleTree::new();
                let css = ctx.children_css();
                body.insert("content".into(), StyleValue::from(format!("\"{}\"", css.trim())));
                let mut tree = StyleTree::new();
                tree.insert(format!(".{}", args.first()?), StyleValue::Tree(body));
                Some(tree)
            },
        );
        let mut table = ScopeTable::new();
        define(&mut table, "color", static_tree(r#"{ "color": "red" }"#));
        define(
            &mut table,
            "wrap",
            DefinitionValue::Generator(generators.get("wrap").unwrap()),
        );

        let mut doc = parse_css("@styles wrap box { @styles color; }", None).unwrap();
        Resolver::new(&table, InvocationKind::Styles).resolve(&mut doc).unwrap();
        assert_eq!(doc.to_css(), ".box {\n  content: \"color: red;\";\n}\n");
    }

    #[test]
    fn generator_returning_nothing_removes_invocation() {
        let generators = GeneratorTable::new()
            .with("noop", |_: &InvocationContext<'_>, _: &[String]| -> Option<StyleTree> { None });
        let mut table = ScopeTable::new();
        define(&mut table, "noop", DefinitionValue::Generator(generators.get("noop").unwrap()));

        let mut doc = parse_css(".a { @styles noop; color: red; }", None).unwrap();
        Resolver::new(&table, InvocationKind::Styles).resolve(&mut doc).unwrap();
        assert_eq!(doc.to_css(), ".a {\n  color: red;\n}\n");
    }

    #[test]
    fn static_output_fills_every_slot() {
        let mut table = ScopeTable::new();
        define(
            &mut table,
            "wrap",
            static_tree(r#"{ ".w": { "@styles-content": true }, ".v": { "@styles-content": true } }"#),
        );

        let mut doc = parse_css("@styles wrap { color: blue; }", None).unwrap();
        Resolver::new(&table, InvocationKind::Styles).resolve(&mut doc).unwrap();
        assert_eq!(doc.to_css(), ".w {\n  color: blue;\n}\n.v {\n  color: blue;\n}\n");

        let mut doc = parse_css("@styles wrap;", None).unwrap();
        Resolver::new(&table, InvocationKind::Styles).resolve(&mut doc).unwrap();
        assert_eq!(doc.to_css(), ".w {\n}\n.v {\n}\n");
    }

    #[test]
    fn generator_output_fills_slot() {
        let generators = GeneratorTable::new().with(
            "frame",
            |_: &InvocationContext<'_>, _: &[String]| -> Option<StyleTree> {
                let mut body = StyleTree::new();
                body.insert("@styles-content".into(), StyleValue::Flag(true));
                let mut tree = StyleTree::new();
                tree.insert(".g".into(), StyleValue::Tree(body));
                Some(tree)
            },
        );
        let mut table = ScopeTable::new();
        define(&mut table, "frame", DefinitionValue::Generator(generators.get("frame").unwrap()));

        let mut doc = parse_css("@styles frame { color: blue; }", None).unwrap();
        Resolver::new(&table, InvocationKind::Styles).resolve(&mut doc).unwrap();
        assert_eq!(doc.to_css(), ".g {\n  color: blue;\n}\n");
    }

    #[test]
    fn relative_document_paths_resolve_against_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("src")).unwrap();
        let panel = crate::module_path::normalize(&root.join("src/panel.style.json"));
        std::fs::write(&panel, "{}").unwrap();

        let mut table = ScopeTable::new();
        table.insert_local(Arc::new(Definition {
            name: "panel".into(),
            value: static_tree(r#"{ "color": "red" }"#),
            dependencies: vec![],
            source_file: panel,
            doc: None,
        }));

        let from = std::path::Path::new("src/app.css");
        let mut doc = parse_css("@styles ./panel;", Some(from)).unwrap();
        let err = Resolver::new(&table, InvocationKind::Styles)
            .resolve(&mut doc.clone())
            .unwrap_err();
        assert!(matches!(err, Error::UndefinedDefinition { .. }));

        Resolver::new(&table, InvocationKind::Styles)
            .with_root(root)
            .resolve(&mut doc)
            .unwrap();
        assert_eq!(doc.to_css(), "color: red;\n");
    }

    #[test]
    fn undefined_and_silent() {
        let table = ScopeTable::new();
        let mut doc = parse_css(".a {\n  @styles nope;\n}", None).unwrap();

        let err = Resolver::new(&table, InvocationKind::Styles)
            .resolve(&mut doc.clone())
            .unwrap_err();
        assert_eq!(err.to_string(), "<input>:2:3: Undefined style nope");

        Resolver::new(&table, InvocationKind::Styles)
            .with_silent(true)
            .resolve(&mut doc)
            .unwrap();
        assert_eq!(doc.to_css(), ".a {\n}\n");
    }

    #[test]
    fn empty_definitions_count_as_undefined() {
        let mut table = ScopeTable::new();
        define(&mut table, "blank", DefinitionValue::Empty);

        let mut doc = parse_css("@styles blank;", None).unwrap();
        let err = Resolver::new(&table, InvocationKind::Styles)
            .resolve(&mut doc)
            .unwrap_err();
        assert!(err.is_suppressible());
    }

    #[test]
    fn templates_are_invalid_for_styles() {
        let mut table = ScopeTable::new();
        define(&mut table, "t", template("(a)", "color: $a;"));

        let mut doc = parse_css("@styles t red;", None).unwrap();
        let err = Resolver::new(&table, InvocationKind::Styles)
            .with_silent(true)
            .resolve(&mut doc)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDefinitionType { found: "template", .. }));
    }

    #[test]
    fn self_recursion_is_capped() {
        let mut table = ScopeTable::new();
        define(&mut table, "loop", template("", ".l { @mixin loop; }"));

        let mut doc = parse_css("@mixin loop;", None).unwrap();
        let err = Resolver::new(&table, InvocationKind::Mixin).resolve(&mut doc).unwrap_err();
        assert!(matches!(
            err,
            Error::ExpansionDepthExceeded {
                limit: MAX_EXPANSION_DEPTH,
                ..
            }
        ));
    }

    #[test]
    fn generated_nodes_inherit_invocation_span() {
        let mut table = ScopeTable::new();
        define(&mut table, "box", static_tree(r#"{ "color": "red" }"#));

        let mut doc = parse_css("\n\n  @styles box;", None).unwrap();
        Resolver::new(&table, InvocationKind::Styles).resolve(&mut doc).unwrap();
        let decl = doc.children(doc.root())[0];
        let span = doc[decl].source.as_ref().unwrap();
        assert_eq!((span.line, span.column), (3, 3));
    }

    #[test]
    fn other_kind_is_left_alone() {
        let table = ScopeTable::new();
        let mut doc = parse_css("@mixin x; .a { color: red; }", None).unwrap();
        let before = doc.to_css();

        let processed = Resolver::new(&table, InvocationKind::Styles).resolve(&mut doc).unwrap();
        assert_eq!(processed, 0);
        assert_eq!(doc.to_css(), before);
    }
}
