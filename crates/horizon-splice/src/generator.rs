//! Host-supplied generators.
//!
//! A generator is computation supplied by the embedding program. A
//! definition module binds its export to a generator with
//! `@export styles generator(<id>);`, and the generator is called once per
//! invocation with the invocation node and its positional arguments.
//!
//! # Example
//!
//! ```
//! use horizon_splice::{GeneratorTable, InvocationContext, StyleTree, StyleValue};
//!
//! let generators = GeneratorTable::new().with("grid", |_: &InvocationContext<'_>, args: &[String]| {
//!     let columns = args.first()?.clone();
//!     let mut body = StyleTree::new();
//!     body.insert("grid-template-columns".into(), format!("repeat({columns}, 1fr)").into());
//!     let mut tree = StyleTree::new();
//!     tree.insert(".grid".into(), StyleValue::Tree(body));
//!     Some(tree)
//! });
//! assert!(generators.get("grid").is_some());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use horizon_splice_core::{serialize, Document, NodeId, SourceSpan};

use crate::value::StyleTree;

/// Read-only view of the invocation a generator is expanding.
#[derive(Clone, Copy)]
pub struct InvocationContext<'a> {
    document: &'a Document,
    node: NodeId,
    name: &'a str,
}

impl<'a> InvocationContext<'a> {
    /// Create a context for `node` in `document`.
    pub fn new(document: &'a Document, node: NodeId, name: &'a str) -> Self {
        Self {
            document,
            node,
            name,
        }
    }

    /// The document being processed.
    pub fn document(&self) -> &'a Document {
        self.document
    }

    /// The invocation node.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The invoked definition name.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Source location of the invocation.
    pub fn source(&self) -> Option<&'a SourceSpan> {
        self.document.get(self.node).and_then(|n| n.source.as_ref())
    }

    /// The invocation's children. Nested invocations are already expanded.
    pub fn children(&self) -> &'a [NodeId] {
        self.document.children(self.node)
    }

    /// The invocation's children rendered as CSS.
    pub fn children_css(&self) -> String {
        self.children()
            .iter()
            .map(|&child| serialize(self.document, child))
            .collect()
    }
}

impl fmt::Debug for InvocationContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationContext")
            .field("name", &self.name)
            .field("node", &self.node)
            .finish()
    }
}

/// Computation that produces a style tree for an invocation.
pub trait Generator: Send + Sync {
    /// Produce the tree to splice, or `None` to insert nothing.
    fn produce(&self, invocation: &InvocationContext<'_>, args: &[String]) -> Option<StyleTree>;
}

impl<F> Generator for F
where
    F: Fn(&InvocationContext<'_>, &[String]) -> Option<StyleTree> + Send + Sync,
{
    fn produce(&self, invocation: &InvocationContext<'_>, args: &[String]) -> Option<StyleTree> {
        self(invocation, args)
    }
}

/// Generators available to definition modules, by id.
#[derive(Clone, Default)]
pub struct GeneratorTable {
    generators: HashMap<String, Arc<dyn Generator>>,
}

impl GeneratorTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a generator, replacing any previous one with the same id.
    pub fn register(&mut self, id: impl Into<String>, generator: impl Generator + 'static) {
        self.generators.insert(id.into(), Arc::new(generator));
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, id: impl Into<String>, generator: impl Generator + 'static) -> Self {
        self.register(id, generator);
        self
    }

    /// Look up a generator.
    pub fn get(&self, id: &str) -> Option<Arc<dyn Generator>> {
        self.generators.get(id).cloned()
    }

    /// Number of registered generators.
    pub fn len(&self) -> usize {
        self.generators.len()
    }

    /// Whether no generator is registered.
    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}

impl fmt::Debug for GeneratorTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<_> = self.generators.keys().collect();
        ids.sort();
        f.debug_struct("GeneratorTable").field("ids", &ids).finish()
    }
}

static_assertions::assert_impl_all!(GeneratorTable: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_splice_core::parse_css;

    #[test]
    fn closure_generator_receives_arguments() {
        let table = GeneratorTable::new().with("echo", |_: &InvocationContext<'_>, args: &[String]| {
            let mut tree = StyleTree::new();
            tree.insert("content".into(), args.join("|").into());
            Some(tree)
        });

        let doc = parse_css("@styles echo a, b;", None).unwrap();
        let node = doc.children(doc.root())[0];
        let ctx = InvocationContext::new(&doc, node, "echo");

        let tree = table.get("echo").unwrap().produce(&ctx, &["a".into(), "b".into()]).unwrap();
        assert_eq!(tree["content"], "a|b".into());
    }

    #[test]
    fn context_exposes_children() {
        let doc = parse_css("@styles wrap { color: red; }", None).unwrap();
        let node = doc.children(doc.root())[0];
        let ctx = InvocationContext::new(&doc, node, "wrap");

        assert_eq!(ctx.children().len(), 1);
        assert_eq!(ctx.children_css(), "color: red;\n");
        assert_eq!(ctx.source().map(|s| s.line), Some(1));
    }
}
