//! Arena-backed document tree.
//!
//! A [`Document`] owns every node it contains in a slot map. Nodes refer to
//! each other through [`NodeId`] handles, which stay valid while the tree is
//! rewritten around them and become invalid once the node is removed.
//!
//! Nodes can be detached (they keep their subtree and can be re-inserted) or
//! removed (the subtree is freed). Splicing generated output into a document
//! is a sequence of [`Document::insert_before`] calls followed by removing the
//! node being replaced.

use std::fmt;
use std::ops::{Index, IndexMut};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use slotmap::{new_key_type, SlotMap};

use crate::source::SourceSpan;

new_key_type! {
    /// A handle to a node inside a [`Document`].
    pub struct NodeId;
}

/// The kind of a document node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The document root. Only containers created with
    /// [`Document::create_root`] and the document's own root have this kind.
    Root,
    /// A qualified rule: `selector { ... }`.
    Rule {
        /// Selector text, trimmed.
        selector: String,
    },
    /// An at-rule: `@name params;` or `@name params { ... }`.
    AtRule {
        /// Name without the leading `@`.
        name: String,
        /// Prelude text, trimmed.
        params: String,
        /// Whether the at-rule has a block (possibly empty).
        has_block: bool,
    },
    /// A declaration: `prop: value`.
    Declaration {
        /// Property name.
        prop: String,
        /// Property value without `!important`.
        value: String,
        /// Whether the declaration was marked `!important`.
        important: bool,
    },
}

impl NodeKind {
    /// Create a rule kind.
    pub fn rule(selector: impl Into<String>) -> Self {
        Self::Rule {
            selector: selector.into(),
        }
    }

    /// Create an at-rule kind.
    pub fn at_rule(name: impl Into<String>, params: impl Into<String>, has_block: bool) -> Self {
        Self::AtRule {
            name: name.into(),
            params: params.into(),
            has_block,
        }
    }

    /// Create a declaration kind.
    pub fn declaration(prop: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Declaration {
            prop: prop.into(),
            value: value.into(),
            important: false,
        }
    }

    /// Returns `true` for an at-rule with the given name.
    pub fn is_at_rule_named(&self, expected: &str) -> bool {
        matches!(self, Self::AtRule { name, .. } if name == expected)
    }
}

/// A single node in the document tree.
#[derive(Debug, Clone)]
pub struct Node {
    /// What this node is.
    pub kind: NodeKind,
    /// Where this node came from.
    pub source: Option<SourceSpan>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(kind: NodeKind, source: Option<SourceSpan>) -> Self {
        Self {
            kind,
            source,
            parent: None,
            children: vec![],
        }
    }

    /// The parent node, if attached.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child nodes in order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// A CSS-like document.
#[derive(Clone)]
pub struct Document {
    nodes: SlotMap<NodeId, Node>,
    root: NodeId,
    source_file: Option<Arc<PathBuf>>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new(NodeKind::Root, None));
        Self {
            nodes,
            root,
            source_file: None,
        }
    }

    /// Create an empty document that reports `path` as its source file.
    pub fn with_source_file(path: impl Into<PathBuf>) -> Self {
        let mut doc = Self::new();
        doc.source_file = Some(Arc::new(path.into()));
        doc
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The file this document was parsed from.
    pub fn source_file(&self) -> Option<&Path> {
        self.source_file.as_deref().map(PathBuf::as_path)
    }

    pub(crate) fn shared_source_file(&self) -> Option<Arc<PathBuf>> {
        self.source_file.clone()
    }

    /// Number of live nodes, including the root and detached subtrees.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the document has no nodes besides its root.
    pub fn is_empty(&self) -> bool {
        self.nodes[self.root].children.is_empty()
    }

    /// Whether `id` refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Get a node.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Get a node mutably.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Children of `id`, or an empty slice for a dead handle.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Parent of `id`.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// Whether `id` is live and reachable from the document root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Create a detached node.
    pub fn create(&mut self, kind: NodeKind, source: Option<SourceSpan>) -> NodeId {
        self.nodes.insert(Node::new(kind, source))
    }

    /// Create a detached container that can hold generated nodes before they
    /// are spliced into the tree.
    pub fn create_root(&mut self) -> NodeId {
        self.create(NodeKind::Root, None)
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        if !self.contains(parent) || !self.contains(child) || parent == child {
            return;
        }
        self.detach(child);
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    /// Insert `node` immediately before `anchor` under the anchor's parent.
    ///
    /// Does nothing if the anchor is detached.
    pub fn insert_before(&mut self, anchor: NodeId, node: NodeId) {
        if anchor == node || !self.contains(node) {
            return;
        }
        let Some(parent) = self.parent(anchor) else {
            return;
        };
        self.detach(node);
        let siblings = &mut self.nodes[parent].children;
        let index = siblings.iter().position(|&c| c == anchor).unwrap_or(siblings.len());
        siblings.insert(index, node);
        self.nodes[node].parent = Some(parent);
    }

    /// Move every child of `container` before `anchor`, preserving order.
    ///
    /// Returns the moved nodes.
    pub fn splice_children_before(&mut self, anchor: NodeId, container: NodeId) -> Vec<NodeId> {
        let moved = self.children(container).to_vec();
        for &id in &moved {
            self.insert_before(anchor, id);
        }
        moved
    }

    /// Detach `id` from its parent, keeping its subtree alive.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.retain(|&c| c != id);
        }
        self.nodes[id].parent = None;
    }

    /// Remove `id` and its whole subtree from the document.
    pub fn remove(&mut self, id: NodeId) {
        if id == self.root || !self.contains(id) {
            return;
        }
        self.detach(id);
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(current) {
                stack.extend(node.children);
            }
        }
    }

    /// Remove every child of `id`.
    pub fn clear_children(&mut self, id: NodeId) {
        for child in self.children(id).to_vec() {
            self.remove(child);
        }
    }

    /// Deep-clone `id` inside this document. The clone is detached.
    pub fn deep_clone(&mut self, id: NodeId) -> Option<NodeId> {
        let node = self.nodes.get(id)?;
        let (kind, source, children) = (node.kind.clone(), node.source.clone(), node.children.clone());
        let copy = self.create(kind, source);
        for child in children {
            if let Some(child_copy) = self.deep_clone(child) {
                self.append(copy, child_copy);
            }
        }
        Some(copy)
    }

    /// Deep-copy `id` from another document into this one. The copy is
    /// detached.
    pub fn import(&mut self, other: &Document, id: NodeId) -> Option<NodeId> {
        let node = other.get(id)?;
        let copy = self.create(node.kind.clone(), node.source.clone());
        for &child in &node.children {
            if let Some(child_copy) = self.import(other, child) {
                self.append(copy, child_copy);
            }
        }
        Some(copy)
    }

    /// All descendants of `id` in preorder, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = vec![];
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Descendants of `id` that are at-rules named `name`, in preorder.
    pub fn at_rules_named(&self, id: NodeId, name: &str) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|&n| self.nodes[n].kind.is_at_rule_named(name))
            .collect()
    }

    /// Set the source span of `id` and its whole subtree.
    pub fn set_source_deep(&mut self, id: NodeId, source: Option<SourceSpan>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.source = source.clone();
        }
        for child in self.descendants(id) {
            self.nodes[child].source = source.clone();
        }
    }

    /// Render the whole document as CSS text.
    pub fn to_css(&self) -> String {
        crate::serializer::serialize(self, self.root)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<NodeId> for Document {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }
}

impl IndexMut<NodeId> for Document {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("source_file", &self.source_file)
            .field("nodes", &self.nodes.len())
            .finish()
    }
}

static_assertions::assert_impl_all!(Document: Send, Sync);
