//! Static style trees.
//!
//! A [`StyleTree`] is the plain-data form of a definition: an ordered mapping
//! from CSS-like keys to values or nested mappings, as produced by a
//! `*.style.json` file or a static `@export` body. It converts to document
//! nodes when spliced and back from nodes when a CSS-syntax module is loaded.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use horizon_splice_core::{Document, NodeId, NodeKind};

/// Ordered mapping of keys to style values.
pub type StyleTree = IndexMap<String, StyleValue>;

/// Key holding documentation text inside a top-level entry.
pub const DOC_KEY: &str = "doc";

/// A value in a [`StyleTree`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    /// Boolean, meaningful on at-rule keys (`"@custom-media --x (...)": true`).
    Flag(bool),
    /// Number; becomes `px` unless zero or the property is unitless.
    Number(f64),
    /// Text value.
    Text(String),
    /// The same key repeated once per element.
    List(Vec<StyleValue>),
    /// Nested block.
    Tree(StyleTree),
}

impl StyleValue {
    /// Render a scalar value as CSS text.
    pub fn to_css_text(&self) -> Option<String> {
        match self {
            Self::Flag(flag) => Some(flag.to_string()),
            Self::Number(n) => Some(format_number(*n)),
            Self::Text(text) => Some(text.clone()),
            Self::List(_) | Self::Tree(_) => None,
        }
    }

    /// The nested tree, if this value is one.
    pub fn as_tree(&self) -> Option<&StyleTree> {
        match self {
            Self::Tree(tree) => Some(tree),
            _ => None,
        }
    }
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<StyleTree> for StyleValue {
    fn from(value: StyleTree) -> Self {
        Self::Tree(value)
    }
}

/// Format a number the way a script engine would print it.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Build document nodes for `tree` inside a fresh detached container.
///
/// The container is a root node; its children are the generated nodes.
pub fn tree_to_nodes(doc: &mut Document, tree: &StyleTree) -> NodeId {
    let container = doc.create_root();
    append_entries(doc, container, tree);
    container
}

fn append_entries(doc: &mut Document, parent: NodeId, tree: &StyleTree) {
    for (key, value) in tree {
        append_entry(doc, parent, key, value);
    }
}

fn append_entry(doc: &mut Document, parent: NodeId, key: &str, value: &StyleValue) {
    if let StyleValue::List(items) = value {
        for item in items {
            append_entry(doc, parent, key, item);
        }
        return;
    }

    if let Some(at_key) = key.strip_prefix('@') {
        let (name, key_params) = match at_key.split_once(char::is_whitespace) {
            Some((name, params)) => (name, params.trim()),
            None => (at_key, ""),
        };
        let (params, block) = match value {
            StyleValue::Flag(false) => return,
            StyleValue::Tree(tree) => (key_params.to_string(), Some(tree)),
            StyleValue::Text(_) | StyleValue::Number(_) if key_params.is_empty() => {
                (value.to_css_text().unwrap_or_default(), None)
            }
            _ => (key_params.to_string(), None),
        };
        let id = doc.create(NodeKind::at_rule(name, params, block.is_some()), None);
        doc.append(parent, id);
        if let Some(tree) = block {
            append_entries(doc, id, tree);
        }
        return;
    }

    match value {
        StyleValue::Tree(tree) => {
            let id = doc.create(NodeKind::rule(key), None);
            doc.append(parent, id);
            append_entries(doc, id, tree);
        }
        StyleValue::Flag(_) | StyleValue::List(_) => {}
        StyleValue::Number(n) => {
            let prop = dashify(key);
            let value = if *n == 0.0 || is_unitless(&prop) {
                format_number(*n)
            } else {
                format!("{}px", format_number(*n))
            };
            let id = doc.create(NodeKind::declaration(prop, value), None);
            doc.append(parent, id);
        }
        StyleValue::Text(text) => {
            let (value, important) = strip_important(text);
            let id = doc.create(
                NodeKind::Declaration {
                    prop: dashify(key),
                    value,
                    important,
                },
                None,
            );
            doc.append(parent, id);
        }
    }
}

/// Read the children of `parent` back into a tree.
///
/// Duplicate nested keys are merged; duplicate scalar keys become lists.
pub fn nodes_to_tree(doc: &Document, parent: NodeId) -> StyleTree {
    let mut tree = StyleTree::new();
    for &child in doc.children(parent) {
        match &doc[child].kind {
            NodeKind::Rule { selector } => {
                merge_nested(&mut tree, selector.clone(), nodes_to_tree(doc, child));
            }
            NodeKind::AtRule {
                name,
                params,
                has_block,
            } => {
                let key = if params.is_empty() {
                    format!("@{name}")
                } else {
                    format!("@{name} {params}")
                };
                if *has_block || !doc.children(child).is_empty() {
                    merge_nested(&mut tree, key, nodes_to_tree(doc, child));
                } else {
                    insert_scalar(&mut tree, key, StyleValue::Flag(true));
                }
            }
            NodeKind::Declaration {
                prop,
                value,
                important,
            } => {
                let text = if *important {
                    format!("{value} !important")
                } else {
                    value.clone()
                };
                insert_scalar(&mut tree, prop.clone(), StyleValue::Text(text));
            }
            NodeKind::Root => {}
        }
    }
    tree
}

fn merge_nested(tree: &mut StyleTree, key: String, nested: StyleTree) {
    match tree.get_mut(&key) {
        Some(StyleValue::Tree(existing)) => {
            for (k, v) in nested {
                match v {
                    StyleValue::Tree(inner) => merge_nested(existing, k, inner),
                    other => insert_scalar(existing, k, other),
                }
            }
        }
        Some(StyleValue::List(items)) => items.push(StyleValue::Tree(nested)),
        Some(other) => {
            let previous = std::mem::replace(other, StyleValue::List(vec![]));
            *other = StyleValue::List(vec![previous, StyleValue::Tree(nested)]);
        }
        None => {
            tree.insert(key, StyleValue::Tree(nested));
        }
    }
}

fn insert_scalar(tree: &mut StyleTree, key: String, value: StyleValue) {
    match tree.get_mut(&key) {
        Some(StyleValue::List(items)) => items.push(value),
        Some(existing) => {
            let previous = std::mem::replace(existing, StyleValue::List(vec![]));
            *existing = StyleValue::List(vec![previous, value]);
        }
        None => {
            tree.insert(key, value);
        }
    }
}

/// Merge `overlay` into `base`; overlay keys win, nested trees merge.
pub fn merge_override(base: &mut StyleTree, overlay: StyleTree) {
    for (key, value) in overlay {
        match value {
            StyleValue::Tree(inner) => {
                if let Some(StyleValue::Tree(existing)) = base.get_mut(&key) {
                    merge_override(existing, inner);
                } else {
                    base.insert(key, StyleValue::Tree(inner));
                }
            }
            other => {
                base.insert(key, other);
            }
        }
    }
}

/// Remove documentation keys from every top-level entry.
pub fn strip_doc(tree: &mut StyleTree) {
    for value in tree.values_mut() {
        if let StyleValue::Tree(entry) = value {
            entry.shift_remove(DOC_KEY);
        }
    }
}

/// Convert a camelCase key to a CSS property name.
///
/// Custom properties and keys that are already dashed are returned unchanged.
pub fn dashify(key: &str) -> String {
    if key.starts_with("--") || !key.chars().any(|c| c.is_ascii_uppercase()) {
        return key.to_string();
    }
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    if let Some(rest) = out.strip_prefix("ms-") {
        out = format!("-ms-{rest}");
    }
    out
}

const UNITLESS: &[&str] = &[
    "animation-iteration-count",
    "border-image-outset",
    "border-image-slice",
    "border-image-width",
    "box-flex",
    "box-flex-group",
    "column-count",
    "columns",
    "fill-opacity",
    "flex",
    "flex-grow",
    "flex-negative",
    "flex-positive",
    "flex-shrink",
    "font-weight",
    "grid-area",
    "grid-column",
    "grid-column-end",
    "grid-column-start",
    "grid-row",
    "grid-row-end",
    "grid-row-start",
    "line-clamp",
    "line-height",
    "opacity",
    "order",
    "orphans",
    "stop-opacity",
    "stroke-dashoffset",
    "stroke-opacity",
    "stroke-width",
    "tab-size",
    "widows",
    "z-index",
    "zoom",
];

fn is_unitless(prop: &str) -> bool {
    prop.starts_with("--") || UNITLESS.contains(&prop)
}

fn strip_important(value: &str) -> (String, bool) {
    let trimmed = value.trim();
    let lower = trimmed.to_ascii_lowercase();
    if let Some(head) = lower.strip_suffix("!important") {
        return (trimmed[..head.len()].trim_end().to_string(), true);
    }
    (trimmed.to_string(), false)
}
