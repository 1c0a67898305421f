//! Loaded definitions.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use horizon_splice_core::{Document, NodeId, NodeKind};

use crate::args::{split_comma, unwrap_parens};
use crate::generator::Generator;
use crate::value::StyleTree;

/// The result of loading one definition file.
#[derive(Debug, Clone)]
pub struct Definition {
    /// Base name of the file, extensions stripped.
    pub name: String,
    /// What the file exports.
    pub value: DefinitionValue,
    /// Files touched while building the definition, its own file included.
    pub dependencies: Vec<PathBuf>,
    /// Absolute path of the definition's own file.
    pub source_file: PathBuf,
    /// Typedef documentation, for global definitions only.
    pub doc: Option<String>,
}

impl Definition {
    /// Whether the definition exports nothing usable.
    pub fn is_empty(&self) -> bool {
        matches!(self.value, DefinitionValue::Empty)
    }
}

static_assertions::assert_impl_all!(Definition: Send, Sync);

/// The three definition shapes, plus the no-op shape of a file without the
/// designated export.
#[derive(Clone)]
pub enum DefinitionValue {
    /// Plain data spliced as-is.
    Static(StyleTree),
    /// Host computation called per invocation.
    Generator(Arc<dyn Generator>),
    /// Parameterized node body.
    Template(Template),
    /// No designated export.
    Empty,
}

impl DefinitionValue {
    /// Short name of the shape, used in error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Static(_) => "static tree",
            Self::Generator(_) => "generator",
            Self::Template(_) => "template",
            Self::Empty => "empty",
        }
    }

    /// The static tree, if this is one.
    pub fn as_static(&self) -> Option<&StyleTree> {
        match self {
            Self::Static(tree) => Some(tree),
            _ => None,
        }
    }
}

impl fmt::Debug for DefinitionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(tree) => f.debug_tuple("Static").field(tree).finish(),
            Self::Generator(_) => f.write_str("Generator(..)"),
            Self::Template(template) => f.debug_tuple("Template").field(template).finish(),
            Self::Empty => f.write_str("Empty"),
        }
    }
}

/// A declared template parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateParam {
    /// Name without the leading `$`.
    pub name: String,
    /// Value used when the invocation omits the argument.
    pub default: Option<String>,
}

/// A parameterized body of nodes.
#[derive(Clone)]
pub struct Template {
    /// Parameters in declaration order.
    pub params: Vec<TemplateParam>,
    /// Body nodes are the children of the document root.
    pub body: Document,
    /// Whether the body contains the content slot.
    pub has_slot: bool,
}

impl Template {
    /// Build a template from a parameter list such as `($size: medium, $color)`.
    pub fn new(params: &str, body: Document, slot: &str) -> Self {
        let has_slot = !body.at_rules_named(body.root(), slot).is_empty();
        Self {
            params: parse_params(params),
            body,
            has_slot,
        }
    }

    /// Bind positional arguments to the declared parameters.
    ///
    /// Returns the name of the first parameter that has neither an argument
    /// nor a default. Extra arguments are ignored.
    pub fn bind(&self, args: &[String]) -> Result<HashMap<String, String>, String> {
        self.params
            .iter()
            .enumerate()
            .map(|(i, param)| {
                let value = args.get(i).or(param.default.as_ref());
                match value {
                    Some(value) => Ok((param.name.clone(), value.clone())),
                    None => Err(param.name.clone()),
                }
            })
            .collect()
    }

    /// The body's top-level nodes.
    pub fn nodes(&self) -> &[NodeId] {
        self.body.children(self.body.root())
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("params", &self.params)
            .field("body", &self.body.to_css())
            .field("has_slot", &self.has_slot)
            .finish()
    }
}

/// Parse a parameter declaration list.
pub fn parse_params(text: &str) -> Vec<TemplateParam> {
    split_comma(unwrap_parens(text))
        .into_iter()
        .filter_map(|item| {
            let (name, default) = match item.split_once(':') {
                Some((name, default)) => (name, Some(default.trim())),
                None => (item.as_str(), None),
            };
            let name = name.trim().trim_start_matches('$');
            if name.is_empty() {
                return None;
            }
            Some(TemplateParam {
                name: name.to_string(),
                default: default.filter(|d| !d.is_empty()).map(str::to_string),
            })
        })
        .collect()
}

/// Replace `$name` references with bound values. Unknown names are kept.
pub fn substitute(text: &str, bindings: &HashMap<String, String>) -> String {
    if !text.contains('$') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
            .unwrap_or(after.len());
        let name = &after[..len];
        match bindings.get(name) {
            Some(value) if !name.is_empty() => out.push_str(value),
            _ => {
                out.push('$');
                out.push_str(name);
            }
        }
        rest = &after[len..];
    }
    out.push_str(rest);
    out
}

/// Apply [`substitute`] to every selector, at-rule param and declaration in
/// the subtree rooted at `id`.
pub fn substitute_tree(doc: &mut Document, id: NodeId, bindings: &HashMap<String, String>) {
    if bindings.is_empty() {
        return;
    }
    let mut targets = doc.descendants(id);
    targets.push(id);
    for node in targets {
        let Some(node) = doc.get_mut(node) else {
            continue;
        };
        match &mut node.kind {
            NodeKind::Rule { selector } => *selector = substitute(selector, bindings),
            NodeKind::AtRule { params, .. } => *params = substitute(params, bindings),
            NodeKind::Declaration { prop, value, .. } => {
                *prop = substitute(prop, bindings);
                *value = substitute(value, bindings);
            }
            NodeKind::Root => {}
        }
    }
}
