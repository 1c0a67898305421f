//! Render a document tree as CSS text.

use std::fmt::Write;

use crate::node::{Document, NodeId, NodeKind};

const INDENT: &str = "  ";

/// Serialize `id` and its subtree.
///
/// Serializing a root (the document root or a container from
/// [`Document::create_root`]) renders its children at the top level.
/// Formatting is normalized: one node per line, two-space indentation.
pub fn serialize(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    match doc.get(id).map(|n| &n.kind) {
        Some(NodeKind::Root) => {
            for &child in doc.children(id) {
                write_node(doc, child, 0, &mut out);
            }
        }
        Some(_) => write_node(doc, id, 0, &mut out),
        None => {}
    }
    out
}

fn write_node(doc: &Document, id: NodeId, depth: usize, out: &mut String) {
    let Some(node) = doc.get(id) else {
        return;
    };
    let indent = INDENT.repeat(depth);

    match &node.kind {
        NodeKind::Root => {
            for &child in node.children() {
                write_node(doc, child, depth, out);
            }
        }
        NodeKind::Rule { selector } => {
            let _ = writeln!(out, "{indent}{selector} {{");
            write_block(doc, id, depth, out);
        }
        NodeKind::AtRule {
            name,
            params,
            has_block,
        } => {
            let prelude = if params.is_empty() {
                format!("@{name}")
            } else {
                format!("@{name} {params}")
            };
            if *has_block || !node.children().is_empty() {
                let _ = writeln!(out, "{indent}{prelude} {{");
                write_block(doc, id, depth, out);
            } else {
                let _ = writeln!(out, "{indent}{prelude};");
            }
        }
        NodeKind::Declaration {
            prop,
            value,
            important,
        } => {
            let bang = if *important { " !important" } else { "" };
            let _ = writeln!(out, "{indent}{prop}: {value}{bang};");
        }
    }
}

fn write_block(doc: &Document, id: NodeId, depth: usize, out: &mut String) {
    for &child in doc.children(id) {
        write_node(doc, child, depth + 1, out);
    }
    let _ = writeln!(out, "{}}}", INDENT.repeat(depth));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_blocks_are_indented() {
        let mut doc = Document::new();
        let media = doc.create(NodeKind::at_rule("media", "(min-width: 40em)", true), None);
        let rule = doc.create(NodeKind::rule(".a"), None);
        let decl = doc.create(NodeKind::declaration("color", "red"), None);
        doc.append(doc.root(), media);
        doc.append(media, rule);
        doc.append(rule, decl);

        assert_eq!(
            doc.to_css(),
            "@media (min-width: 40em) {\n  .a {\n    color: red;\n  }\n}\n"
        );
    }

    #[test]
    fn bodiless_at_rule_and_important() {
        let mut doc = Document::new();
        let import = doc.create(NodeKind::at_rule("import", "\"a.css\"", false), None);
        let decl = doc.create(
            NodeKind::Declaration {
                prop: "color".into(),
                value: "red".into(),
                important: true,
            },
            None,
        );
        doc.append(doc.root(), import);
        doc.append(doc.root(), decl);

        assert_eq!(doc.to_css(), "@import \"a.css\";\ncolor: red !important;\n");
    }

    #[test]
    fn empty_block_is_kept() {
        let mut doc = Document::new();
        let at = doc.create(NodeKind::at_rule("font-face", "", true), None);
        doc.append(doc.root(), at);

        assert_eq!(doc.to_css(), "@font-face {\n}\n");
    }
}
