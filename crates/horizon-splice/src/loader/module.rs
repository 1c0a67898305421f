//! Evaluation of definition modules.
//!
//! A bundled CSS-syntax module declares what it provides with top-level
//! `@export` rules. Only exports named after the invocation kind's export
//! name are read:
//!
//! ```css
//! @export styles { .primary { color: red; } }      /* static tree */
//! @export styles generator(grid);                  /* host generator */
//! @export default ($size: medium) { ... }          /* template */
//! ```

use std::path::Path;

use horizon_splice_core::{Document, NodeId, NodeKind};

use crate::definition::{DefinitionValue, Template};
use crate::generator::GeneratorTable;
use crate::kind::InvocationKind;
use crate::value::{merge_override, nodes_to_tree, StyleTree};
use crate::{Error, Result};

/// Read the designated export of a bundled module.
///
/// Static bodies of several designated exports merge in bundle order; any
/// other shape replaces what came before.
pub fn evaluate_module(
    path: &Path,
    document: &Document,
    kind: InvocationKind,
    generators: &GeneratorTable,
) -> Result<DefinitionValue> {
    let mut value = DefinitionValue::Empty;

    for &id in document.children(document.root()) {
        let NodeKind::AtRule {
            name,
            params,
            has_block,
        } = &document[id].kind
        else {
            continue;
        };
        if name != "export" {
            continue;
        }
        let (export, rest) = split_export(params);
        if export != kind.export_name() {
            continue;
        }

        if let Some(generator_id) = generator_binding(rest) {
            let generator = generators.get(generator_id).ok_or_else(|| {
                Error::load(path, format!("Unknown generator '{generator_id}'"))
            })?;
            value = DefinitionValue::Generator(generator);
        } else if !*has_block {
            continue;
        } else if !rest.is_empty() || kind.allows_templates() {
            value = DefinitionValue::Template(template_from(document, id, rest, kind));
        } else {
            let tree = nodes_to_tree(document, id);
            match &mut value {
                DefinitionValue::Static(existing) => merge_override(existing, tree),
                _ => value = DefinitionValue::Static(tree),
            }
        }
    }

    Ok(value)
}

/// Read the export key of a style-object JSON file.
pub fn evaluate_json(path: &Path, text: &str, kind: InvocationKind) -> Result<DefinitionValue> {
    let json: serde_json::Value =
        serde_json::from_str(text).map_err(|e| Error::load(path, e.to_string()))?;
    let serde_json::Value::Object(mut object) = json else {
        return Err(Error::load(path, "expected a JSON object"));
    };
    let Some(export) = object.remove(kind.export_name()) else {
        return Ok(DefinitionValue::Empty);
    };
    if !export.is_object() {
        return Err(Error::load(
            path,
            format!("export '{}' is not an object", kind.export_name()),
        ));
    }
    let tree: StyleTree = serde_json::from_value(export).map_err(|e| Error::load(path, e.to_string()))?;
    Ok(DefinitionValue::Static(tree))
}

fn split_export(params: &str) -> (&str, &str) {
    let params = params.trim();
    let end = params
        .find(|c: char| c.is_whitespace() || c == '(')
        .unwrap_or(params.len());
    (&params[..end], params[end..].trim())
}

fn generator_binding(rest: &str) -> Option<&str> {
    let inner = rest
        .strip_prefix("generator")?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')?;
    Some(inner.trim().trim_matches(|c| c == '"' || c == '\''))
}

fn template_from(document: &Document, export: NodeId, params: &str, kind: InvocationKind) -> Template {
    let mut body = match document.source_file() {
        Some(file) => Document::with_source_file(file),
        None => Document::new(),
    };
    let root = body.root();
    for &child in document.children(export) {
        if let Some(copy) = body.import(document, child) {
            body.append(root, copy);
        }
    }
    Template::new(params, body, kind.slot())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::InvocationContext;
    use crate::value::StyleValue;
    use horizon_splice_core::parse_css;

    fn eval(css: &str, kind: InvocationKind) -> Result<DefinitionValue> {
        let doc = parse_css(css, None).unwrap();
        evaluate_module(Path::new("/defs/x.css"), &doc, kind, &GeneratorTable::new())
    }

    #[test]
    fn static_exports_merge_in_order() {
        let value = eval(
            "@export styles { .a { color: red; } }\n@export styles { .a { color: blue; } .b { margin: 0; } }",
            InvocationKind::Styles,
        )
        .unwrap();

        let tree = value.as_static().unwrap();
        assert_eq!(tree[".a"].as_tree().unwrap()["color"], StyleValue::from("blue"));
        assert!(tree.contains_key(".b"));
    }

    #[test]
    fn other_export_names_are_ignored() {
        let value = eval("@export default { color: red; }", InvocationKind::Styles).unwrap();
        assert!(matches!(value, DefinitionValue::Empty));

        let value = eval("@export styles;", InvocationKind::Styles).unwrap();
        assert!(matches!(value, DefinitionValue::Empty));
    }

    #[test]
    fn mixin_default_export_is_template() {
        let value = eval(
            "@export default ($size: medium) { .btn-$size { @mixin-content; } }",
            InvocationKind::Mixin,
        )
        .unwrap();

        let DefinitionValue::Template(template) = value else {
            panic!("expected template");
        };
        assert_eq!(template.params.len(), 1);
        assert_eq!(template.params[0].default.as_deref(), Some("medium"));
        assert!(template.has_slot);
        assert_eq!(template.nodes().len(), 1);
    }

    #[test]
    fn parameterized_styles_export_is_template() {
        let value = eval("@export styles (a) { .x { color: $a; } }", InvocationKind::Styles).unwrap();
        assert_eq!(value.shape(), "template");
    }

    #[test]
    fn generator_binding_uses_table() {
        let doc = parse_css("@export styles generator(\"grid\");", None).unwrap();
        let generators = GeneratorTable::new()
            .with("grid", |_: &InvocationContext<'_>, _: &[String]| -> Option<StyleTree> { None });

        let value =
            evaluate_module(Path::new("/x.css"), &doc, InvocationKind::Styles, &generators).unwrap();
        assert_eq!(value.shape(), "generator");

        let err = evaluate_module(Path::new("/x.css"), &doc, InvocationKind::Styles, &GeneratorTable::new())
            .unwrap_err();
        assert!(err.to_string().contains("Unknown generator 'grid'"));
    }

    #[test]
    fn json_export() {
        let value = evaluate_json(
            Path::new("/box.style.json"),
            r#"{ "styles": { ".box": { "color": "red" } }, "other": 1 }"#,
            InvocationKind::Styles,
        )
        .unwrap();
        assert!(value.as_static().unwrap().contains_key(".box"));

        let empty = evaluate_json(Path::new("/a.json"), r#"{ "other": {} }"#, InvocationKind::Styles).unwrap();
        assert!(matches!(empty, DefinitionValue::Empty));

        assert!(evaluate_json(Path::new("/a.json"), "[1]", InvocationKind::Styles).is_err());
        assert!(evaluate_json(Path::new("/a.json"), r#"{ "default": 3 }"#, InvocationKind::Mixin).is_err());
    }
}
