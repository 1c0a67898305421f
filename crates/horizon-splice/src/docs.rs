//! Typedef documentation for global style definitions.
//!
//! Every global definition with a static tree gets a typedef comment listing
//! the class names it provides, so editors can complete them:
//!
//! ```text
//! /**
//! * @typedef {Object} button
//! * @property {String} primary Main call to action
//! * @property {function} get
//! */
//! ```

use crate::value::{StyleTree, StyleValue, DOC_KEY};

/// Compose the typedef comment for one definition.
///
/// Only top-level keys starting with `.` are listed; a `doc` text inside the
/// entry is appended to its line. Returns an empty string when there is no
/// static tree.
pub fn compose_typedef(name: &str, tree: Option<&StyleTree>) -> String {
    let Some(tree) = tree else {
        return String::new();
    };

    let mut out = String::from("/**\n");
    out.push_str(&tag("typedef", "Object", name, None));
    for (key, value) in tree {
        let Some(class) = key.strip_prefix('.') else {
            continue;
        };
        let doc = match value {
            StyleValue::Tree(entry) => entry.get(DOC_KEY).and_then(StyleValue::to_css_text),
            _ => None,
        };
        out.push_str(&tag("property", "String", class, doc.as_deref()));
    }
    out.push_str(&tag("property", "function", "get", None));
    out.push_str("*/");
    out
}

fn tag(kind: &str, ty: &str, name: &str, doc: Option<&str>) -> String {
    match doc {
        Some(doc) => format!("* @{kind} {{{ty}}} {name} {doc}\n"),
        None => format!("* @{kind} {{{ty}}} {name}\n"),
    }
}

/// Join typedef comments with blank lines.
pub fn join_typedefs<'a>(docs: impl IntoIterator<Item = &'a str>) -> String {
    docs.into_iter().collect::<Vec<_>>().join("\n\n")
}
