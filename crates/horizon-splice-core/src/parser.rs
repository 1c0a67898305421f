//! CSS syntax parser using the `cssparser` crate.
//!
//! This module builds a [`Document`] from stylesheet text. It does not try
//! to understand property values: selectors, at-rule preludes and declaration
//! values are kept as trimmed source text, which is all the splice engine
//! needs to rewrite the tree.
//!
//! Nesting is supported everywhere. Inside any block, an item is classified by
//! how it ends:
//!
//! - `@name prelude;` or `@name prelude { ... }` is an at-rule
//! - `prelude { ... }` is a rule
//! - `prop: value;` (or `prop: value` at the end of a block) is a declaration

use std::path::Path;

use cssparser::{
    Delimiter, ParseError as CssParseError, ParseErrorKind, Parser, ParserInput, SourceLocation,
    Token,
};

use crate::logging::targets;
use crate::node::{Document, NodeId, NodeKind};
use crate::source::SourceSpan;
use crate::{Error, Result};

type BlockResult<'i> = std::result::Result<(), CssParseError<'i, String>>;

/// Parse CSS text into a document.
///
/// `file` is recorded as the document's source file and on every node's
/// [`SourceSpan`]; it is not read.
///
/// # Example
///
/// ```
/// use horizon_splice_core::parse_css;
///
/// let doc = parse_css("@styles box; .a { color: red; }", None)?;
/// assert_eq!(doc.children(doc.root()).len(), 2);
/// # Ok::<(), horizon_splice_core::Error>(())
/// ```
pub fn parse_css(css: &str, file: Option<&Path>) -> Result<Document> {
    let mut doc = match file {
        Some(path) => Document::with_source_file(path),
        None => Document::new(),
    };
    let root = doc.root();

    {
        let mut builder = Builder {
            file: doc.shared_source_file(),
            doc: &mut doc,
        };
        let mut input = ParserInput::new(css);
        let mut parser = Parser::new(&mut input);
        parse_block(&mut parser, &mut builder, root).map_err(|e| to_error(e, file))?;
    }

    tracing::trace!(
        target: targets::PARSER,
        "Parsed {} ({} nodes)",
        file.map(|p| p.display().to_string()).unwrap_or_else(|| "<input>".into()),
        doc.len()
    );
    Ok(doc)
}

/// Read and parse a CSS file.
pub fn parse_css_file(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    let css = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse_css(&css, Some(path))
}

struct Builder<'d> {
    doc: &'d mut Document,
    file: Option<std::sync::Arc<std::path::PathBuf>>,
}

impl Builder<'_> {
    fn span(&self, location: SourceLocation) -> Option<SourceSpan> {
        Some(SourceSpan::new(self.file.clone(), location.line + 1, location.column))
    }

    fn add(&mut self, parent: NodeId, kind: NodeKind, location: SourceLocation) -> NodeId {
        let span = self.span(location);
        let id = self.doc.create(kind, span);
        self.doc.append(parent, id);
        id
    }
}

/// Parse the items of a block (or the top level) into children of `parent`.
fn parse_block<'i>(
    parser: &mut Parser<'i, '_>,
    builder: &mut Builder<'_>,
    parent: NodeId,
) -> BlockResult<'i> {
    loop {
        parser.skip_whitespace();

        if parser.is_exhausted() {
            return Ok(());
        }

        let location = parser.current_source_location();
        let state = parser.state();

        match parser.next().cloned() {
            Ok(Token::AtKeyword(name)) => {
                parse_at_rule(parser, builder, parent, name.to_string(), location)?;
            }
            Ok(Token::Semicolon) => continue,
            Ok(_) => {
                parser.reset(&state);
                parse_rule_or_declaration(parser, builder, parent, location)?;
            }
            Err(_) => return Ok(()),
        }
    }
}

/// Parse an at-rule after its `@name` token.
fn parse_at_rule<'i>(
    parser: &mut Parser<'i, '_>,
    builder: &mut Builder<'_>,
    parent: NodeId,
    name: String,
    location: SourceLocation,
) -> BlockResult<'i> {
    let start = parser.position();
    parser.parse_until_before(Delimiter::Semicolon | Delimiter::CurlyBracketBlock, |p| {
        consume_all(p)
    })?;
    let params = parser.slice_from(start).trim().to_string();

    let opens_block = matches!(parser.next(), Ok(Token::CurlyBracketBlock));
    let id = builder.add(parent, NodeKind::at_rule(name, params, opens_block), location);

    if opens_block {
        parser.parse_nested_block(|p| parse_block(p, builder, id))?;
    }

    Ok(())
}

/// Parse a qualified rule or a declaration.
fn parse_rule_or_declaration<'i>(
    parser: &mut Parser<'i, '_>,
    builder: &mut Builder<'_>,
    parent: NodeId,
    location: SourceLocation,
) -> BlockResult<'i> {
    let start = parser.position();
    parser.parse_until_before(Delimiter::Semicolon | Delimiter::CurlyBracketBlock, |p| {
        consume_all(p)
    })?;
    let prelude = parser.slice_from(start).trim().to_string();

    if matches!(parser.next(), Ok(Token::CurlyBracketBlock)) {
        let id = builder.add(parent, NodeKind::rule(prelude), location);
        return parser.parse_nested_block(|p| parse_block(p, builder, id));
    }

    if prelude.is_empty() {
        return Ok(());
    }

    let Some((prop, value)) = prelude.split_once(':') else {
        return Err(custom_error(format!("Unknown word '{prelude}'"), location));
    };
    let prop = prop.trim();
    if prop.is_empty() {
        return Err(custom_error("Missing property name", location));
    }

    let (value, important) = split_important(value);
    builder.add(
        parent,
        NodeKind::Declaration {
            prop: prop.to_string(),
            value,
            important,
        },
        location,
    );

    Ok(())
}

/// Consume every remaining token of the current (delimited) input.
fn consume_all<'i>(parser: &mut Parser<'i, '_>) -> BlockResult<'i> {
    while parser.next().is_ok() {}
    Ok(())
}

/// Split a trailing `!important` off a declaration value.
fn split_important(value: &str) -> (String, bool) {
    let trimmed = value.trim();
    let lower = trimmed.to_ascii_lowercase();
    if let Some(head) = lower.strip_suffix("important") {
        let head = head.trim_end();
        if head.ends_with('!') {
            let cut = head.len() - 1;
            return (trimmed[..cut].trim_end().to_string(), true);
        }
    }
    (trimmed.to_string(), false)
}

fn custom_error<'i>(message: impl Into<String>, location: SourceLocation) -> CssParseError<'i, String> {
    CssParseError {
        kind: ParseErrorKind::Custom(message.into()),
        location,
    }
}

fn to_error(error: CssParseError<'_, String>, file: Option<&Path>) -> Error {
    let message = match error.kind {
        ParseErrorKind::Custom(message) => message,
        ParseErrorKind::Basic(kind) => format!("{kind:?}"),
    };
    Error::parse(
        message,
        file.map(Path::to_path_buf),
        error.location.line + 1,
        error.location.column,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(doc: &Document, id: NodeId) -> Vec<NodeKind> {
        doc.children(id).iter().map(|&c| doc[c].kind.clone()).collect()
    }

    #[test]
    fn parse_simple_rule() {
        let doc = parse_css("Button { color: red; }", None).unwrap();
        let rule = doc.children(doc.root())[0];

        assert_eq!(doc[rule].kind, NodeKind::rule("Button"));
        assert_eq!(kinds(&doc, rule), vec![NodeKind::declaration("color", "red")]);
    }

    #[test]
    fn parse_at_rules_with_and_without_block() {
        let css = r#"
            @styles box;
            @mixin button(large, 2px) { color: blue; }
        "#;
        let doc = parse_css(css, None).unwrap();
        let top = kinds(&doc, doc.root());

        assert_eq!(top[0], NodeKind::at_rule("styles", "box", false));
        assert_eq!(top[1], NodeKind::at_rule("mixin", "button(large, 2px)", true));
    }

    #[test]
    fn parse_nested_rules_and_pseudo_selectors() {
        let css = ".card { padding: 4px; &:hover { color: red } a:focus { outline: none; } }";
        let doc = parse_css(css, None).unwrap();
        let card = doc.children(doc.root())[0];
        let children = kinds(&doc, card);

        assert_eq!(children[0], NodeKind::declaration("padding", "4px"));
        assert_eq!(children[1], NodeKind::rule("&:hover"));
        assert_eq!(children[2], NodeKind::rule("a:focus"));
    }

    #[test]
    fn parse_last_declaration_without_semicolon() {
        let doc = parse_css(".a { color: red; margin: 0 auto }", None).unwrap();
        let rule = doc.children(doc.root())[0];

        assert_eq!(
            kinds(&doc, rule),
            vec![
                NodeKind::declaration("color", "red"),
                NodeKind::declaration("margin", "0 auto"),
            ]
        );
    }

    #[test]
    fn parse_important_flag() {
        let doc = parse_css(".a { color: red !important; }", None).unwrap();
        let decl = doc.children(doc.children(doc.root())[0])[0];

        assert_eq!(
            doc[decl].kind,
            NodeKind::Declaration {
                prop: "color".into(),
                value: "red".into(),
                important: true,
            }
        );
    }

    #[test]
    fn parse_function_values_keep_commas() {
        let doc = parse_css(".a { color: rgba(0, 0, 0, 0.5); }", None).unwrap();
        let decl = doc.children(doc.children(doc.root())[0])[0];

        assert_eq!(doc[decl].kind, NodeKind::declaration("color", "rgba(0, 0, 0, 0.5)"));
    }

    #[test]
    fn source_locations_are_one_indexed() {
        let path = Path::new("/src/app.css");
        let doc = parse_css(".a {}\n  .b { color: red; }", Some(path)).unwrap();
        let b = doc.children(doc.root())[1];
        let span = doc[b].source.clone().unwrap();

        assert_eq!(span.line, 2);
        assert_eq!(span.column, 3);
        assert_eq!(span.file(), Some(path));
    }

    #[test]
    fn declaration_without_colon_is_an_error() {
        let err = parse_css(".a { color red; }", None).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
    }

    #[test]
    fn comments_are_dropped() {
        let doc = parse_css("/* head */ .a { /* inner */ color: red; }", None).unwrap();
        assert_eq!(doc.to_css(), ".a {\n  color: red;\n}\n");
    }
}
