//! Invocation parameter parsing.

/// A parsed invocation: definition name plus positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Definition name, quotes stripped.
    pub name: String,
    /// Positional arguments, always as text.
    pub args: Vec<String>,
}

/// Parse invocation params such as `box`, `"grid" 3, 4` or `button(large)`.
///
/// The name is the first whitespace-delimited token, also cut at the first
/// `(`. The remainder is unwrapped when it is a single parenthesized group
/// and split on top-level commas.
pub fn parse_invocation(params: &str) -> Invocation {
    let params = params.trim();
    let token_end = params
        .find(|c: char| c.is_whitespace() || c == '(')
        .unwrap_or(params.len());
    let name = trim_quotes(&params[..token_end]).to_string();
    let rest = params[token_end..].trim();

    let args = if rest.is_empty() {
        vec![]
    } else {
        split_comma(unwrap_parens(rest))
    };

    Invocation { name, args }
}

fn trim_quotes(s: &str) -> &str {
    s.trim_matches(|c| c == '"' || c == '\'')
}

/// Strip one pair of parentheses enclosing the whole text.
pub fn unwrap_parens(text: &str) -> &str {
    let text = text.trim();
    if !text.starts_with('(') || !text.ends_with(')') {
        return text;
    }
    // Only unwrap when the opening paren closes at the very end.
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return if i == text.len() - 1 {
                        &text[1..i]
                    } else {
                        text
                    };
                }
            }
            _ => {}
        }
    }
    text
}

/// Split on commas outside quotes and brackets. Items are trimmed and empty
/// items dropped.
pub fn split_comma(text: &str) -> Vec<String> {
    let mut items = vec![];
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in text.chars() {
        if escaped {
            escaped = false;
            current.push(c);
            continue;
        }
        match c {
            '\\' => {
                escaped = true;
                current.push(c);
            }
            '"' | '\'' => {
                match quote {
                    Some(q) if q == c => quote = None,
                    None => quote = Some(c),
                    Some(_) => {}
                }
                current.push(c);
            }
            '(' | '[' | '{' if quote.is_none() => {
                depth += 1;
                current.push(c);
            }
            ')' | ']' | '}' if quote.is_none() => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if quote.is_none() && depth == 0 => {
                push_item(&mut items, &current);
                current.clear();
            }
            _ => current.push(c),
        }
    }
    push_item(&mut items, &current);
    items
}

fn push_item(items: &mut Vec<String>, item: &str) {
    let item = item.trim();
    if !item.is_empty() {
        items.push(item.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_only() {
        assert_eq!(
            parse_invocation("box"),
            Invocation {
                name: "box".into(),
                args: vec![],
            }
        );
        assert_eq!(parse_invocation("'box'").name, "box");
    }

    #[test]
    fn space_separated_arguments() {
        let inv = parse_invocation("grid 3, rgba(0, 0, 0, .5), 'a, b'");
        assert_eq!(inv.name, "grid");
        assert_eq!(inv.args, vec!["3", "rgba(0, 0, 0, .5)", "'a, b'"]);
    }

    #[test]
    fn call_syntax() {
        let inv = parse_invocation("button(large, 2px)");
        assert_eq!(inv.name, "button");
        assert_eq!(inv.args, vec!["large", "2px"]);

        let inv = parse_invocation("grid (3)");
        assert_eq!(inv.args, vec!["3"]);
    }

    #[test]
    fn group_not_wrapping_everything_is_kept() {
        assert_eq!(unwrap_parens("(a) + (b)"), "(a) + (b)");
        assert_eq!(unwrap_parens("((a), b)"), "(a), b");
    }

    #[test]
    fn empty_items_are_dropped() {
        assert_eq!(split_comma("a,, b ,"), vec!["a", "b"]);
        assert!(split_comma("  ").is_empty());
    }
}
