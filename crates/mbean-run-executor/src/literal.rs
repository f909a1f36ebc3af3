//! Unwrapping of textual parameter literals.
//!
//! A literal is either the bare word `null`, a quoted string (`"..."` or
//! `'...'`) or unquoted text. Backslash escapes are interpreted in both the
//! quoted and the unquoted form.

use thiserror::Error;

/// The literal denoting an absent value.
pub const NULL_LITERAL: &str = "null";

/// Literal error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralError {
    #[error("unterminated quoted literal")]
    UnterminatedQuote,
    #[error("unexpected characters after closing quote")]
    TrailingCharacters,
    #[error("dangling escape at end of literal")]
    DanglingEscape,
    #[error("invalid unicode escape: \\u{0}")]
    InvalidUnicodeEscape(String),
    #[error("unbalanced brackets")]
    UnbalancedBrackets,
}

/// An unwrapped literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Null,
    Text(String),
}

/// Interpret quoting and escapes of `expression`.
///
/// # Errors
/// Returns error on malformed quoting or escapes.
pub fn unwrap_literal(expression: &str) -> Result<Literal, LiteralError> {
    if expression == NULL_LITERAL {
        return Ok(Literal::Null);
    }
    match quote_char(expression) {
        Some(quote) => unquote(expression, quote).map(Literal::Text),
        None => unescape(expression).map(Literal::Text),
    }
}

/// Strip surrounding quotes, if any, leaving escapes untouched in unquoted text.
///
/// Used before splitting a list literal so that escapes inside elements
/// survive until each element is unwrapped on its own.
///
/// # Errors
/// Returns error on malformed quoting or escapes.
pub fn strip_quotes(expression: &str) -> Result<String, LiteralError> {
    match quote_char(expression) {
        Some(quote) => unquote(expression, quote),
        None => Ok(expression.to_string()),
    }
}

fn quote_char(expression: &str) -> Option<char> {
    expression.chars().next().filter(|c| matches!(c, '"' | '\''))
}

fn unquote(expression: &str, quote: char) -> Result<String, LiteralError> {
    let body = &expression[quote.len_utf8()..];
    let mut escaped = false;
    for (i, c) in body.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            if i + c.len_utf8() != body.len() {
                return Err(LiteralError::TrailingCharacters);
            }
            return unescape(&body[..i]);
        }
    }
    Err(LiteralError::UnterminatedQuote)
}

fn unescape(raw: &str) -> Result<String, LiteralError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next().ok_or(LiteralError::DanglingEscape)? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'u' => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = (hex.len() == 4)
                    .then(|| u32::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .and_then(char::from_u32)
                    .ok_or(LiteralError::InvalidUnicodeEscape(hex))?;
                out.push(decoded);
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

/// Split the body of a bracketed list literal on top-level commas.
///
/// Commas inside quotes, after a backslash or inside nested brackets do not
/// split. Elements are trimmed; an all-blank body has no elements.
///
/// # Errors
/// Returns error on unbalanced brackets or an unterminated quote.
pub fn split_elements(body: &str) -> Result<Vec<&str>, LiteralError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut elements = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in body.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (c, quote) {
            ('\\', _) => escaped = true,
            (c, Some(q)) if c == q => quote = None,
            (_, Some(_)) => {}
            ('"' | '\'', None) => quote = Some(c),
            ('[', None) => depth += 1,
            (']', None) => {
                depth = depth.checked_sub(1).ok_or(LiteralError::UnbalancedBrackets)?;
            }
            (',', None) if depth == 0 => {
                elements.push(body[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }

    if quote.is_some() {
        return Err(LiteralError::UnterminatedQuote);
    }
    if depth != 0 {
        return Err(LiteralError::UnbalancedBrackets);
    }
    elements.push(body[start..].trim());
    Ok(elements)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Literal {
        Literal::Text(s.to_string())
    }

    #[test]
    fn test_null_only_when_unquoted() {
        assert_eq!(unwrap_literal("null").unwrap(), Literal::Null);
        assert_eq!(unwrap_literal("\"null\"").unwrap(), text("null"));
        assert_eq!(unwrap_literal("nullable").unwrap(), text("nullable"));
    }

    #[test]
    fn test_quotes_are_stripped() {
        assert_eq!(unwrap_literal("\"hello world\"").unwrap(), text("hello world"));
        assert_eq!(unwrap_literal("'single'").unwrap(), text("single"));
        assert_eq!(unwrap_literal("\"\"").unwrap(), text(""));
        assert_eq!(unwrap_literal("it's").unwrap(), text("it's"));
    }

    #[test]
    fn test_escapes() {
        assert_eq!(unwrap_literal(r#""a\"b""#).unwrap(), text("a\"b"));
        assert_eq!(unwrap_literal(r"a\ b\\c").unwrap(), text("a b\\c"));
        assert_eq!(unwrap_literal(r"tab\there").unwrap(), text("tab\there"));
        assert_eq!(unwrap_literal(r"été").unwrap(), text("été"));
    }

    #[test]
    fn test_malformed_literals() {
        assert_eq!(unwrap_literal("\"open"), Err(LiteralError::UnterminatedQuote));
        assert_eq!(unwrap_literal("\"a\"b"), Err(LiteralError::TrailingCharacters));
        assert_eq!(unwrap_literal("end\\"), Err(LiteralError::DanglingEscape));
        assert!(matches!(
            unwrap_literal(r"\uzz"),
            Err(LiteralError::InvalidUnicodeEscape(_))
        ));
    }

    #[test]
    fn test_strip_quotes_keeps_inner_escapes() {
        assert_eq!(strip_quotes(r#"["a\"b"]"#).unwrap(), r#"["a\"b"]"#);
        assert_eq!(strip_quotes(r#""[1, 2]""#).unwrap(), "[1, 2]");
    }

    #[test]
    fn test_split_elements() {
        assert_eq!(split_elements(" 1, 2 ,3").unwrap(), vec!["1", "2", "3"]);
        assert_eq!(split_elements("  ").unwrap(), Vec::<&str>::new());
        assert_eq!(
            split_elements(r#""a,b", 'c', d\,e"#).unwrap(),
            vec![r#""a,b""#, "'c'", r"d\,e"]
        );
        assert_eq!(split_elements("[1, 2], [3]").unwrap(), vec!["[1, 2]", "[3]"]);
        assert_eq!(split_elements("1, ]"), Err(LiteralError::UnbalancedBrackets));
        assert_eq!(split_elements("[1, 2"), Err(LiteralError::UnbalancedBrackets));
        assert_eq!(split_elements("\"a, b"), Err(LiteralError::UnterminatedQuote));
    }
}
