// Splitting raw translations into literal text and `{...}` tokens

use super::ParseError;

/// A top-level piece of a raw translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    /// Literal text, unescaped and trimmed.
    Text(String),
    /// Contents of a `{...}` token, unescaped. `position` is the byte
    /// offset of the opening brace.
    Token { content: String, position: usize },
}

/// Split `raw` at top-level braces. `\{`, `\}` and `\\` escape the next
/// character anywhere. Whitespace-only literal segments are dropped.
pub(crate) fn segments(raw: &str) -> Result<Vec<Segment>, ParseError> {
    let mut out = Vec::new();
    let mut buffer = String::new();
    let mut open: Option<usize> = None;
    let mut chars = raw.char_indices();

    while let Some((position, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, escaped)) => buffer.push(escaped),
                None => return Err(ParseError::DanglingEscape { position }),
            },
            '{' => {
                if let Some(opened) = open {
                    return Err(ParseError::NestedBrace { position, opened });
                }
                push_text(&mut out, &mut buffer);
                open = Some(position);
            }
            '}' => match open.take() {
                Some(opened) => out.push(Segment::Token {
                    content: std::mem::take(&mut buffer),
                    position: opened,
                }),
                None => return Err(ParseError::UnexpectedClose { position }),
            },
            _ => buffer.push(c),
        }
    }
    if let Some(position) = open {
        return Err(ParseError::UnclosedBrace { position });
    }
    push_text(&mut out, &mut buffer);
    Ok(out)
}

fn push_text(out: &mut Vec<Segment>, buffer: &mut String) {
    let text = buffer.trim();
    if !text.is_empty() {
        out.push(Segment::Text(text.to_string()));
    }
    buffer.clear();
}

/// Escape `text` so that it parses back as the same literal.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '{' | '}' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
