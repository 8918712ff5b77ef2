// Regex orthography
//
// Each rule's left and right patterns are joined around a sentinel
// character and matched against `word SENTINEL fragment`. The replacement
// template yields the whole joined word, which is turned back into an edit
// by stripping the prefix it shares with the original word.

use regex::Regex;

use super::{Orthography, OrthographyError, OrthographyRule};
use crate::formatting::text::{char_offset, common_prefix_chars};

/// Separates the word from the attaching fragment during matching.
const SENTINEL: char = '\u{1}';

/// Ordered regex rules; the first matching rule wins.
#[derive(Debug, Clone)]
pub struct RegexOrthography {
    rules: Vec<(Regex, String)>,
}

impl RegexOrthography {
    /// Compile rules. `l` and `r` are regex fragments; `s` may refer to
    /// capture groups as `\1`, `\2`, ...
    pub fn new(rules: &[OrthographyRule]) -> Result<Self, OrthographyError> {
        let mut compiled = Vec::with_capacity(rules.len());
        for (index, rule) in rules.iter().enumerate() {
            let pattern = format!("^(?:{}){SENTINEL}(?:{})$", rule.left, rule.right);
            let regex = Regex::new(&pattern).map_err(|source| OrthographyError::Pattern { index, source })?;
            compiled.push((regex, expansion_template(&rule.replacement)));
        }
        Ok(Self { rules: compiled })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Orthography for RegexOrthography {
    fn apply(&self, left: &str, right: &str) -> Option<(usize, String)> {
        let joined = format!("{left}{SENTINEL}{right}");
        let (regex, template) = self.rules.iter().find(|(regex, _)| regex.is_match(&joined))?;
        let captures = regex.captures(&joined)?;
        let mut word = String::new();
        captures.expand(template, &mut word);
        word.retain(|c| c != SENTINEL);

        let common = common_prefix_chars(left, &word);
        let erase = left.chars().count() - common;
        Some((erase, word[char_offset(&word, common)..].to_string()))
    }
}

/// Convert `\N` group references into the `regex` crate's `${N}` syntax,
/// escaping literal `$`.
fn expansion_template(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len() + 4);
    let mut chars = replacement.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.peek() {
                Some(d) if d.is_ascii_digit() => {
                    out.push_str("${");
                    while let Some(d) = chars.next_if(char::is_ascii_digit) {
                        out.push(d);
                    }
                    out.push('}');
                }
                Some(_) => {
                    if let Some(escaped) = chars.next() {
                        if escaped == '$' {
                            out.push('$');
                        }
                        out.push(escaped);
                    }
                }
                None => out.push('\\'),
            },
            '$' => out.push_str("$$"),
            _ => out.push(c),
        }
    }
    out
}
