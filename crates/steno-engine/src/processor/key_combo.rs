// Key combo grammar used by `{#...}` tokens
//
//   combos   := combo (whitespace combo)*
//   combo    := key | modifier '(' combos ')'
//
// Example: `control(alt(Delete)) Return` presses control+alt+Delete, then
// Return. Modifiers apply to every key inside their parentheses.

use std::iter::Peekable;
use std::str::CharIndices;

use steno_core::keys::{KeyCombo, Modifiers, canonical_key_name};

/// Error type for key combo strings. Positions are byte offsets into the
/// combo text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyComboError {
    #[error("key combo has no keys")]
    Empty,

    #[error("unknown key {name:?} at position {position}")]
    UnknownKey { name: String, position: usize },

    #[error("unknown modifier {name:?} at position {position}")]
    UnknownModifier { name: String, position: usize },

    #[error("missing ')' for the group opened at position {position}")]
    Unclosed { position: usize },

    #[error("unexpected ')' at position {position}")]
    UnexpectedClose { position: usize },
}

/// Parse a key combo string into key presses in order.
pub fn parse_key_combos(text: &str) -> Result<Vec<KeyCombo>, KeyComboError> {
    let mut parser = ComboParser {
        text,
        chars: text.char_indices().peekable(),
    };
    let mut combos = Vec::new();
    parser.group(Modifiers::NONE, &mut combos)?;
    if let Some(&(position, _)) = parser.chars.peek() {
        return Err(KeyComboError::UnexpectedClose { position });
    }
    if combos.is_empty() {
        return Err(KeyComboError::Empty);
    }
    Ok(combos)
}

struct ComboParser<'a> {
    text: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> ComboParser<'a> {
    /// Parse combos until `)` or the end of input, leaving `)` unconsumed.
    fn group(&mut self, held: Modifiers, out: &mut Vec<KeyCombo>) -> Result<(), KeyComboError> {
        loop {
            self.skip_whitespace();
            let Some(&(start, c)) = self.chars.peek() else {
                return Ok(());
            };
            if c == ')' {
                return Ok(());
            }
            let name = self.name(start);
            self.skip_whitespace();
            if let Some(&(open, '(')) = self.chars.peek() {
                let modifier = Modifiers::from_name(name).ok_or_else(|| KeyComboError::UnknownModifier {
                    name: name.to_string(),
                    position: start,
                })?;
                self.chars.next();
                self.group(held | modifier, out)?;
                match self.chars.next() {
                    Some((_, ')')) => {}
                    _ => return Err(KeyComboError::Unclosed { position: open }),
                }
            } else {
                if name.is_empty() {
                    return Err(KeyComboError::UnknownKey {
                        name: c.to_string(),
                        position: start,
                    });
                }
                let key = canonical_key_name(name).ok_or_else(|| KeyComboError::UnknownKey {
                    name: name.to_string(),
                    position: start,
                })?;
                out.push(KeyCombo::new(key, held));
            }
        }
    }

    /// Consume a run of name characters starting at byte `start`.
    fn name(&mut self, start: usize) -> &'a str {
        let mut end = start;
        while let Some(&(i, c)) = self.chars.peek() {
            if c.is_whitespace() || c == '(' || c == ')' {
                break;
            }
            end = i + c.len_utf8();
            self.chars.next();
        }
        &self.text[start..end]
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|&(_, c)| c.is_whitespace()).is_some() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn combos(text: &str) -> Vec<String> {
        parse_key_combos(text)
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn plain_keys_in_sequence() {
        assert_eq!(combos("a b Return"), ["a", "b", "Return"]);
        assert_eq!(combos("  Tab  "), ["Tab"]);
    }

    #[test]
    fn nested_modifiers_accumulate() {
        let parsed = parse_key_combos("control(alt(Delete)) Return").unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].key, "Delete");
        assert_eq!(parsed[0].modifiers, Modifiers::CONTROL | Modifiers::ALT);
        assert_eq!(parsed[1], KeyCombo::plain("Return"));
    }

    #[test]
    fn modifier_group_applies_to_each_key() {
        let parsed = parse_key_combos("shift(a b)").unwrap();
        assert!(parsed.iter().all(|c| c.modifiers == Modifiers::SHIFT));
        assert_eq!(parsed.iter().map(|c| c.key.as_str()).collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn errors_carry_positions() {
        assert_eq!(parse_key_combos(""), Err(KeyComboError::Empty));
        assert_eq!(parse_key_combos("shift()"), Err(KeyComboError::Empty));
        assert_eq!(
            parse_key_combos("a nokey"),
            Err(KeyComboError::UnknownKey {
                name: "nokey".into(),
                position: 2
            })
        );
        assert_eq!(
            parse_key_combos("hyper(a)"),
            Err(KeyComboError::UnknownModifier {
                name: "hyper".into(),
                position: 0
            })
        );
        assert_eq!(
            parse_key_combos("shift(a"),
            Err(KeyComboError::Unclosed { position: 5 })
        );
        assert_eq!(
            parse_key_combos("a)"),
            Err(KeyComboError::UnexpectedClose { position: 1 })
        );
        assert!(matches!(
            parse_key_combos("(a)"),
            Err(KeyComboError::UnknownModifier { position: 0, .. })
        ));
    }
}
