// Text fragments before and after joining to their context

use std::ops::Add;

use super::{Formatting, Space};
use crate::orthography::Orthography;

/// An edit relative to some preceding text: erase `backspaces` characters,
/// then type `text`. `formatting` is the state left for the next fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormattedText {
    pub backspaces: usize,
    pub text: String,
    pub formatting: Formatting,
}

impl FormattedText {
    pub fn new(backspaces: usize, text: impl Into<String>, formatting: Formatting) -> Self {
        Self {
            backspaces,
            text: text.into(),
            formatting,
        }
    }

    /// Whether applying the edit leaves any text unchanged.
    pub fn is_noop(&self) -> bool {
        self.backspaces == 0 && self.text.is_empty()
    }
}

/// Splice: `rhs` is applied after `self`. Backspaces in `rhs` first eat
/// into `self.text`; any excess reaches past it.
impl Add for FormattedText {
    type Output = FormattedText;

    fn add(self, rhs: FormattedText) -> FormattedText {
        let len = self.text.chars().count();
        if rhs.backspaces <= len {
            let mut text = self.text;
            truncate_chars(&mut text, len - rhs.backspaces);
            text.push_str(&rhs.text);
            FormattedText {
                backspaces: self.backspaces,
                text,
                formatting: rhs.formatting,
            }
        } else {
            FormattedText {
                backspaces: self.backspaces + (rhs.backspaces - len),
                text: rhs.text,
                formatting: rhs.formatting,
            }
        }
    }
}

/// A fragment not yet joined to any context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnformattedText {
    pub text: String,
    pub formatting: Formatting,
}

impl UnformattedText {
    pub fn new(text: impl Into<String>, formatting: Formatting) -> Self {
        Self {
            text: text.into(),
            formatting,
        }
    }

    /// Plain text with default formatting.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Formatting::default())
    }

    /// Join this fragment to `context` (the text and formatting produced so
    /// far).
    ///
    /// A fragment without text only updates the formatting state. Otherwise
    /// the pending transform is applied, orthography is tried on an attach
    /// boundary against the last word of the context, and the separator is
    /// inserted unless the boundary has no space. Spaces inside the fragment
    /// are replaced by the separator in effect.
    pub fn format(&self, context: &FormattedText, orthography: Option<&dyn Orthography>) -> FormattedText {
        let before = &context.formatting;
        let own = &self.formatting;
        if self.text.is_empty() {
            return FormattedText::new(0, String::new(), before.clone() + own.clone());
        }

        let mut text = match before.transform {
            Some(transform) if !own.carry_transform => transform.apply(&self.text),
            _ => self.text.clone(),
        };

        let attached = before.no_space(own);
        let mut backspaces = 0;
        if attached && own.orthography_start == Some(true) && before.orthography_end != Some(false) {
            if let Some(orthography) = orthography {
                let word = last_word(&context.text);
                if !word.is_empty() {
                    if let Some((erase, replacement)) = orthography.apply(word, &text) {
                        backspaces = erase;
                        text = replacement;
                    }
                }
            }
        }

        let space = own.space.clone().or_else(|| before.space.clone());
        let separator = space.as_deref().unwrap_or(" ");
        if separator != " " {
            text = text.replace(' ', separator);
        }
        if !attached {
            text.insert_str(0, separator);
        }

        let formatting = Formatting {
            space_start: own.space_start,
            space_end: Some(own.space_end.unwrap_or(Space::Normal)),
            space,
            transform: if own.carry_transform {
                before.transform
            } else {
                own.transform
            },
            carry_transform: false,
            orthography_start: own.orthography_start,
            orthography_end: Some(own.orthography_end.unwrap_or(true)),
        };
        FormattedText::new(backspaces, text, formatting)
    }
}

/// Characters after the last whitespace in `text`.
pub fn last_word(text: &str) -> &str {
    text.rsplit(char::is_whitespace).next().unwrap_or("")
}

/// Keep the first `chars` characters of `text`.
pub(crate) fn truncate_chars(text: &mut String, chars: usize) {
    let end = char_offset(text, chars);
    text.truncate(end);
}

/// Remove and return the last `count` characters of `text` (fewer if the
/// text is shorter).
pub(crate) fn pop_chars(text: &mut String, count: usize) -> String {
    if count == 0 {
        return String::new();
    }
    let start = text.char_indices().rev().nth(count - 1).map_or(0, |(i, _)| i);
    text.split_off(start)
}

/// Number of leading characters `a` and `b` share.
pub(crate) fn common_prefix_chars(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}

/// Byte offset of the character at index `chars` (or the end).
pub(crate) fn char_offset(text: &str, chars: usize) -> usize {
    text.char_indices().nth(chars).map_or(text.len(), |(i, _)| i)
}
