// Translation mini-language processor
//
// A raw translation mixes literal text with `{...}` tokens:
//
//   {^ing}          attach to the previous word (with orthography)
//   {&a}            glue (fingerspelling)
//   {~|"^}          carry a pending case transform through punctuation
//   {#control(c)}   key combos
//   {.} {-|}        aliases for other translations
//   {retro:undo:2}  commands, `name:arg`
//
// Tokens are resolved in that order: key combos, zero-length builtins,
// aliases, formatting markers, commands. Anything left is literal text.

mod key_combo;
mod segment;

use std::rc::Rc;
use std::sync::{Arc, LazyLock};

use hashbrown::HashMap;
use regex::Regex;
use steno_core::case::Caseless;
use steno_core::keys::KeyCombo;

use crate::formatting::{Formatting, Space, UnformattedText};
use crate::system::System;
use crate::translation::{HistoryTranslation, Translation};

pub use key_combo::{KeyComboError, parse_key_combos};
pub use segment::escape;

use segment::{Segment, segments};

/// Maximum nesting of alias expansions.
pub const ALIAS_DEPTH_LIMIT: usize = 16;

/// Aliases every system has; system aliases with the same name win.
const BUILTIN_ALIASES: &[(&str, &str)] = &[
    (".", "{^.}{-|}"),
    ("?", "{^?}{-|}"),
    ("!", "{^!}{-|}"),
    (",", "{^,}"),
    (":", "{^:}"),
    (";", "{^;}"),
    ("-|", "{transform:capitalize}"),
    (">", "{transform:uncapitalize}"),
    ("<", "{transform:upper}"),
    ("*-|", "{retro:transform:capitalize}"),
    ("*>", "{retro:transform:uncapitalize}"),
    ("*<", "{retro:transform:upper}"),
];

/// Error type for translation strings. Positions are byte offsets into
/// the string being parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unclosed '{{' at position {position}")]
    UnclosedBrace { position: usize },

    #[error("unexpected '}}' at position {position}")]
    UnexpectedClose { position: usize },

    #[error("'{{' at position {position} inside the token opened at {opened}")]
    NestedBrace { position: usize, opened: usize },

    #[error("escape at position {position} has nothing to escape")]
    DanglingEscape { position: usize },

    #[error("invalid key combo in token at position {position}: {source}")]
    KeyCombo {
        position: usize,
        #[source]
        source: KeyComboError,
    },

    #[error("alias {name:?} nests deeper than {limit} expansions")]
    AliasDepth { name: String, limit: usize },
}

impl ParseError {
    /// Byte offset the error refers to, if any.
    pub fn position(&self) -> Option<usize> {
        match self {
            ParseError::UnclosedBrace { position }
            | ParseError::UnexpectedClose { position }
            | ParseError::NestedBrace { position, .. }
            | ParseError::DanglingEscape { position }
            | ParseError::KeyCombo { position, .. } => Some(*position),
            ParseError::AliasDepth { .. } => None,
        }
    }
}

/// One step of a parsed translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedAction {
    /// Text (possibly empty) with its formatting.
    Text(UnformattedText),
    /// Key presses sent to the host.
    KeyCombos(Vec<KeyCombo>),
    /// A registered command and its argument.
    Command { name: String, arg: Option<String> },
}

/// A parsed translation together with the history entries it replaces.
#[derive(Debug, Clone, Default)]
pub struct TranslationPart {
    pub actions: Vec<ParsedAction>,
    pub replaces: Vec<Rc<HistoryTranslation>>,
}

/// Parses raw translations against a system's aliases and commands.
#[derive(Clone)]
pub struct TranslationProcessor {
    system: Arc<System>,
    aliases: HashMap<Caseless, String>,
}

impl TranslationProcessor {
    pub fn new(system: Arc<System>) -> Self {
        let mut aliases: HashMap<Caseless, String> = BUILTIN_ALIASES
            .iter()
            .map(|&(name, value)| (Caseless::new(name), value.to_string()))
            .collect();
        for (name, value) in system.aliases() {
            aliases.insert(name.clone(), value.clone());
        }
        Self { system, aliases }
    }

    pub fn system(&self) -> &Arc<System> {
        &self.system
    }

    /// Parse a translation into actions.
    pub fn process(&self, translation: &Translation) -> Result<TranslationPart, ParseError> {
        Ok(TranslationPart {
            actions: self.parse(&translation.raw)?,
            replaces: translation.replaces.clone(),
        })
    }

    /// Whether `raw` parses. Entries that do not are logged and skipped.
    pub fn accepts(&self, raw: &str) -> bool {
        match self.parse(raw) {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!(raw, error = %err, "invalid translation, skipping it");
                false
            }
        }
    }

    /// Parse a raw translation string into actions.
    pub fn parse(&self, raw: &str) -> Result<Vec<ParsedAction>, ParseError> {
        let mut out = Vec::new();
        self.parse_into(raw, 0, &mut out)?;
        Ok(out)
    }

    fn parse_into(&self, raw: &str, depth: usize, out: &mut Vec<ParsedAction>) -> Result<(), ParseError> {
        for segment in segments(raw)? {
            match segment {
                Segment::Text(text) => out.push(ParsedAction::Text(UnformattedText::plain(text))),
                Segment::Token { content, position } => self.token(&content, position, depth, out)?,
            }
        }
        Ok(())
    }

    fn token(&self, content: &str, position: usize, depth: usize, out: &mut Vec<ParsedAction>) -> Result<(), ParseError> {
        if let Some(combo) = content.strip_prefix('#') {
            let combos = parse_key_combos(combo).map_err(|source| ParseError::KeyCombo { position, source })?;
            out.push(ParsedAction::KeyCombos(combos));
            return Ok(());
        }

        if let Some(formatting) = builtin_marker(content) {
            out.push(ParsedAction::Text(UnformattedText::new("", formatting)));
            return Ok(());
        }

        if let Some(expansion) = self.aliases.get(&Caseless::new(content)) {
            if depth >= ALIAS_DEPTH_LIMIT {
                return Err(ParseError::AliasDepth {
                    name: content.to_string(),
                    limit: ALIAS_DEPTH_LIMIT,
                });
            }
            return self.parse_into(expansion, depth + 1, out);
        }

        if let Some(fragment) = formatting_token(content) {
            out.push(ParsedAction::Text(fragment));
            return Ok(());
        }

        if let Some((name, arg)) = self.split_command(content) {
            out.push(ParsedAction::Command {
                name: name.to_string(),
                arg: arg.map(str::to_string),
            });
            return Ok(());
        }

        tracing::debug!(token = %content, "unknown token, typing it literally");
        out.push(ParsedAction::Text(UnformattedText::plain(content)));
        Ok(())
    }

    /// Longest registered command name that `content` starts with, cutting
    /// at `:` from the right.
    fn split_command<'c>(&self, content: &'c str) -> Option<(&'c str, Option<&'c str>)> {
        if self.system.command(content).is_some() {
            return Some((content, None));
        }
        content
            .match_indices(':')
            .rev()
            .map(|(i, _)| (&content[..i], &content[i + 1..]))
            .find(|(name, _)| self.system.command(name).is_some())
            .map(|(name, arg)| (name, Some(arg)))
    }
}

/// `{}`, `{^}` and `{^^}`: formatting-only tokens.
fn builtin_marker(content: &str) -> Option<Formatting> {
    match content {
        "" => Some(Formatting {
            space_end: Some(Space::Normal),
            ..Formatting::default()
        }),
        "^" => Some(Formatting {
            space_start: Some(Space::NoSpace),
            space_end: Some(Space::NoSpace),
            ..Formatting::default()
        }),
        "^^" => Some(Formatting {
            space_start: Some(Space::NoSpace),
            space_end: Some(Space::NoSpace),
            orthography_end: Some(false),
            ..Formatting::default()
        }),
        _ => None,
    }
}

/// `^` / `&` / `~|` markers, then text, then an optional trailing `^`.
static FORMATTING_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^((?:\^|&|~\|)*)(.*?)(\^?)$").expect("valid regex"));

static MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\^|&|~\|").expect("valid regex"));

/// Leading `^` / `&` / `~|` and trailing `^` markers around text. Returns
/// `None` when the token has no markers.
fn formatting_token(content: &str) -> Option<UnformattedText> {
    let caps = FORMATTING_TOKEN.captures(content)?;
    let (leading, text, trailing) = (caps.get(1)?.as_str(), caps.get(2)?.as_str(), caps.get(3)?.as_str());
    if leading.is_empty() && trailing.is_empty() {
        return None;
    }
    let mut formatting = Formatting::default();
    for marker in MARKER.find_iter(leading) {
        match marker.as_str() {
            "^" => {
                formatting.space_start = Some(Space::NoSpace);
                formatting.orthography_start = Some(true);
            }
            "&" => {
                formatting.space_start = Some(Space::Glue);
                formatting.space_end = Some(Space::Glue);
            }
            _ => formatting.carry_transform = true,
        }
    }
    if !trailing.is_empty() {
        formatting.space_end = Some(Space::NoSpace);
    }
    Some(UnformattedText::new(text, formatting))
}

#[cfg(test)]
mod tests {
    use super::*;
    use steno_core::KeyLayout;
    use steno_core::keys::Modifiers;

    fn processor() -> TranslationProcessor {
        let system = System::new(Arc::new(KeyLayout::english()))
            .with_alias("cap", "{-|}")
            .with_alias("loop", "{loop}")
            .with_alias("hi", "hello {^}")
            .with_host_command("toggle_keyboard");
        TranslationProcessor::new(Arc::new(system))
    }

    fn text(text: &str, formatting: Formatting) -> ParsedAction {
        ParsedAction::Text(UnformattedText::new(text, formatting))
    }

    fn command(name: &str, arg: Option<&str>) -> ParsedAction {
        ParsedAction::Command {
            name: name.to_string(),
            arg: arg.map(str::to_string),
        }
    }

    #[test]
    fn literal_text() {
        let p = processor();
        assert_eq!(p.parse("hello world").unwrap(), [text("hello world", Formatting::default())]);
        assert!(p.parse("").unwrap().is_empty());
    }

    #[test]
    fn formatting_markers() {
        let p = processor();
        assert_eq!(p.parse("{^ing}").unwrap(), [text("ing", Formatting::attach_start())]);
        assert_eq!(p.parse("{&b}").unwrap(), [text("b", Formatting::glue())]);
        let parsed = p.parse("{in^}").unwrap();
        assert_eq!(
            parsed,
            [text(
                "in",
                Formatting {
                    space_end: Some(Space::NoSpace),
                    ..Formatting::default()
                }
            )]
        );
        let parsed = p.parse("{~|\"^}").unwrap();
        assert_eq!(
            parsed,
            [text(
                "\"",
                Formatting {
                    carry_transform: true,
                    space_end: Some(Space::NoSpace),
                    ..Formatting::default()
                }
            )]
        );
        let parsed = p.parse("{^-^}").unwrap();
        let ParsedAction::Text(fragment) = &parsed[0] else {
            panic!("expected text")
        };
        assert_eq!(fragment.text, "-");
        assert_eq!(fragment.formatting.space_start, Some(Space::NoSpace));
        assert_eq!(fragment.formatting.space_end, Some(Space::NoSpace));
    }

    #[test]
    fn zero_length_builtins() {
        let p = processor();
        let parsed = p.parse("{^}").unwrap();
        let ParsedAction::Text(fragment) = &parsed[0] else {
            panic!("expected text")
        };
        assert!(fragment.text.is_empty());
        assert_eq!(fragment.formatting.space_end, Some(Space::NoSpace));
        assert_eq!(p.parse("{^^}").unwrap().len(), 1);
        assert_eq!(p.parse("{}").unwrap().len(), 1);
    }

    #[test]
    fn aliases_expand_recursively() {
        let p = processor();
        assert_eq!(
            p.parse("{.}").unwrap(),
            [
                text(".", Formatting::attach_start()),
                command("transform", Some("capitalize"))
            ]
        );
        assert_eq!(p.parse("{CAP}").unwrap(), [command("transform", Some("capitalize"))]);
        assert_eq!(p.parse("{hi}").unwrap().len(), 2);
    }

    #[test]
    fn self_referential_alias_is_an_error() {
        let p = processor();
        assert_eq!(
            p.parse("{loop}"),
            Err(ParseError::AliasDepth {
                name: "loop".into(),
                limit: ALIAS_DEPTH_LIMIT
            })
        );
    }

    #[test]
    fn commands_match_longest_prefix() {
        let p = processor();
        assert_eq!(p.parse("{retro:undo}").unwrap(), [command("retro:undo", None)]);
        assert_eq!(p.parse("{retro:undo:3}").unwrap(), [command("retro:undo", Some("3"))]);
        assert_eq!(
            p.parse("{retro:transform:upper}").unwrap(),
            [command("retro:transform", Some("upper"))]
        );
        assert_eq!(p.parse("{MODE:SET_SPACE:_}").unwrap(), [command("MODE:SET_SPACE", Some("_"))]);
        assert_eq!(p.parse("{mode:set_space:}").unwrap(), [command("mode:set_space", Some(""))]);
        assert_eq!(p.parse("{toggle_keyboard}").unwrap(), [command("toggle_keyboard", None)]);
    }

    #[test]
    fn unknown_tokens_become_text() {
        let p = processor();
        assert_eq!(p.parse("{nothing:here}").unwrap(), [text("nothing:here", Formatting::default())]);
    }

    #[test]
    fn key_combos() {
        let p = processor();
        let parsed = p.parse("{#control(c)}").unwrap();
        assert_eq!(
            parsed,
            [ParsedAction::KeyCombos(vec![KeyCombo::new("c", Modifiers::CONTROL)])]
        );
        assert!(matches!(
            p.parse("x {#nokey}"),
            Err(ParseError::KeyCombo { position: 2, .. })
        ));
    }

    #[test]
    fn invalid_translations_are_rejected() {
        let p = processor();
        let translation = Translation {
            raw: "broken {".to_string(),
            ..Translation::default()
        };
        assert_eq!(
            p.process(&translation).unwrap_err(),
            ParseError::UnclosedBrace { position: 7 }
        );
        assert!(!p.accepts("broken {"));
        assert!(!p.accepts("{loop}"));
        assert!(p.accepts("{^ing}"));
    }

    #[test]
    fn marker_only_tokens() {
        let p = processor();
        assert_eq!(p.parse("{&}").unwrap(), [text("", Formatting::glue())]);
        assert_eq!(
            p.parse("{~|^}").unwrap(),
            [text(
                "",
                Formatting {
                    carry_transform: true,
                    ..Formatting::attach_start()
                }
            )]
        );
        assert_eq!(p.parse("{a^b}").unwrap(), [text("a^b", Formatting::default())]);
    }
}
