// Case transforms and case-insensitive names

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

// ---------------------------------------------------------------------------
// Case transforms
// ---------------------------------------------------------------------------

/// A named text transform applied to the next translated word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transform {
    /// First character uppercased: "hello world" -> "Hello world".
    Capitalize,
    /// First character lowercased: "Hello" -> "hello".
    Uncapitalize,
    /// Every letter uppercased.
    Upper,
    /// Every letter lowercased.
    Lower,
    /// First letter of every whitespace-separated word uppercased.
    Title,
}

impl Transform {
    /// Every builtin transform, in registration order.
    pub const ALL: [Transform; 5] = [
        Transform::Capitalize,
        Transform::Uncapitalize,
        Transform::Upper,
        Transform::Lower,
        Transform::Title,
    ];

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Transform::Capitalize => "capitalize",
            Transform::Uncapitalize => "uncapitalize",
            Transform::Upper => "upper",
            Transform::Lower => "lower",
            Transform::Title => "title",
        }
    }

    /// Look up a builtin transform by name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = Caseless::new(name);
        Self::ALL.into_iter().find(|t| name == *t.name())
    }

    /// Apply the transform to `text`.
    pub fn apply(self, text: &str) -> String {
        match self {
            Transform::Capitalize => map_first(text, |c| c.to_uppercase().collect()),
            Transform::Uncapitalize => map_first(text, |c| c.to_lowercase().collect()),
            Transform::Upper => text.to_uppercase(),
            Transform::Lower => text.to_lowercase(),
            Transform::Title => title_case(text),
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn map_first(text: &str, f: impl Fn(char) -> String) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => {
            let mut out = f(first);
            out.push_str(chars.as_str());
            out
        }
        None => String::new(),
    }
}

fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_whitespace() {
            at_word_start = true;
            out.push(c);
        } else if at_word_start {
            out.extend(c.to_uppercase());
            at_word_start = false;
        } else {
            out.push(c);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Case-insensitive names
// ---------------------------------------------------------------------------

/// A name compared, hashed and ordered without regard to case.
///
/// Command, transform and alias tables key on this type so that lookups
/// such as `RETRO:UNDO` and `retro:undo` resolve to the same entry while the
/// original spelling is kept for display.
#[derive(Clone)]
pub struct Caseless(String);

impl Caseless {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The name as originally spelled.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn folded(&self) -> impl Iterator<Item = char> + '_ {
        self.0.chars().flat_map(char::to_lowercase)
    }
}

impl PartialEq for Caseless {
    fn eq(&self, other: &Self) -> bool {
        self.folded().eq(other.folded())
    }
}

impl Eq for Caseless {}

impl PartialEq<str> for Caseless {
    fn eq(&self, other: &str) -> bool {
        self.folded().eq(other.chars().flat_map(char::to_lowercase))
    }
}

impl PartialOrd for Caseless {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Caseless {
    fn cmp(&self, other: &Self) -> Ordering {
        self.folded().cmp(other.folded())
    }
}

impl Hash for Caseless {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for c in self.folded() {
            c.hash(state);
        }
        0xffu8.hash(state);
    }
}

impl From<&str> for Caseless {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Caseless {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Debug for Caseless {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Caseless({:?})", self.0)
    }
}

impl fmt::Display for Caseless {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
