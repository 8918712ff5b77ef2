// Stroke: an immutable chord of keys bound to a layout.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Sub};
use std::sync::Arc;

use crate::layout::KeyLayout;

/// One chord of simultaneously pressed keys.
///
/// Two strokes only compare equal when they share an equal layout; the
/// arithmetic operators assume a shared layout and keep the left operand's.
#[derive(Clone)]
pub struct Stroke {
    layout: Arc<KeyLayout>,
    keys: u64,
}

impl Stroke {
    /// Build a stroke from a raw key mask. Bits outside the layout are dropped.
    pub fn from_mask(layout: &Arc<KeyLayout>, keys: u64) -> Self {
        Self {
            layout: Arc::clone(layout),
            keys: keys & layout.all_keys_mask(),
        }
    }

    /// The explicit empty stroke (no keys pressed).
    pub fn empty(layout: &Arc<KeyLayout>) -> Self {
        Self {
            layout: Arc::clone(layout),
            keys: 0,
        }
    }

    /// Parse an rtfcre stroke string. `None` means malformed.
    pub fn parse(layout: &Arc<KeyLayout>, text: &str) -> Option<Self> {
        layout.parse(text).map(|keys| Self::from_mask(layout, keys))
    }

    /// Parse hardware key tokens (`S-`, `-S`, `A`, `1-`, ...).
    pub fn from_key_tokens<S: AsRef<str>>(layout: &Arc<KeyLayout>, tokens: &[S]) -> Option<Self> {
        layout.parse_keys(tokens).map(|keys| Self::from_mask(layout, keys))
    }

    pub fn layout(&self) -> &Arc<KeyLayout> {
        &self.layout
    }

    /// Raw key mask.
    pub fn keys(&self) -> u64 {
        self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys == 0
    }

    /// Whether every key of `other` is also pressed in `self`.
    pub fn contains(&self, other: &Stroke) -> bool {
        self.keys & other.keys == other.keys
    }

    /// Canonical rtfcre text.
    pub fn rtfcre(&self) -> String {
        self.layout.rtfcre(self.keys)
    }

    /// Fixed-width key display.
    pub fn key_string(&self) -> String {
        self.layout.key_string(self.keys)
    }

    fn same_layout(&self, other: &Stroke) -> bool {
        Arc::ptr_eq(&self.layout, &other.layout) || *self.layout == *other.layout
    }
}

impl PartialEq for Stroke {
    fn eq(&self, other: &Self) -> bool {
        self.keys == other.keys && self.same_layout(other)
    }
}

impl Eq for Stroke {}

impl Hash for Stroke {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.keys.hash(state);
    }
}

impl Add for &Stroke {
    type Output = Stroke;

    fn add(self, rhs: &Stroke) -> Stroke {
        debug_assert!(self.same_layout(rhs), "strokes from different layouts");
        Stroke {
            layout: Arc::clone(&self.layout),
            keys: self.keys | rhs.keys,
        }
    }
}

impl Sub for &Stroke {
    type Output = Stroke;

    fn sub(self, rhs: &Stroke) -> Stroke {
        debug_assert!(self.same_layout(rhs), "strokes from different layouts");
        Stroke {
            layout: Arc::clone(&self.layout),
            keys: self.keys & !rhs.keys,
        }
    }
}

impl Add for Stroke {
    type Output = Stroke;

    fn add(self, rhs: Stroke) -> Stroke {
        &self + &rhs
    }
}

impl Sub for Stroke {
    type Output = Stroke;

    fn sub(self, rhs: Stroke) -> Stroke {
        &self - &rhs
    }
}

impl fmt::Display for Stroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rtfcre())
    }
}

impl fmt::Debug for Stroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Stroke({})", self.rtfcre())
    }
}

/// Join strokes with `/`, the dictionary key form.
pub fn rtfcre_sequence(strokes: &[Stroke]) -> String {
    let mut out = String::new();
    for (i, stroke) in strokes.iter().enumerate() {
        if i > 0 {
            out.push('/');
        }
        out.push_str(&stroke.rtfcre());
    }
    out
}

/// Parse a `/`-separated stroke sequence. Fails if any stroke is malformed.
pub fn parse_sequence(layout: &Arc<KeyLayout>, text: &str) -> Option<Vec<Stroke>> {
    text.split('/').map(|part| Stroke::parse(layout, part)).collect()
}

/// Normalize a dictionary key to canonical rtfcre, if it parses.
pub fn normalize_sequence(layout: &Arc<KeyLayout>, text: &str) -> Option<String> {
    parse_sequence(layout, text).map(|strokes| rtfcre_sequence(&strokes))
}
