// Spacing and case state carried between translated fragments
//
// Every fragment of output carries a `Formatting`. The formatting left
// behind by the previous fragment (the context) decides, together with the
// next fragment's own formatting, whether a separator goes between them,
// whether the next word is transformed and whether orthography applies.

pub mod text;

use std::ops::Add;

use serde::{Deserialize, Serialize};
use steno_core::case::Transform;

pub use text::{FormattedText, UnformattedText};

/// How a fragment joins its neighbour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Space {
    /// Separated by the current space string.
    Normal,
    /// Attached without separator.
    #[serde(rename = "none")]
    NoSpace,
    /// Attached only to another glued fragment.
    Glue,
}

/// Whether a fragment ending with `left` and one starting with `right`
/// are joined without a separator. Unset sides count as [`Space::Normal`].
pub fn no_space(left: Option<Space>, right: Option<Space>) -> bool {
    let left = left.unwrap_or(Space::Normal);
    let right = right.unwrap_or(Space::Normal);
    left == Space::NoSpace || right == Space::NoSpace || (left == Space::Glue && right == Space::Glue)
}

/// Formatting state of a fragment. `None` fields inherit from context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Formatting {
    pub space_start: Option<Space>,
    pub space_end: Option<Space>,
    /// Separator override; `None` means a single space.
    pub space: Option<String>,
    /// Transform for the next fragment with text.
    pub transform: Option<Transform>,
    /// The fragment passes a pending transform on instead of consuming it.
    pub carry_transform: bool,
    /// The fragment asks for orthography at its start (attach tokens).
    pub orthography_start: Option<bool>,
    /// The fragment allows orthography at its end.
    pub orthography_end: Option<bool>,
}

impl Formatting {
    /// Formatting that attaches to the previous fragment and asks for
    /// orthography, as produced by `{^text}`.
    pub fn attach_start() -> Self {
        Self {
            space_start: Some(Space::NoSpace),
            orthography_start: Some(true),
            ..Self::default()
        }
    }

    /// Formatting of a glued fragment, as produced by `{&text}`.
    pub fn glue() -> Self {
        Self {
            space_start: Some(Space::Glue),
            space_end: Some(Space::Glue),
            ..Self::default()
        }
    }

    /// Whether `next` attaches to a fragment ending with this formatting.
    pub fn no_space(&self, next: &Formatting) -> bool {
        no_space(self.space_end, next.space_start)
    }

    /// The separator in effect.
    pub fn separator(&self) -> &str {
        self.space.as_deref().unwrap_or(" ")
    }
}

/// Right-biased composition: fields set on `rhs` override `self`.
impl Add for Formatting {
    type Output = Formatting;

    fn add(self, rhs: Formatting) -> Formatting {
        Formatting {
            space_start: rhs.space_start.or(self.space_start),
            space_end: rhs.space_end.or(self.space_end),
            space: rhs.space.or(self.space),
            transform: rhs.transform.or(self.transform),
            carry_transform: rhs.carry_transform,
            orthography_start: rhs.orthography_start.or(self.orthography_start),
            orthography_end: rhs.orthography_end.or(self.orthography_end),
        }
    }
}
