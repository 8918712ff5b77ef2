// Key combinations: named keys plus a modifier set, emitted instead of text.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use crate::case::Caseless;

// ---------------------------------------------------------------------------
// Modifiers
// ---------------------------------------------------------------------------

/// Set of held modifier keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const SHIFT: Modifiers = Modifiers(1);
    pub const CONTROL: Modifiers = Modifiers(1 << 1);
    pub const ALT: Modifiers = Modifiers(1 << 2);
    pub const SUPER: Modifiers = Modifiers(1 << 3);

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }

    /// Look up a modifier by name (`shift`, `control_l`, `alt`, `super`,
    /// `command`, ...), ignoring case.
    pub fn from_name(name: &str) -> Option<Modifiers> {
        let name = Caseless::new(name);
        MODIFIER_NAMES
            .iter()
            .find(|(n, _)| name == **n)
            .map(|&(_, m)| m)
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        Modifiers(self.0 | rhs.0)
    }
}

impl BitOrAssign for Modifiers {
    fn bitor_assign(&mut self, rhs: Modifiers) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (flag, name) in [
            (Modifiers::SHIFT, "shift"),
            (Modifiers::CONTROL, "control"),
            (Modifiers::ALT, "alt"),
            (Modifiers::SUPER, "super"),
        ] {
            if self.contains(flag) {
                if !first {
                    f.write_str("+")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

const MODIFIER_NAMES: &[(&str, Modifiers)] = &[
    ("shift", Modifiers::SHIFT),
    ("shift_l", Modifiers::SHIFT),
    ("shift_r", Modifiers::SHIFT),
    ("control", Modifiers::CONTROL),
    ("control_l", Modifiers::CONTROL),
    ("control_r", Modifiers::CONTROL),
    ("ctrl", Modifiers::CONTROL),
    ("alt", Modifiers::ALT),
    ("alt_l", Modifiers::ALT),
    ("alt_r", Modifiers::ALT),
    ("option", Modifiers::ALT),
    ("super", Modifiers::SUPER),
    ("super_l", Modifiers::SUPER),
    ("super_r", Modifiers::SUPER),
    ("windows", Modifiers::SUPER),
    ("command", Modifiers::SUPER),
    ("meta", Modifiers::SUPER),
];

// ---------------------------------------------------------------------------
// Key names
// ---------------------------------------------------------------------------

/// Named non-character keys, with their accepted aliases.
/// The first name of each row is canonical.
const KEY_NAMES: &[&[&str]] = &[
    &["Return", "enter"],
    &["Tab"],
    &["BackSpace"],
    &["Delete"],
    &["Escape", "esc"],
    &["Insert"],
    &["space"],
    &["Left"],
    &["Right"],
    &["Up"],
    &["Down"],
    &["Home"],
    &["End"],
    &["Page_Up", "prior"],
    &["Page_Down", "next"],
    &["Caps_Lock"],
    &["Menu"],
    &["Print"],
    &["F1"],
    &["F2"],
    &["F3"],
    &["F4"],
    &["F5"],
    &["F6"],
    &["F7"],
    &["F8"],
    &["F9"],
    &["F10"],
    &["F11"],
    &["F12"],
    &["minus"],
    &["equal"],
    &["comma"],
    &["period"],
    &["slash"],
    &["backslash"],
    &["semicolon"],
    &["apostrophe"],
    &["grave"],
    &["bracketleft"],
    &["bracketright"],
];

/// Resolve a key name to its canonical spelling.
///
/// Named keys are matched case-insensitively against the builtin table. A
/// single printable ASCII character is its own key name (letters are
/// lowercased).
pub fn canonical_key_name(name: &str) -> Option<String> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_graphic() {
            return Some(c.to_ascii_lowercase().to_string());
        }
    }
    let wanted = Caseless::new(name);
    KEY_NAMES
        .iter()
        .find(|row| row.iter().any(|alias| wanted == **alias))
        .map(|row| row[0].to_string())
}

// ---------------------------------------------------------------------------
// Key combo
// ---------------------------------------------------------------------------

/// One key press with the modifiers held around it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    /// Canonical key name (see [`canonical_key_name`]).
    pub key: String,
    pub modifiers: Modifiers,
}

impl KeyCombo {
    pub fn new(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
        }
    }

    /// A combo with no modifiers.
    pub fn plain(key: impl Into<String>) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    pub fn backspace() -> Self {
        Self::plain("BackSpace")
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.is_empty() {
            f.write_str(&self.key)
        } else {
            write!(f, "{}+{}", self.modifiers, self.key)
        }
    }
}
