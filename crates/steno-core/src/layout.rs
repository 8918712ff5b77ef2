// Key layout: ordered steno keys split into left / break / right groups.
//
// A layout maps the fixed key string of a steno machine (for example
// `#STKPWHRAO*EUFRPBLGTSDZ`) to bit positions of a 64-bit mask. The break
// group holds the keys (vowels and star) that separate the left hand from
// the right hand; a `-` in a stroke string jumps over it.

use hashbrown::HashMap;

use crate::LayoutError;

/// Maximum number of keys a layout may hold (one bit per key).
pub const MAX_KEYS: usize = 64;

/// Which group of the layout a key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeySide {
    /// Left-hand keys, before the break group.
    Left,
    /// Break keys (vowels, star).
    Break,
    /// Right-hand keys, after the break group.
    Right,
}

/// Side marker carried by a key token (`S-`, `-S` or `S`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenSide {
    Left,
    Right,
    Any,
}

/// A shorthand key token that expands to several real keys, e.g. `1-`
/// meaning `#` plus `S-` on a number-bar layout.
#[derive(Debug, Clone, PartialEq, Eq)]
struct KeyAlias {
    key: char,
    side: TokenSide,
    mask: u64,
    /// Index of the highest key in `mask`; the alias is accepted in a stroke
    /// string where that key would be.
    anchor: usize,
}

/// Immutable steno key layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLayout {
    keys: Vec<char>,
    break_start: usize,
    break_end: usize,
    aliases: Vec<KeyAlias>,
    alias_tokens: HashMap<String, u64>,
}

impl KeyLayout {
    /// Create a layout from its ordered key string and break indices.
    ///
    /// Keys `[0, break_start)` are the left group, `[break_start, break_end)`
    /// the break group and `[break_end, len)` the right group.
    pub fn new(keys: &str, break_start: usize, break_end: usize) -> Result<Self, LayoutError> {
        let keys: Vec<char> = keys.chars().collect();
        if keys.is_empty() {
            return Err(LayoutError::Empty);
        }
        if keys.len() > MAX_KEYS {
            return Err(LayoutError::TooManyKeys(keys.len()));
        }
        if break_start > break_end || break_end > keys.len() {
            return Err(LayoutError::InvalidBreak {
                start: break_start,
                end: break_end,
                len: keys.len(),
            });
        }
        if let Some(&bad) = keys.iter().find(|&&c| c == '-' || c == '/' || c.is_whitespace()) {
            return Err(LayoutError::ReservedKey(bad));
        }
        Ok(Self {
            keys,
            break_start,
            break_end,
            aliases: Vec::new(),
            alias_tokens: HashMap::new(),
        })
    }

    /// The standard English stenotype layout with number-bar aliases.
    pub fn english() -> Self {
        let layout = Self::new("#STKPWHRAO*EUFRPBLGTSDZ", 8, 13);
        let aliases = [
            ("1-", "S-"),
            ("2-", "T-"),
            ("3-", "P-"),
            ("4-", "H-"),
            ("5-", "A"),
            ("0-", "O"),
            ("-6", "-F"),
            ("-7", "-P"),
            ("-8", "-L"),
            ("-9", "-T"),
        ];
        layout
            .and_then(|layout| {
                layout.with_aliases(
                    aliases
                        .iter()
                        .map(|&(alias, key)| (alias.to_string(), vec!["#".to_string(), key.to_string()])),
                )
            })
            .unwrap_or_else(|_| unreachable!("built-in English layout is valid"))
    }

    /// Attach alias tokens. Each alias maps a single-character token
    /// (optionally side-marked) to the real key tokens it stands for.
    pub fn with_aliases<I>(mut self, aliases: I) -> Result<Self, LayoutError>
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        for (token, targets) in aliases {
            let (key, side) = split_token(&token).ok_or_else(|| LayoutError::InvalidAlias(token.clone()))?;
            let mut mask = 0u64;
            for target in &targets {
                mask |= self
                    .key_token_mask(target)
                    .ok_or_else(|| LayoutError::UnknownKey(target.clone()))?;
            }
            if mask == 0 {
                return Err(LayoutError::InvalidAlias(token));
            }
            let anchor = (MAX_KEYS - 1) - mask.leading_zeros() as usize;
            self.aliases.retain(|a| !(a.key == key && a.side == side));
            self.aliases.push(KeyAlias {
                key,
                side,
                mask,
                anchor,
            });
            self.alias_tokens.insert(token, mask);
        }
        Ok(self)
    }

    /// Number of keys in the layout.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the layout has no keys (never true for a constructed layout).
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The ordered key characters.
    pub fn keys(&self) -> &[char] {
        &self.keys
    }

    pub fn break_start(&self) -> usize {
        self.break_start
    }

    pub fn break_end(&self) -> usize {
        self.break_end
    }

    /// Which group the key at `index` belongs to.
    pub fn side(&self, index: usize) -> KeySide {
        if index < self.break_start {
            KeySide::Left
        } else if index < self.break_end {
            KeySide::Break
        } else {
            KeySide::Right
        }
    }

    /// Bitmask of every key in the layout.
    pub fn all_keys_mask(&self) -> u64 {
        if self.keys.len() == MAX_KEYS {
            u64::MAX
        } else {
            (1u64 << self.keys.len()) - 1
        }
    }

    /// Bitmask of the right-hand group.
    pub fn right_mask(&self) -> u64 {
        let below = if self.break_end >= MAX_KEYS {
            u64::MAX
        } else {
            (1u64 << self.break_end) - 1
        };
        self.all_keys_mask() & !below
    }

    /// Alias tokens and their expanded masks.
    pub fn aliases(&self) -> impl Iterator<Item = (&str, u64)> {
        self.alias_tokens.iter().map(|(token, &mask)| (token.as_str(), mask))
    }

    /// Parse a stroke string (rtfcre) into a key mask.
    ///
    /// Scans the layout left to right, consuming matching input characters.
    /// A single `-` may jump from the left group into the break/right region
    /// while no right-hand key has been consumed yet. Returns `None` when any
    /// input is left unconsumed or when no key was pressed.
    pub fn parse(&self, stroke: &str) -> Option<u64> {
        let mut mask = 0u64;
        let mut next = 0usize;
        let mut hyphen_allowed = true;

        for c in stroke.chars() {
            if c == '-' {
                if !hyphen_allowed || next > self.break_end {
                    return None;
                }
                hyphen_allowed = false;
                next = next.max(self.break_start);
                continue;
            }

            let direct = (next..self.keys.len()).find(|&i| self.keys[i] == c);
            let alias = self
                .aliases
                .iter()
                .filter(|a| a.key == c && a.anchor >= next && self.alias_side_fits(a))
                .min_by_key(|a| a.anchor);

            let (index, bits) = match (direct, alias) {
                (Some(i), Some(a)) if a.anchor < i => (a.anchor, a.mask),
                (Some(i), _) => (i, 1u64 << i),
                (None, Some(a)) => (a.anchor, a.mask),
                (None, None) => return None,
            };

            mask |= bits;
            next = index + 1;
            if index >= self.break_end {
                hyphen_allowed = false;
            }
        }

        if mask == 0 { None } else { Some(mask) }
    }

    fn alias_side_fits(&self, alias: &KeyAlias) -> bool {
        match alias.side {
            TokenSide::Left => alias.anchor < self.break_end,
            TokenSide::Right => alias.anchor >= self.break_start,
            TokenSide::Any => true,
        }
    }

    /// Parse a list of key tokens as produced by hardware key mappings.
    ///
    /// Each token is a key character, optionally marked `X-` (left/break)
    /// or `-X` (break/right) to tell apart glyphs that appear twice, or an
    /// alias token. Returns `None` if any token is unknown.
    pub fn parse_keys<S: AsRef<str>>(&self, tokens: &[S]) -> Option<u64> {
        let mut mask = 0u64;
        for token in tokens {
            mask |= self.key_token_mask(token.as_ref())?;
        }
        Some(mask)
    }

    fn key_token_mask(&self, token: &str) -> Option<u64> {
        if let Some(&mask) = self.alias_tokens.get(token) {
            return Some(mask);
        }
        let (key, side) = split_token(token)?;
        let range = match side {
            TokenSide::Left => 0..self.break_end,
            TokenSide::Right => self.break_start..self.keys.len(),
            TokenSide::Any => 0..self.keys.len(),
        };
        range
            .into_iter()
            .find(|&i| self.keys[i] == key)
            .map(|i| 1u64 << i)
    }

    /// Canonical rtfcre text for a mask: left keys, break keys (or `-` when
    /// the break group is empty and right keys follow), right keys.
    pub fn rtfcre(&self, mask: u64) -> String {
        let mut out = String::new();
        for i in 0..self.break_start {
            if mask & (1 << i) != 0 {
                out.push(self.keys[i]);
            }
        }
        let mut has_break = false;
        for i in self.break_start..self.break_end {
            if mask & (1 << i) != 0 {
                out.push(self.keys[i]);
                has_break = true;
            }
        }
        if !has_break && mask & self.right_mask() != 0 {
            out.push('-');
        }
        for i in self.break_end..self.keys.len() {
            if mask & (1 << i) != 0 {
                out.push(self.keys[i]);
            }
        }
        out
    }

    /// Fixed-width rendering: one column per key, space for unset keys.
    pub fn key_string(&self, mask: u64) -> String {
        self.keys
            .iter()
            .enumerate()
            .map(|(i, &c)| if mask & (1 << i) != 0 { c } else { ' ' })
            .collect()
    }
}

/// Split a key token into its character and side marker.
fn split_token(token: &str) -> Option<(char, TokenSide)> {
    let chars: Vec<char> = token.chars().collect();
    match chars.as_slice() {
        [c] if *c != '-' => Some((*c, TokenSide::Any)),
        [c, '-'] if *c != '-' => Some((*c, TokenSide::Left)),
        ['-', c] if *c != '-' => Some((*c, TokenSide::Right)),
        _ => None,
    }
}
