// Computed dictionary for number-bar strokes
//
// The numeral keys come from the layout's digit aliases ("1-" = "#" + "S-",
// ...). Their common bits are the number key; the remaining bit of each
// alias is the key that types that digit.

use std::sync::Arc;

use steno_core::{KeyLayout, Stroke};

use super::Dictionary;

/// Translates a single stroke made of the number key plus digit keys into
/// glued digits, e.g. `#S-T` -> `{&19}`.
#[derive(Debug, Clone)]
pub struct NumbersDictionary {
    number_key: u64,
    /// (key bit, digit) in layout order.
    digits: Vec<(u64, char)>,
}

impl NumbersDictionary {
    pub fn new(layout: &Arc<KeyLayout>) -> Self {
        let numerals: Vec<(u64, char)> = layout
            .aliases()
            .filter_map(|(token, mask)| {
                let digit = token.chars().find(char::is_ascii_digit)?;
                Some((mask, digit))
            })
            .collect();
        let number_key = match numerals.first() {
            Some(&(first, _)) => numerals.iter().fold(first, |acc, &(mask, _)| acc & mask),
            None => 0,
        };

        let mut digits: Vec<(u64, char)> = numerals
            .iter()
            .filter_map(|&(mask, digit)| {
                let key = mask & !number_key;
                (key.count_ones() == 1).then_some((key, digit))
            })
            .collect();
        digits.sort_by_key(|&(key, _)| key.trailing_zeros());
        digits.dedup_by_key(|entry| entry.0);
        if number_key == 0 {
            digits.clear();
        }
        Self { number_key, digits }
    }

    /// Whether the layout offers any numeral keys at all.
    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    fn translate(&self, keys: u64) -> Option<String> {
        if self.digits.is_empty() || keys & self.number_key != self.number_key {
            return None;
        }
        let mut rest = keys & !self.number_key;
        if rest == 0 {
            return None;
        }
        let mut out = String::from("{&");
        for &(key, digit) in &self.digits {
            if rest & key != 0 {
                out.push(digit);
                rest &= !key;
            }
        }
        if rest != 0 {
            return None;
        }
        out.push('}');
        Some(out)
    }
}

impl Dictionary for NumbersDictionary {
    fn get(&self, strokes: &[Stroke]) -> Option<String> {
        match strokes {
            [stroke] => self.translate(stroke.keys()),
            _ => None,
        }
    }

    fn longest_key(&self) -> usize {
        if self.digits.is_empty() { 0 } else { 1 }
    }
}
