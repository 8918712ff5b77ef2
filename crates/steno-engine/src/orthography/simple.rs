// Suffix-table orthography

use hashbrown::HashMap;

use super::{Orthography, OrthographyRule};

/// Rules of the form "word ending in `l` + fragment `r` -> erase `l`,
/// type `s`".
///
/// Lookups go through an index keyed by the right fragment and then by
/// the left suffix, giving the same answer as scanning the rule list for
/// the first match.
#[derive(Debug, Clone)]
pub struct SimpleOrthography {
    rules: Vec<OrthographyRule>,
    index: HashMap<String, RightRules>,
}

/// Rules sharing one right fragment.
#[derive(Debug, Clone, Default)]
struct RightRules {
    /// Distinct left-suffix lengths in characters, ascending.
    lengths: Vec<usize>,
    /// Left suffix -> index of the first rule with it.
    first: HashMap<String, usize>,
}

impl SimpleOrthography {
    pub fn new(rules: Vec<OrthographyRule>) -> Self {
        let mut index: HashMap<String, RightRules> = HashMap::new();
        for (i, rule) in rules.iter().enumerate() {
            let entry = index.entry(rule.right.clone()).or_default();
            entry.first.entry(rule.left.clone()).or_insert(i);
            let len = rule.left.chars().count();
            if let Err(pos) = entry.lengths.binary_search(&len) {
                entry.lengths.insert(pos, len);
            }
        }
        Self { rules, index }
    }

    /// A small rule set for common English suffixes.
    pub fn english() -> Self {
        const RULES: &[(&str, &str, &str)] = &[
            // plurals and third person
            ("ay", "s", "ays"),
            ("ey", "s", "eys"),
            ("oy", "s", "oys"),
            ("uy", "s", "uys"),
            ("y", "s", "ies"),
            ("sh", "s", "shes"),
            ("ch", "s", "ches"),
            ("ss", "s", "sses"),
            ("zz", "s", "zzes"),
            ("x", "s", "xes"),
            // past tense
            ("ay", "ed", "ayed"),
            ("ey", "ed", "eyed"),
            ("oy", "ed", "oyed"),
            ("y", "ed", "ied"),
            ("e", "ed", "ed"),
            // progressive
            ("ee", "ing", "eeing"),
            ("ye", "ing", "yeing"),
            ("ie", "ing", "ying"),
            ("e", "ing", "ing"),
            // comparison and agent nouns
            ("ay", "er", "ayer"),
            ("y", "er", "ier"),
            ("e", "er", "er"),
            ("y", "est", "iest"),
            ("e", "est", "est"),
            // adjectives and nouns
            ("le", "ly", "ly"),
            ("y", "ly", "ily"),
            ("e", "able", "able"),
            ("y", "ness", "iness"),
            ("e", "ation", "ation"),
        ];
        Self::new(
            RULES
                .iter()
                .map(|&(l, r, s)| OrthographyRule::new(l, r, s))
                .collect(),
        )
    }

    pub fn rules(&self) -> &[OrthographyRule] {
        &self.rules
    }

    /// Reference implementation: first rule in list order that matches.
    pub fn apply_linear(&self, left: &str, right: &str) -> Option<(usize, String)> {
        self.rules
            .iter()
            .find(|rule| rule.right == right && left.ends_with(rule.left.as_str()))
            .map(|rule| (rule.left.chars().count(), rule.replacement.clone()))
    }
}

impl Orthography for SimpleOrthography {
    fn apply(&self, left: &str, right: &str) -> Option<(usize, String)> {
        let candidates = self.index.get(right)?;
        let mut best: Option<usize> = None;
        for &len in &candidates.lengths {
            let Some(suffix) = suffix_chars(left, len) else {
                break;
            };
            if let Some(&i) = candidates.first.get(suffix) {
                best = Some(best.map_or(i, |b| b.min(i)));
            }
        }
        let rule = &self.rules[best?];
        Some((rule.left.chars().count(), rule.replacement.clone()))
    }
}

/// The last `count` characters of `text`, if it has that many.
fn suffix_chars(text: &str, count: usize) -> Option<&str> {
    if count == 0 {
        return Some("");
    }
    text.char_indices()
        .rev()
        .nth(count - 1)
        .map(|(i, _)| &text[i..])
}
