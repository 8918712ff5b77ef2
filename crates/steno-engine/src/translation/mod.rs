// Stroke lookup: longest match over history with affix folding
//
// Each incoming stroke is looked up alone and then together with the
// strokes of earlier history entries, most recent first, while the window
// fits the dictionary's longest key. A lookup that misses exactly may still
// succeed by folding known prefix and suffix strokes off the ends. Once a
// window matches exactly, wider windows must also match exactly to win.
// Entries whose translation does not parse count as missing.

pub mod history;

use std::rc::Rc;

use steno_core::Stroke;

use crate::dictionary::Dictionary;
use crate::processor::{TranslationProcessor, escape};
use crate::system::System;

pub use history::{HISTORY_CAPACITY, History, HistoryTranslation};

/// The outcome of looking up a stroke against the current history.
#[derive(Debug, Clone, Default)]
pub struct Translation {
    /// Strokes covered, oldest first.
    pub strokes: Vec<Stroke>,
    /// History entries this translation supersedes, oldest first. They are
    /// the most recent entries at the time of lookup.
    pub replaces: Vec<Rc<HistoryTranslation>>,
    /// Raw translation text.
    pub raw: String,
    /// Whether `raw` came from an exact dictionary entry.
    pub full_match: bool,
}

impl Translation {
    /// A stroke with no translation, typed as its rtfcre.
    pub fn untranslated(stroke: Stroke) -> Self {
        Self {
            raw: escape(&stroke.rtfcre()),
            strokes: vec![stroke],
            replaces: Vec::new(),
            full_match: false,
        }
    }

    /// A translation with no history to replace.
    pub fn new(strokes: Vec<Stroke>, raw: impl Into<String>, full_match: bool) -> Self {
        Self {
            strokes,
            replaces: Vec::new(),
            raw: raw.into(),
            full_match,
        }
    }
}

/// Find the best translation for `stroke` given the committed history.
pub fn lookup(
    stroke: &Stroke,
    history: &History,
    dictionary: &dyn Dictionary,
    processor: &TranslationProcessor,
) -> Translation {
    let mut strokes = vec![stroke.clone()];
    let mut best = match find(&strokes, dictionary, processor) {
        Some((raw, full_match)) => Translation::new(strokes.clone(), raw, full_match),
        None => Translation::untranslated(stroke.clone()),
    };

    let longest = dictionary.longest_key();
    let mut replaces: Vec<Rc<HistoryTranslation>> = Vec::new();
    for entry in history.iter_recent() {
        let earlier = &entry.translation.strokes;
        if strokes.len() + earlier.len() > longest {
            break;
        }
        strokes.splice(0..0, earlier.iter().cloned());
        replaces.insert(0, Rc::clone(entry));

        if let Some((raw, full_match)) = find(&strokes, dictionary, processor) {
            if full_match || !best.full_match {
                best = Translation {
                    strokes: strokes.clone(),
                    replaces: replaces.clone(),
                    raw,
                    full_match,
                };
            }
        }
    }
    best
}

/// Exact lookup, falling back to affix folding. The flag tells whether the
/// match was exact.
fn find(strokes: &[Stroke], dictionary: &dyn Dictionary, processor: &TranslationProcessor) -> Option<(String, bool)> {
    if let Some(raw) = dictionary.get(strokes).filter(|raw| processor.accepts(raw)) {
        return Some((raw, true));
    }
    fold_affixes(strokes, dictionary, processor.system())
        .filter(|raw| processor.accepts(raw))
        .map(|raw| (raw, false))
}

/// Try suffix-only, then prefix-only, then every prefix with every suffix.
fn fold_affixes(strokes: &[Stroke], dictionary: &dyn Dictionary, system: &System) -> Option<String> {
    let prefixes = system.prefix_strokes();
    let suffixes = system.suffix_strokes();
    if prefixes.is_empty() && suffixes.is_empty() {
        return None;
    }

    let suffix_only = suffixes.iter().map(|s| (None, Some(s)));
    let prefix_only = prefixes.iter().map(|p| (Some(p), None));
    let combined = prefixes
        .iter()
        .flat_map(|p| suffixes.iter().map(move |s| (Some(p), Some(s))));

    suffix_only
        .chain(prefix_only)
        .chain(combined)
        .find_map(|(prefix, suffix)| fold(strokes, prefix, suffix, dictionary))
}

fn fold(
    strokes: &[Stroke],
    prefix: Option<&Stroke>,
    suffix: Option<&Stroke>,
    dictionary: &dyn Dictionary,
) -> Option<String> {
    let core = strip(strokes, prefix, suffix)?;
    let core_text = dictionary.get(&core)?;
    let affix_text = |affix: Option<&Stroke>| {
        affix
            .and_then(|stroke| dictionary.get(std::slice::from_ref(stroke)))
            .unwrap_or_default()
    };
    let parts = [affix_text(prefix), core_text, affix_text(suffix)];
    Some(
        parts
            .iter()
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" "),
    )
}

/// Remove the prefix keys from the first stroke and the suffix keys from
/// the last. Fails unless each affix is fully present and leaves keys
/// behind.
fn strip(strokes: &[Stroke], prefix: Option<&Stroke>, suffix: Option<&Stroke>) -> Option<Vec<Stroke>> {
    let mut core = strokes.to_vec();
    if let Some(prefix) = prefix {
        let first = core.first_mut()?;
        *first = remove_keys(first, prefix)?;
    }
    if let Some(suffix) = suffix {
        let last = core.last_mut()?;
        *last = remove_keys(last, suffix)?;
    }
    Some(core)
}

fn remove_keys(stroke: &Stroke, affix: &Stroke) -> Option<Stroke> {
    if !stroke.contains(affix) {
        return None;
    }
    let rest = stroke - affix;
    (!rest.is_empty()).then_some(rest)
}
