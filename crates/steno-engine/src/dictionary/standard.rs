// JSON-backed stroke dictionary stored in B-trees
//
// Keys are normalized rtfcre stroke sequences. A reverse index maps each
// translation back to the keys producing it, and a per-length histogram
// keeps `longest_key` exact across edits.

use std::fmt;
use std::io::{BufReader, BufWriter, Read, Write};
use std::sync::Arc;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use steno_btree::{OrderedMap, OrderedMultiMap};
use steno_core::stroke::{normalize_sequence, parse_sequence, rtfcre_sequence};
use steno_core::{KeyLayout, Stroke};

use super::{Dictionary, DictionaryError, MutableDictionary, ReverseLookup};

/// Stroke dictionary loaded from (and saved to) a JSON object.
#[derive(Clone)]
pub struct StandardDictionary {
    layout: Arc<KeyLayout>,
    entries: OrderedMap<String, String>,
    /// translation -> rtfcre keys
    reverse: OrderedMultiMap<String, String>,
    /// Number of keys per stroke count; index 0 is unused.
    lengths: Vec<usize>,
}

impl StandardDictionary {
    pub fn new(layout: Arc<KeyLayout>) -> Self {
        Self {
            layout,
            entries: OrderedMap::new(),
            reverse: OrderedMultiMap::new(),
            lengths: Vec::new(),
        }
    }

    /// Load a dictionary from a JSON object of `"STROKE/STROKE": "text"`.
    ///
    /// Keys that do not parse against `layout` are skipped with a warning.
    /// When a key occurs twice (also after normalization) the later entry
    /// wins.
    pub fn load<R: Read>(layout: Arc<KeyLayout>, reader: R) -> Result<Self, DictionaryError> {
        let RawEntries(raw) = serde_json::from_reader(BufReader::new(reader))?;

        let mut entries = Vec::with_capacity(raw.len());
        for (key, translation) in raw {
            match normalize_sequence(&layout, &key) {
                Some(normalized) => entries.push((normalized, translation)),
                None => tracing::warn!(key = %key, "skipping dictionary entry with invalid strokes"),
            }
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        let mut unique: Vec<(String, String)> = Vec::with_capacity(entries.len());
        for (key, translation) in entries {
            match unique.last_mut() {
                Some(last) if last.0 == key => last.1 = translation,
                _ => unique.push((key, translation)),
            }
        }

        let mut dict = Self::new(layout);
        let mut reverse: Vec<(String, String)> = unique
            .iter()
            .map(|(key, translation)| (translation.clone(), key.clone()))
            .collect();
        reverse.sort_unstable();
        for (key, _) in &unique {
            dict.count(key, true);
        }
        dict.reverse.extend_sorted(reverse);
        dict.entries.extend_sorted(unique);
        tracing::debug!(entries = dict.len(), longest = dict.longest_key(), "loaded dictionary");
        Ok(dict)
    }

    pub fn layout(&self) -> &Arc<KeyLayout> {
        &self.layout
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Translation stored under an rtfcre key, normalizing the key first.
    pub fn get_rtfcre(&self, key: &str) -> Option<&str> {
        let key = normalize_sequence(&self.layout, key)?;
        self.entries.get(key.as_str()).map(String::as_str)
    }

    /// Store a translation under an rtfcre key.
    pub fn set_rtfcre(&mut self, key: &str, translation: String) -> Result<Option<String>, DictionaryError> {
        let key = normalize_sequence(&self.layout, key).ok_or_else(|| DictionaryError::InvalidStrokes(key.to_string()))?;
        Ok(self.insert_key(key, translation))
    }

    /// Remove the translation stored under an rtfcre key.
    pub fn remove_rtfcre(&mut self, key: &str) -> Option<String> {
        let key = normalize_sequence(&self.layout, key)?;
        self.remove_key(&key)
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &str)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Entries whose key starts with `prefix` (an rtfcre fragment).
    pub fn with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.entries
            .range_from(prefix)
            .take_while(move |(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn insert_key(&mut self, key: String, translation: String) -> Option<String> {
        let previous = self.entries.insert(key.clone(), translation.clone());
        match &previous {
            Some(old) if *old != translation => {
                self.reverse.remove(old.as_str(), key.as_str());
            }
            Some(_) => {}
            None => self.count(&key, true),
        }
        self.reverse.insert(translation, key);
        previous
    }

    fn remove_key(&mut self, key: &str) -> Option<String> {
        let translation = self.entries.remove(key)?;
        self.reverse.remove(translation.as_str(), key);
        self.count(key, false);
        Some(translation)
    }

    fn count(&mut self, key: &str, added: bool) {
        let strokes = key.split('/').count();
        if self.lengths.len() <= strokes {
            self.lengths.resize(strokes + 1, 0);
        }
        if added {
            self.lengths[strokes] += 1;
        } else {
            self.lengths[strokes] = self.lengths[strokes].saturating_sub(1);
        }
    }
}

impl Dictionary for StandardDictionary {
    fn get(&self, strokes: &[Stroke]) -> Option<String> {
        if strokes.is_empty() {
            return None;
        }
        self.entries.get(rtfcre_sequence(strokes).as_str()).cloned()
    }

    fn longest_key(&self) -> usize {
        self.lengths.iter().rposition(|&n| n > 0).unwrap_or(0)
    }
}

impl MutableDictionary for StandardDictionary {
    fn set(&mut self, strokes: &[Stroke], translation: String) -> Option<String> {
        if strokes.is_empty() {
            return None;
        }
        self.insert_key(rtfcre_sequence(strokes), translation)
    }

    fn remove(&mut self, strokes: &[Stroke]) -> Option<String> {
        if strokes.is_empty() {
            return None;
        }
        self.remove_key(&rtfcre_sequence(strokes))
    }

    /// One entry per line, keys ascending.
    fn save(&self, out: &mut dyn Write) -> Result<(), DictionaryError> {
        let mut out = BufWriter::new(out);
        if self.entries.is_empty() {
            writeln!(out, "{{}}")?;
            out.flush()?;
            return Ok(());
        }
        writeln!(out, "{{")?;
        let last = self.entries.len() - 1;
        for (i, (key, translation)) in self.entries.iter().enumerate() {
            let separator = if i == last { "" } else { "," };
            writeln!(
                out,
                "{}: {}{separator}",
                serde_json::to_string(key)?,
                serde_json::to_string(translation)?
            )?;
        }
        writeln!(out, "}}")?;
        out.flush()?;
        Ok(())
    }
}

impl ReverseLookup for StandardDictionary {
    fn reverse_get(&self, translation: &str) -> Vec<Vec<Stroke>> {
        self.reverse
            .get_all(translation)
            .filter_map(|key| parse_sequence(&self.layout, key))
            .collect()
    }
}

impl fmt::Debug for StandardDictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StandardDictionary")
            .field("entries", &self.entries.len())
            .field("longest_key", &self.longest_key())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Streaming JSON object reader
// ---------------------------------------------------------------------------

/// Entries in file order, duplicates kept.
struct RawEntries(Vec<(String, String)>);

struct EntryVisitor;

impl<'de> Visitor<'de> for EntryVisitor {
    type Value = Vec<(String, String)>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object mapping stroke sequences to translations")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(entry) = map.next_entry::<String, String>()? {
            entries.push(entry);
        }
        Ok(entries)
    }
}

impl<'de> Deserialize<'de> for RawEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(EntryVisitor).map(RawEntries)
    }
}
